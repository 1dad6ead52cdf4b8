//! Intermediate JSON files shared by the pipeline stages.
//!
//! Layout under the data directory:
//! - `seasons.json` - the season directory
//! - `season_{year}.json` - one per season, with its races
//! - `drivers.json` - merged drivers
//!
//! The `season_*.json` naming is the only link between the race stage and
//! the stages reading its output. Files are pretty-printed (4-space indent,
//! UTF-8, non-ASCII left as is) and written via a temp file + rename.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::error::{Error, Result, ResultExt};
use crate::model::{Driver, SeasonEntry, SeasonFile};

pub const SEASONS_FILE: &str = "seasons.json";
pub const DRIVERS_FILE: &str = "drivers.json";

const SEASON_PREFIX: &str = "season_";
const JSON_EXT: &str = ".json";

/// Handle on the data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it doesn't exist.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(format!("creating data directory {}", self.root.display()))
    }

    pub fn seasons_path(&self) -> PathBuf {
        self.root.join(SEASONS_FILE)
    }

    pub fn drivers_path(&self) -> PathBuf {
        self.root.join(DRIVERS_FILE)
    }

    pub fn season_path(&self, year: &str) -> PathBuf {
        self.root.join(format!("{SEASON_PREFIX}{year}{JSON_EXT}"))
    }

    pub fn read_seasons(&self) -> Result<Vec<SeasonEntry>> {
        let path = self.seasons_path();
        if !path.exists() {
            return Err(Error::missing_artifact(path));
        }
        read_json(&path)
    }

    pub fn write_seasons(&self, seasons: &[SeasonEntry]) -> Result<PathBuf> {
        let path = self.seasons_path();
        write_json(&path, &seasons)?;
        Ok(path)
    }

    pub fn write_season(&self, season: &SeasonFile) -> Result<PathBuf> {
        let path = self.season_path(season.year());
        write_json(&path, season)?;
        Ok(path)
    }

    pub fn read_season(&self, path: &Path) -> Result<SeasonFile> {
        read_json(path)
    }

    /// Season files in the data directory, sorted by file name.
    pub fn season_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_str().is_some_and(is_season_file_name))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    pub fn write_drivers(&self, drivers: &[Driver]) -> Result<PathBuf> {
        let path = self.drivers_path();
        write_json(&path, &drivers)?;
        Ok(path)
    }

    /// Merged drivers, or `None` if the merge stage hasn't written any.
    pub fn read_drivers(&self) -> Result<Option<Vec<Driver>>> {
        let path = self.drivers_path();
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

/// `season_<something>.json`
pub fn is_season_file_name(name: &str) -> bool {
    name.strip_prefix(SEASON_PREFIX)
        .and_then(|rest| rest.strip_suffix(JSON_EXT))
        .is_some_and(|year| !year.is_empty())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(format!("parsing {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .with_context(format!("encoding {}", path.display()))?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &buf).with_context(format!("writing {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(format!("renaming to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_season_file_name_pattern() {
        assert!(is_season_file_name("season_2022.json"));
        assert!(is_season_file_name("season_x.json"));
        assert!(!is_season_file_name("seasons.json"));
        assert!(!is_season_file_name("season_.json"));
        assert!(!is_season_file_name("season_2022.json.tmp"));
        assert!(!is_season_file_name("drivers.json"));
    }

    #[test]
    fn test_season_files_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(dir.path());

        File::create(dir.path().join("season_2023.json")).unwrap();
        File::create(dir.path().join("season_2017.json")).unwrap();
        File::create(dir.path().join("seasons.json")).unwrap(); // Should be ignored
        File::create(dir.path().join("drivers.json")).unwrap(); // Should be ignored

        // Not recursive
        std::fs::create_dir(dir.path().join("old")).unwrap();
        File::create(dir.path().join("old").join("season_2010.json")).unwrap();

        let names: Vec<String> = data
            .season_files()
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["season_2017.json", "season_2023.json"]);
    }

    #[test]
    fn test_seasons_roundtrip_and_pretty_format() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let seasons = vec![SeasonEntry::new("2022", "sr:stage:1", "IndyCar São Paulo 2022")];

        data.write_seasons(&seasons).unwrap();
        assert_eq!(data.read_seasons().unwrap(), seasons);

        let raw = std::fs::read_to_string(data.seasons_path()).unwrap();
        assert!(raw.contains("\n        \"id\": \"2022\""));
        assert!(raw.contains("São Paulo"));
        assert!(!data.root().join("seasons.json.tmp").exists());
    }

    #[test]
    fn test_missing_seasons_file() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(dir.path());
        assert!(matches!(data.read_seasons(), Err(Error::MissingArtifact(_))));
    }

    #[test]
    fn test_read_drivers_absent_is_none() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(dir.path());
        assert!(data.read_drivers().unwrap().is_none());

        data.write_drivers(&[Driver {
            id: "sr:competitor:1".to_string(),
            ..Default::default()
        }])
        .unwrap();
        assert_eq!(data.read_drivers().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_creates_nested_dir() {
        let dir = tempdir().unwrap();
        let data = DataDir::new(dir.path().join("Data").join("extracted"));
        data.ensure().unwrap();
        assert!(data.root().is_dir());
    }
}
