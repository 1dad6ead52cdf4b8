//! Driver identity merge across every season file.
//!
//! A [`DriverRoster`] accumulates one record per competitor id. Season files
//! are visited in file-name order and races in stored order; each field of
//! a driver keeps the first non-empty value seen. Later values never replace
//! an earlier one, even when they differ, so the result is "earliest wins"
//! rather than "most complete".

use std::collections::HashMap;
use std::path::PathBuf;

use crate::artifacts::DataDir;
use crate::error::Result;
use crate::model::{Driver, Race, SeasonFile};

use super::shape;

/// Label for drivers with no nationality in the breakdown.
pub const UNKNOWN_NATIONALITY: &str = "Unknown";

/// Accumulator of merged drivers, in order of first sighting.
#[derive(Debug, Default, Clone)]
pub struct DriverRoster {
    drivers: Vec<Driver>,
    index: HashMap<String, usize>,
}

impl DriverRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Driver> {
        self.index.get(id).map(|&i| &self.drivers[i])
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn into_drivers(self) -> Vec<Driver> {
        self.drivers
    }

    /// Merge one sighting into the roster.
    pub fn absorb(&mut self, incoming: Driver) {
        if let Some(&i) = self.index.get(&incoming.id) {
            self.drivers[i].fill_from(&incoming);
            return;
        }

        let mut fresh = Driver {
            id: incoming.id.clone(),
            ..Default::default()
        };
        fresh.fill_from(&incoming);
        self.index.insert(incoming.id, self.drivers.len());
        self.drivers.push(fresh);
    }

    /// Merge every competitor of a race's detail payload.
    ///
    /// Returns how many competitor entries were absorbed.
    pub fn absorb_race(&mut self, race: &Race) -> usize {
        let competitors = shape::detail_competitors(&race.complete_details);
        if competitors.is_empty() {
            tracing::debug!("Race {} ({}) has no competitors", race.id, race.stage_id);
            return 0;
        }

        let mut absorbed = 0;
        for competitor in competitors {
            match Driver::from_competitor(competitor) {
                Some(driver) => {
                    tracing::trace!("Driver {:?} ({})", driver.name, driver.id);
                    self.absorb(driver);
                    absorbed += 1;
                }
                None => tracing::warn!(
                    "Competitor without id in race {} ({}), dropping",
                    race.id,
                    race.stage_id
                ),
            }
        }
        absorbed
    }

    /// Merge every race of a season, in stored order.
    pub fn absorb_season(&mut self, season: &SeasonFile) {
        tracing::info!("Season {}: {} races", season.year(), season.races.len());
        for race in &season.races {
            self.absorb_race(race);
        }
    }

    /// Driver count per nationality, most common first (ties by name).
    pub fn nationality_breakdown(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for driver in &self.drivers {
            let nationality = driver
                .nationality
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_NATIONALITY);
            *counts.entry(nationality).or_default() += 1;
        }

        let mut breakdown: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(nationality, count)| (nationality.to_string(), count))
            .collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        breakdown
    }
}

/// Outcome of a merge run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub season_files: usize,
    pub races: usize,
    pub drivers: usize,
    pub nationalities: Vec<(String, usize)>,
    /// `None` when there was nothing to write
    pub written: Option<PathBuf>,
}

/// Merge drivers over a sequence of seasons.
pub fn merge_seasons<'a>(seasons: impl IntoIterator<Item = &'a SeasonFile>) -> DriverRoster {
    let mut roster = DriverRoster::new();
    for season in seasons {
        roster.absorb_season(season);
    }
    roster
}

/// Merge drivers from every season file and write `drivers.json`.
///
/// Unreadable season files are skipped. No drivers is not an error: the
/// report says so and nothing is written.
pub fn merge_drivers(data: &DataDir) -> Result<MergeReport> {
    let files = data.season_files();
    if files.is_empty() {
        tracing::warn!("No season files found in {}", data.root().display());
        return Ok(MergeReport::default());
    }
    tracing::info!("Found {} season files", files.len());

    let mut report = MergeReport::default();
    let mut roster = DriverRoster::new();
    for path in &files {
        match data.read_season(path) {
            Ok(season) => {
                report.season_files += 1;
                report.races += season.races.len();
                roster.absorb_season(&season);
            }
            Err(e) => tracing::error!("Skipping {}: {}", path.display(), e),
        }
    }

    report.drivers = roster.len();
    report.nationalities = roster.nationality_breakdown();
    if roster.is_empty() {
        tracing::warn!("No drivers found");
        return Ok(report);
    }

    let path = data.write_drivers(roster.drivers())?;
    tracing::info!("Saved {} drivers to {}", roster.len(), path.display());
    report.written = Some(path);
    Ok(report)
}
