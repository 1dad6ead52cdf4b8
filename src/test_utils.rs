//! Test utilities and fixtures.
//!
//! Builders for the JSON shapes Sportradar returns and for the persisted
//! models, plus a temp data directory and a client over a scripted source.
//!
//! # Example
//!
//! ```ignore
//! let (data, _dir) = temp_data_dir();
//! let dixon = competitor("sr:competitor:1", "Dixon, Scott", "New Zealand");
//! data.write_season(&season_file("2022", vec![race("1", "sr:stage:1", vec![dixon])]))?;
//! ```

use std::time::Duration;

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::artifacts::DataDir;
use crate::model::{Race, SeasonFile, SeasonInfo};
use crate::sportradar::fetch::mocks::ScriptedSource;
use crate::sportradar::{RetryPolicy, SportradarClient};

pub const TEST_BASE_URL: &str = "http://api.test/indycar/v2/en";

/// Data directory inside a temp dir. Keep the `TempDir` alive for the test.
pub fn temp_data_dir() -> (DataDir, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let data = DataDir::new(dir.path());
    (data, dir)
}

/// Client over a scripted source: three attempts, no waiting.
pub fn scripted_client(source: ScriptedSource) -> SportradarClient<ScriptedSource> {
    SportradarClient::with_source(
        source,
        TEST_BASE_URL,
        RetryPolicy {
            retry_count: 3,
            delay: Duration::ZERO,
        },
    )
}

/// A competitor entry as found in a race summary.
pub fn competitor(id: &str, name: &str, nationality: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "gender": "male",
        "nationality": nationality,
        "country_code": nationality.chars().take(3).collect::<String>().to_uppercase(),
    })
}

/// A race stage as listed in a season summary.
pub fn race_stage(id: &str, description: &str) -> Value {
    json!({
        "id": id,
        "description": description,
        "scheduled": "2022-05-29T16:45:00+00:00",
        "scheduled_end": "2022-05-29T20:00:00+00:00",
        "type": "race",
        "status": "Closed",
        "venue": {"id": "sr:venue:1", "name": "Circuit"},
        "competitors": [],
        "stages": []
    })
}

/// A race summary payload with its competitors nested under `stage`.
pub fn race_detail(id: &str, competitors: Vec<Value>) -> Value {
    json!({
        "generated_at": "2024-03-01T10:00:00+00:00",
        "stage": {
            "id": id,
            "description": "Race",
            "type": "race",
            "competitors": competitors
        }
    })
}

/// A persisted race whose details carry `competitors`.
pub fn race(id: &str, stage_id: &str, competitors: Vec<Value>) -> Race {
    let details = race_detail(stage_id, competitors);
    Race {
        id: id.to_string(),
        stage_id: stage_id.to_string(),
        description: format!("Race {id}"),
        scheduled: None,
        scheduled_end: None,
        status: Some("Closed".to_string()),
        race_type: Some("race".to_string()),
        single_event: None,
        venue: Default::default(),
        unique_stage_id: None,
        stages: Vec::new(),
        sport_event_context: Default::default(),
        competitors: Vec::new(),
        sport_event_status: Default::default(),
        race_result: Default::default(),
        statistics: Default::default(),
        complete_details: details.as_object().cloned().unwrap_or_default(),
    }
}

/// A persisted season.
pub fn season_file(year: &str, races: Vec<Race>) -> SeasonFile {
    SeasonFile {
        id: year.to_string(),
        season_id: format!("sr:season:{year}"),
        description: format!("IndyCar Series {year}"),
        total_races: races.len(),
        generated_at: None,
        season_info: SeasonInfo::default(),
        races,
    }
}
