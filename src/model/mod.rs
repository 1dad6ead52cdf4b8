//! Core data models for the extracted dataset.
//!
//! Defines the three persisted entities: [`SeasonFile`] (with its
//! [`Race`]s) and [`Driver`], plus the [`SeasonEntry`] rows of the seasons
//! list. These are the shapes of the intermediate JSON files; the store
//! documents built from them live in [`crate::store::documents`].
//!
//! # Identifiers
//!
//! - `SeasonEntry::year` / `SeasonFile::id` - 4-digit year, business key
//! - `Race::id` - season-local sequence number, restarts at `"1"` each season
//! - `Race::stage_id` - API stage id, the only globally unique race key
//! - `Driver::id` - API competitor id, stable across seasons

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sportradar::dto::lenient;

/// One row of `seasons.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEntry {
    /// Same as `year`
    pub id: String,
    pub year: String,
    pub description: String,
    /// Opaque API key of the season stage
    pub season_id: String,
}

impl SeasonEntry {
    pub fn new(
        year: impl Into<String>,
        season_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let year = year.into();
        Self {
            id: year.clone(),
            year,
            description: description.into(),
            season_id: season_id.into(),
        }
    }
}

/// Projection of the season summary's `stage` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonInfo {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scheduled: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scheduled_end: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub stage_type: Option<String>,
    pub category: Option<Value>,
    pub sport: Option<Value>,
}

/// Contents of `season_{year}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonFile {
    /// The season year
    pub id: String,
    pub season_id: String,
    pub description: String,
    pub total_races: usize,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub season_info: SeasonInfo,
    #[serde(default)]
    pub races: Vec<Race>,
}

impl SeasonFile {
    pub fn year(&self) -> &str {
        &self.id
    }
}

/// A race as persisted inside a season file.
///
/// Top-level fields come from the season summary's race stage; the race's
/// own summary payload sits under `complete_details` minus every key that
/// was promoted to the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    /// Season-local sequence number
    pub id: String,
    pub stage_id: String,
    pub description: String,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default)]
    pub scheduled_end: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub race_type: Option<String>,
    #[serde(default)]
    pub single_event: Option<bool>,
    #[serde(default)]
    pub venue: Map<String, Value>,
    #[serde(default)]
    pub unique_stage_id: Option<String>,
    #[serde(default)]
    pub stages: Vec<Value>,
    #[serde(default)]
    pub sport_event_context: Map<String, Value>,
    #[serde(default)]
    pub competitors: Vec<Value>,
    #[serde(default)]
    pub sport_event_status: Map<String, Value>,
    #[serde(default)]
    pub race_result: Map<String, Value>,
    #[serde(default)]
    pub statistics: Map<String, Value>,
    #[serde(default)]
    pub complete_details: Map<String, Value>,
}

/// Canonical driver record, merged across all seasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl Driver {
    /// Read a driver out of a competitor entry. `None` if it has no id.
    pub fn from_competitor(competitor: &Value) -> Option<Self> {
        let text = |key: &str| {
            competitor
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let id = text("id").filter(|id| !id.is_empty())?;
        Some(Self {
            id,
            name: text("name"),
            gender: text("gender"),
            nationality: text("nationality"),
            country_code: text("country_code"),
        })
    }

    /// Fill empty fields from `other`. Populated fields are never replaced.
    pub fn fill_from(&mut self, other: &Driver) {
        fill(&mut self.name, &other.name);
        fill(&mut self.gender, &other.gender);
        fill(&mut self.nationality, &other.nationality);
        fill(&mut self.country_code, &other.country_code);
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn fill(slot: &mut Option<String>, incoming: &Option<String>) {
    if is_blank(slot) && !is_blank(incoming) {
        slot.clone_from(incoming);
    }
}
