//! Response shapes for the Sportradar IndyCar v2 endpoints.
//!
//! Only the fields the pipeline reads are typed. Everything is optional or
//! defaulted so that a sparse response deserializes and gets skipped at the
//! smallest unit instead of failing a whole season. Fields read through
//! [`lenient`] also accept `null` or a value of the wrong type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::model::SeasonInfo;

/// Deserialize a field, falling back to its default on `null` or a type mismatch.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// `GET /seasons.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonsResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub stages: Vec<SeasonStage>,
}

/// One season in the seasons list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonStage {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
}

/// `GET /sport_events/{season_id}/summary.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stage: SummaryStage,
}

/// The season's `stage` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryStage {
    #[serde(flatten)]
    pub info: SeasonInfo,
    /// Race stages, left raw so a malformed one only skips itself
    #[serde(default, deserialize_with = "lenient")]
    pub stages: Vec<Value>,
}

/// A race stage inside the season summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RaceStage {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scheduled: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scheduled_end: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub stage_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub single_event: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub venue: Map<String, Value>,
    #[serde(deserialize_with = "lenient")]
    pub unique_stage_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub stages: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub sport_event_context: Map<String, Value>,
    #[serde(deserialize_with = "lenient")]
    pub competitors: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub sport_event_status: Map<String, Value>,
    #[serde(deserialize_with = "lenient")]
    pub race_result: Map<String, Value>,
    #[serde(deserialize_with = "lenient")]
    pub statistics: Map<String, Value>,
}
