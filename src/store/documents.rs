//! Store document schema and the adapters that build it from the
//! intermediate files.
//!
//! Each adapter stamps a fresh `_id`. Links between documents use business
//! keys only: `RaceDocument::season_year` → `SeasonDocument::year`, and
//! `DriverRef::driver_id` → `DriverDocument::driver_id`.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, DateTime, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Driver, Race, SeasonFile, SeasonInfo};
use crate::pipeline::shape;

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDocument {
    #[serde(rename = "_id")]
    pub storage_id: ObjectId,
    pub year: String,
    pub season_id: String,
    pub description: String,
    pub total_races: i64,
    pub generated_at: Option<String>,
    pub season_info: SeasonInfo,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Denormalized driver summary embedded in a race. Read-side copy only;
/// the `drivers` collection is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRef {
    pub driver_id: String,
    pub name: Option<String>,
    pub position: Option<Value>,
    pub points: Option<Value>,
    pub car_number: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDocument {
    #[serde(rename = "_id")]
    pub storage_id: ObjectId,
    /// Season-local; unique only together with `season_year`
    pub race_id: String,
    pub stage_id: String,
    pub season_year: String,
    pub description: String,
    pub scheduled: Option<String>,
    pub scheduled_end: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub race_type: Option<String>,
    pub venue: Map<String, Value>,
    pub drivers: Vec<DriverRef>,
    pub race_result: Map<String, Value>,
    pub statistics: Map<String, Value>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverDocument {
    #[serde(rename = "_id")]
    pub storage_id: ObjectId,
    pub driver_id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub country_code: Option<String>,
    /// Nothing in the extracted data populates this
    pub car_number: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

pub fn season_document(season: &SeasonFile, now: DateTime) -> SeasonDocument {
    SeasonDocument {
        storage_id: ObjectId::new(),
        year: season.id.clone(),
        season_id: season.season_id.clone(),
        description: season.description.clone(),
        total_races: season.total_races as i64,
        generated_at: season.generated_at.clone(),
        season_info: season.season_info.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn race_document(race: &Race, season_year: &str, now: DateTime) -> RaceDocument {
    RaceDocument {
        storage_id: ObjectId::new(),
        race_id: race.id.clone(),
        stage_id: race.stage_id.clone(),
        season_year: season_year.to_string(),
        description: race.description.clone(),
        scheduled: race.scheduled.clone(),
        scheduled_end: race.scheduled_end.clone(),
        status: race.status.clone(),
        race_type: race.race_type.clone(),
        venue: race.venue.clone(),
        drivers: driver_refs(&race.complete_details),
        race_result: race.race_result.clone(),
        statistics: race.statistics.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn driver_document(driver: &Driver, now: DateTime) -> DriverDocument {
    DriverDocument {
        storage_id: ObjectId::new(),
        driver_id: driver.id.clone(),
        name: driver.name.clone(),
        gender: driver.gender.clone(),
        nationality: driver.nationality.clone(),
        country_code: driver.country_code.clone(),
        car_number: None,
        created_at: now,
        updated_at: now,
    }
}

/// Driver summaries from a race's detail payload. Entries without id are skipped.
pub fn driver_refs(details: &Map<String, Value>) -> Vec<DriverRef> {
    shape::detail_competitors(details)
        .iter()
        .filter_map(|competitor| {
            let driver_id = shape::entry_id(competitor)?.to_string();
            let result = competitor.get("result");
            let from_result = |key: &str| result.and_then(|r| r.get(key)).cloned();
            Some(DriverRef {
                driver_id,
                name: competitor
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                position: from_result("position"),
                points: from_result("points"),
                car_number: from_result("car_number"),
            })
        })
        .collect()
}

/// Encode typed documents for the store.
pub fn encode_all<T: Serialize>(
    collection: &str,
    documents: &[T],
) -> Result<Vec<Document>, StoreError> {
    documents
        .iter()
        .map(|d| {
            bson::to_document(d).map_err(|e| StoreError::Encode {
                collection: collection.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}
