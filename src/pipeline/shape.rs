//! Structural clean-up of race records.
//!
//! The API repeats itself: competitor and stage lists can contain the same
//! entry several times, and a race's own summary restates the fields the
//! season summary already gave us. These helpers collapse both.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::model::Race;

/// Keys promoted to the top level of a [`Race`], removed from its details.
pub const PROMOTED_FIELDS: [&str; 9] = [
    "id",
    "description",
    "scheduled",
    "scheduled_end",
    "type",
    "status",
    "venue",
    "competitors",
    "stages",
];

/// Non-empty string `id` of a JSON entry.
pub fn entry_id(entry: &Value) -> Option<&str> {
    entry
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Keep the first entry for every id, in order of first appearance.
///
/// Entries without an id are dropped.
pub fn dedup_by_id(entries: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| match entry_id(entry) {
            Some(id) => seen.insert(id.to_string()),
            None => false,
        })
        .collect()
}

/// Dedup a list stored under `key` in `object`, if it is one.
fn dedup_list_in(object: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Array(list)) = object.get_mut(key) {
        *list = dedup_by_id(std::mem::take(list));
    }
}

/// Remove every promoted key from a race's detail payload.
pub fn strip_promoted_fields(details: &mut Map<String, Value>) {
    for key in PROMOTED_FIELDS {
        details.remove(key);
    }
}

/// Competitor entries of a race detail payload.
///
/// Sportradar nests them under `stage.competitors`; a top-level
/// `competitors` list is accepted as a fallback. Missing means empty.
pub fn detail_competitors(details: &Map<String, Value>) -> &[Value] {
    details
        .get("stage")
        .and_then(|stage| stage.get("competitors"))
        .or_else(|| details.get("competitors"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Apply dedup and field stripping to a freshly assembled race.
pub fn clean_race(mut race: Race) -> Race {
    race.competitors = dedup_by_id(std::mem::take(&mut race.competitors));
    race.stages = dedup_by_id(std::mem::take(&mut race.stages));

    if let Some(Value::Object(stage)) = race.complete_details.get_mut("stage") {
        dedup_list_in(stage, "competitors");
        dedup_list_in(stage, "stages");
    }
    strip_promoted_fields(&mut race.complete_details);
    race
}
