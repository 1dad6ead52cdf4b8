//! Season directory: which seasons exist and which year each one is.
//!
//! Season descriptions are free text ("IndyCar Series 2022"); the year is
//! the first standalone `20xx` in it. Seasons without one are dropped.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::artifacts::DataDir;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::model::SeasonEntry;
use crate::sportradar::dto::SeasonsResponse;
use crate::sportradar::{JsonSource, SportradarClient};

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern is valid"));

/// First standalone 4-digit `20xx` year in a description.
pub fn extract_year(description: &str) -> Option<&str> {
    YEAR_PATTERN
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Turn the API's season list into directory entries within `years`.
///
/// Years are unique in the result: the first season listed for a year wins.
pub fn build_directory(
    response: &SeasonsResponse,
    years: RangeInclusive<u16>,
) -> Vec<SeasonEntry> {
    let mut seen = HashSet::new();
    response
        .stages
        .iter()
        .filter_map(|stage| {
            let Some(season_id) = stage.id.as_deref().filter(|id| !id.is_empty()) else {
                tracing::warn!("Season '{}' has no id, skipping", stage.description);
                return None;
            };
            let Some(year) = extract_year(&stage.description) else {
                tracing::debug!("No year in season description '{}'", stage.description);
                return None;
            };
            Some(SeasonEntry::new(year, season_id, stage.description.as_str()))
        })
        .filter(|entry| {
            entry
                .year
                .parse::<u16>()
                .is_ok_and(|year| years.contains(&year))
        })
        .filter(|entry| {
            let first = seen.insert(entry.year.clone());
            if !first {
                tracing::warn!(
                    "Season {} ({}) repeats year {}, skipping",
                    entry.season_id,
                    entry.description,
                    entry.year
                );
            }
            first
        })
        .collect()
}

/// Fetch the season list, filter it, and persist it to `seasons.json`.
///
/// Returns the persisted entries. Nothing is written when no season is
/// left, which the caller reports.
pub async fn extract_seasons<S: JsonSource>(
    client: &SportradarClient<S>,
    config: &ExtractionConfig,
    data: &DataDir,
) -> Result<Vec<SeasonEntry>> {
    tracing::info!("Fetching season list");
    let Some(response) = client.seasons().await else {
        tracing::warn!("No seasons found");
        return Ok(Vec::new());
    };
    tracing::info!("API returned {} seasons", response.stages.len());

    let seasons = build_directory(&response, config.min_year..=config.max_year);
    if seasons.is_empty() {
        tracing::warn!(
            "No seasons in range {}-{}",
            config.min_year,
            config.max_year
        );
        return Ok(seasons);
    }

    let path = data.write_seasons(&seasons)?;
    tracing::info!("Saved {} seasons to {}", seasons.len(), path.display());
    Ok(seasons)
}
