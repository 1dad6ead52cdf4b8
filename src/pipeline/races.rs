//! Race aggregation: one `season_{year}.json` per season.
//!
//! For every season in the directory, the season summary lists its race
//! stages; each race's own summary is fetched and folded into the race
//! record under `complete_details`. Failures only ever skip the smallest
//! unit: a race without an id or whose fetch failed is left out and the
//! season carries on.
//!
//! Race ids are a per-season sequence starting at `"1"` that only advances
//! for races that made it into the file, so a season with N races always
//! has ids `"1"..="N"`.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::artifacts::DataDir;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::model::{Race, SeasonEntry, SeasonFile};
use crate::sportradar::dto::{RaceStage, SeasonSummary};
use crate::sportradar::{JsonSource, SportradarClient};

use super::shape;

const UNKNOWN_RACE: &str = "Unknown Race";

/// Rate-limit pacing between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each successfully fetched race
    pub between_races: Duration,
    /// Between two seasons
    pub between_seasons: Duration,
}

impl From<&ExtractionConfig> for Pacing {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            between_races: config.race_pause(),
            between_seasons: config.season_pause(),
        }
    }
}

/// What a race extraction run produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RaceExtractionSummary {
    pub seasons_total: usize,
    /// Seasons written to disk
    pub seasons_written: usize,
    /// Races across all written seasons
    pub races_written: usize,
}

/// Aggregate races for every season in `seasons.json`.
///
/// Fails only if the season directory is missing or unreadable.
pub async fn extract_races<S: JsonSource>(
    client: &SportradarClient<S>,
    data: &DataDir,
    pacing: &Pacing,
) -> Result<RaceExtractionSummary> {
    let seasons = data.read_seasons()?;
    let mut summary = RaceExtractionSummary {
        seasons_total: seasons.len(),
        ..Default::default()
    };
    if seasons.is_empty() {
        tracing::warn!("Season directory is empty, nothing to extract");
        return Ok(summary);
    }

    tracing::info!("Processing {} seasons", seasons.len());
    for (idx, entry) in seasons.iter().enumerate() {
        tracing::info!(
            "[{}/{}] Season {} ({}): {}",
            idx + 1,
            seasons.len(),
            entry.year,
            entry.season_id,
            entry.description
        );

        match aggregate_season(client, entry, pacing).await {
            Some(season) if season.races.is_empty() => {
                tracing::warn!("No races found for season {}", entry.year);
            }
            Some(season) => match data.write_season(&season) {
                Ok(path) => {
                    tracing::info!(
                        "Saved {} races for {} to {}",
                        season.total_races,
                        entry.year,
                        path.display()
                    );
                    summary.seasons_written += 1;
                    summary.races_written += season.total_races;
                }
                Err(e) => tracing::error!("Failed to save season {}: {}", entry.year, e),
            },
            None => tracing::warn!("No data for season {}, skipping", entry.year),
        }

        if idx + 1 < seasons.len() {
            tracing::debug!("Pausing {:?} before next season", pacing.between_seasons);
            tokio::time::sleep(pacing.between_seasons).await;
        }
    }

    Ok(summary)
}

/// Build one season's file contents. `None` if its summary is unavailable.
pub async fn aggregate_season<S: JsonSource>(
    client: &SportradarClient<S>,
    entry: &SeasonEntry,
    pacing: &Pacing,
) -> Option<SeasonFile> {
    let summary = client.season_summary(&entry.season_id).await?;
    let races = collect_races(client, &summary.stage.stages, &entry.year, pacing).await;
    Some(season_file(entry, summary, races))
}

/// Fetch details for each race stage and assemble cleaned race records.
pub async fn collect_races<S: JsonSource>(
    client: &SportradarClient<S>,
    stages: &[Value],
    year: &str,
    pacing: &Pacing,
) -> Vec<Race> {
    if stages.is_empty() {
        tracing::info!("No race stages in season {}", year);
        return Vec::new();
    }
    tracing::info!("Found {} race stages in season {}", stages.len(), year);

    let mut races = Vec::new();
    let mut next_id: u32 = 1;

    for raw in stages {
        let stage: RaceStage = match serde_json::from_value(raw.clone()) {
            Ok(stage) => stage,
            Err(e) => {
                tracing::warn!("Malformed race stage in {}: {}", year, e);
                continue;
            }
        };
        let Some(stage_id) = stage.id.clone().filter(|id| !id.is_empty()) else {
            tracing::warn!("Race stage without id in {}, skipping", year);
            continue;
        };

        tracing::info!("Fetching details for race {} ({})", next_id, stage_id);
        let details = match client.summary(&stage_id).await {
            Some(Value::Object(details)) => details,
            Some(_) => {
                tracing::warn!("Race {} details are not an object, skipping", stage_id);
                continue;
            }
            None => {
                tracing::warn!("Could not fetch details for race {}, skipping", stage_id);
                continue;
            }
        };

        let race = shape::clean_race(assemble_race(next_id, stage_id, stage, details));
        tracing::info!("Processed race {}: {}", race.id, race.description);
        races.push(race);
        next_id += 1;

        tokio::time::sleep(pacing.between_races).await;
    }

    races
}

/// Merge a summary race stage and its detail payload into one record.
fn assemble_race(
    seq: u32,
    stage_id: String,
    stage: RaceStage,
    details: Map<String, Value>,
) -> Race {
    Race {
        id: seq.to_string(),
        stage_id,
        description: stage
            .description
            .unwrap_or_else(|| UNKNOWN_RACE.to_string()),
        scheduled: stage.scheduled,
        scheduled_end: stage.scheduled_end,
        status: stage.status,
        race_type: stage.stage_type,
        single_event: stage.single_event,
        venue: stage.venue,
        unique_stage_id: stage.unique_stage_id,
        stages: stage.stages,
        sport_event_context: stage.sport_event_context,
        competitors: stage.competitors,
        sport_event_status: stage.sport_event_status,
        race_result: stage.race_result,
        statistics: stage.statistics,
        complete_details: details,
    }
}

fn season_file(entry: &SeasonEntry, summary: SeasonSummary, races: Vec<Race>) -> SeasonFile {
    SeasonFile {
        id: entry.year.clone(),
        season_id: entry.season_id.clone(),
        description: entry.description.clone(),
        total_races: races.len(),
        generated_at: summary.generated_at,
        season_info: summary.stage.info,
        races,
    }
}
