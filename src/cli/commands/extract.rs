//! Extraction commands: seasons, races, drivers and the full sequence.

use anyhow::bail;
use tokio::runtime::Runtime;

use crate::artifacts::DataDir;
use crate::config::Config;
use crate::pipeline::drivers::{self, MergeReport};
use crate::pipeline::races::{self, Pacing, RaceExtractionSummary};
use crate::pipeline::seasons;
use crate::sportradar::SportradarClient;

fn client(config: &Config) -> anyhow::Result<SportradarClient> {
    if config.api.api_key.as_deref().is_none_or(str::is_empty) {
        bail!("No API key configured (set SPORTRADAR_API_KEY or [api].api_key)");
    }
    Ok(SportradarClient::from_config(config)?)
}

/// Fetch the season list and write `seasons.json`
pub fn cmd_seasons(rt: &Runtime, config: &Config, data: &DataDir) -> anyhow::Result<()> {
    let client = client(config)?;
    let seasons = rt.block_on(seasons::extract_seasons(&client, &config.extraction, data))?;

    if seasons.is_empty() {
        println!("✗ No seasons extracted");
        return Ok(());
    }
    println!(
        "✓ {} seasons written to {}",
        seasons.len(),
        data.seasons_path().display()
    );
    for entry in &seasons {
        println!("  {}  {}  {}", entry.year, entry.season_id, entry.description);
    }
    Ok(())
}

/// Aggregate races for every known season
pub fn cmd_races(rt: &Runtime, config: &Config, data: &DataDir) -> anyhow::Result<()> {
    let client = client(config)?;
    let pacing = Pacing::from(&config.extraction);
    let summary = rt.block_on(races::extract_races(&client, data, &pacing))?;
    print_race_summary(&summary);
    Ok(())
}

/// Merge drivers from the season files and write `drivers.json`
pub fn cmd_drivers(data: &DataDir) -> anyhow::Result<()> {
    let report = drivers::merge_drivers(data)?;
    print_merge_report(&report);
    Ok(())
}

/// Seasons, then races, then drivers. Stops when a stage left nothing
/// for the next one.
pub fn cmd_all(rt: &Runtime, config: &Config, data: &DataDir) -> anyhow::Result<()> {
    println!("Step 1/3: seasons");
    cmd_seasons(rt, config, data)?;
    if !data.seasons_path().exists() {
        println!("✗ {} not found, stopping", data.seasons_path().display());
        return Ok(());
    }

    println!("\nStep 2/3: races");
    cmd_races(rt, config, data)?;
    if data.season_files().is_empty() {
        println!("✗ No season files in {}, stopping", data.root().display());
        return Ok(());
    }

    println!("\nStep 3/3: drivers");
    cmd_drivers(data)?;

    println!("\n✓ Extraction complete. Files in {}", data.root().display());
    Ok(())
}

fn print_race_summary(summary: &RaceExtractionSummary) {
    if summary.seasons_written == 0 {
        println!("✗ No season files written ({} seasons tried)", summary.seasons_total);
        return;
    }
    println!(
        "✓ {}/{} seasons written, {} races total",
        summary.seasons_written, summary.seasons_total, summary.races_written
    );
}

fn print_merge_report(report: &MergeReport) {
    let Some(path) = &report.written else {
        println!(
            "✗ No drivers found ({} season files, {} races)",
            report.season_files, report.races
        );
        return;
    };
    println!(
        "✓ {} unique drivers from {} races in {} season files",
        report.drivers, report.races, report.season_files
    );
    println!("  Saved to {}", path.display());
    println!("\nNationalities:");
    for (nationality, count) in &report.nationalities {
        println!("  {:<24} {}", nationality, count);
    }
}
