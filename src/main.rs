//! IndyCar ETL - Sportradar IndyCar data to MongoDB.
//!
//! Extracts seasons, races and drivers from the Sportradar IndyCar API into
//! JSON files on disk, then loads those files into MongoDB, replacing
//! whatever the collections held before.

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod sportradar;
pub mod store;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    // Usage errors and --help print and exit normally
    let args = match cli::Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("indycar_etl=info".parse()?))
        .init();

    cli::run_command(&args)
}
