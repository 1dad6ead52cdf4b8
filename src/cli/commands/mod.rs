//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `extract`: seasons, races, drivers and the `all` sequence
//! - `load`: MongoDB load

mod extract;
mod load;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::{Builder, Runtime};

use crate::artifacts::DataDir;
use crate::config::{self, Config};

pub use extract::{cmd_all, cmd_drivers, cmd_races, cmd_seasons};
pub use load::cmd_mongodb;

/// IndyCar data extractor
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: <config dir>/indycar-etl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for extracted JSON files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Sportradar API key
    #[arg(long, env = "SPORTRADAR_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sportradar base URL
    #[arg(long, env = "SPORTRADAR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_CONNECTION_STRING", global = true, hide_env_values = true)]
    pub mongodb_uri: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the season, race and driver extractors in sequence
    All,
    /// Extract the season directory
    Seasons,
    /// Extract races for every known season
    Races,
    /// Merge drivers from the extracted season files
    Drivers,
    /// Load extracted files into MongoDB
    Mongodb,
}

impl Cli {
    /// File config with command-line/environment overrides applied.
    pub fn resolve_config(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => config::load_from(path),
            None => config::load(),
        };
        if let Some(dir) = &self.data_dir {
            config.extraction.data_dir = dir.clone();
        }
        if let Some(key) = &self.api_key {
            config.api.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(uri) = &self.mongodb_uri {
            config.store.connection_string = uri.clone();
        }
        config
    }
}

/// Run the specified CLI command.
///
/// Without a command, prints usage and returns normally.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = cli.resolve_config();
    config.validate()?;

    let data = DataDir::new(&config.extraction.data_dir);
    data.ensure()?;

    let rt = runtime()?;
    match command {
        Commands::All => cmd_all(&rt, &config, &data),
        Commands::Seasons => cmd_seasons(&rt, &config, &data),
        Commands::Races => cmd_races(&rt, &config, &data),
        Commands::Drivers => cmd_drivers(&data),
        Commands::Mongodb => cmd_mongodb(&rt, &config, &data),
    }
}

/// The pipeline is sequential; one thread is all it needs.
fn runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
