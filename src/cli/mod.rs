//! Command-line interface for indycar-etl.
//!
//! One subcommand per pipeline stage, plus `all` for the three extraction
//! stages in sequence and `mongodb` for the load.

mod commands;

pub use commands::{Cli, Commands, run_command};
