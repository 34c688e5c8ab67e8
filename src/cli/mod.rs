//! Command line interface for delta_publish.
//!
//! Parses arguments, loads the configuration and dispatches to the
//! publish, prune and status commands.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::config::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args, &EnvConfig::from_process()).await
}
