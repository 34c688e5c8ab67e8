//! Command line argument parsing and validation.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::{CliError, ReleaseError, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build, prune and publish delta-update release sets
#[derive(Parser, Debug)]
#[command(
    name = "delta_publish",
    version,
    about = "Build, prune and publish delta-update release sets",
    long_about = "Build the application, keep the local release directory in sync with the
last GitHub release, prune old packages and upload the new release as a draft.

Usage:
  delta_publish publish
  delta_publish publish --config apps/desktop/publish.toml
  delta_publish prune --retain 2
  delta_publish status"
)]
pub struct Args {
    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "DELTA_PUBLISH_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Show detailed progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build, prune, verify and upload a new release
    Publish {
        /// Publish this version instead of the next calendar version
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,

        /// Reuse the current release directory without running the build tools
        #[arg(long)]
        skip_build: bool,
    },

    /// Apply the retention policy to the local release directory
    Prune {
        /// Delta packages to keep (defaults to the configured value)
        #[arg(long, value_name = "N")]
        retain: Option<usize>,
    },

    /// Show the last release, local freshness and the next version
    Status,
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Publish { .. } => "publish",
            Command::Prune { .. } => "prune",
            Command::Status => "status",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ReleaseError::Cli(CliError::InvalidArguments { reason });

        if let Command::Publish {
            version: Some(version),
            ..
        } = &self.command
        {
            if version.trim().is_empty() {
                return Err(invalid("--version must not be empty".to_string()));
            }
            if version.contains(char::is_whitespace) {
                return Err(invalid(format!(
                    "--version '{}' must not contain spaces",
                    version
                )));
            }
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
