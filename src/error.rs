//! Comprehensive error types for delta_publish operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.
//! Every error is fatal to a publish run: nothing is retried and nothing is rolled back.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for delta_publish operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all delta_publish operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Release manifest errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Release host errors
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version derivation errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// CLI and external command errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// A manifest entry has no backing file after build and prune
    #[error("Local file missing: {path} is listed in the manifest but does not exist")]
    LocalFileMissing {
        /// Expected location of the file
        path: PathBuf,
    },

    /// A draft release already exists on the release host
    #[error("Draft release '{name}' is pending. Publish or delete it before releasing again.")]
    PendingDraftRelease {
        /// Name of the draft release
        name: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Release manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A manifest line does not have the `<hash> <filename> <filesize>` shape
    #[error("Malformed manifest line {line_number}: '{line}' ({reason})")]
    MalformedLine {
        /// 1-based line number, 0 when parsed outside a file
        line_number: usize,
        /// Offending line
        line: String,
        /// Reason for the error
        reason: String,
    },
}

/// Release host errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request could not be sent or the response could not be read
    #[error("{operation} failed: {reason}")]
    Request {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// The host answered with a non-success status
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The request did not complete in time
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Operation that failed
        operation: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The host answered with something we cannot use
    #[error("{operation} returned an invalid response: {reason}")]
    InvalidResponse {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting is absent
    #[error("Missing required setting '{field}'")]
    Missing {
        /// Setting name
        field: String,
    },

    /// A setting has an unusable value
    #[error("Invalid setting '{field}': {reason}")]
    Invalid {
        /// Setting name
        field: String,
        /// Reason for the error
        reason: String,
    },

    /// The configuration file could not be read
    #[error("Cannot read configuration file {path}: {reason}")]
    Unreadable {
        /// Configuration file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Version derivation errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Last release shares today's prefix but its increment is not a number
    #[error("Cannot derive next version from '{last}': increment '{increment}' is not a number")]
    InvalidIncrement {
        /// Last release name
        last: String,
        /// Text after the date prefix
        increment: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::PendingDraftRelease { name } => vec![
                format!("Publish or delete the draft release '{}' on GitHub", name),
                "Re-run the publish once no draft release remains".to_string(),
            ],
            ReleaseError::LocalFileMissing { .. } => vec![
                "The packaging step did not produce every file listed in RELEASES".to_string(),
                "Inspect the packaging tool output above, then re-run the publish".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::MalformedLine { .. }) => vec![
                "Each RELEASES line must read '<hash> <filename> <filesize>'".to_string(),
                "Delete the release directory to force a refresh from GitHub".to_string(),
            ],
            ReleaseError::Remote(RemoteError::Status { status: 401, .. })
            | ReleaseError::Remote(RemoteError::Status { status: 403, .. }) => vec![
                "Check that GH_TOKEN or GITHUB_TOKEN is set and not expired".to_string(),
                "Verify the token has 'contents: write' permission on the repository".to_string(),
            ],
            ReleaseError::Remote(RemoteError::Timeout { .. }) => vec![
                "Raise upload_timeout_secs in the configuration file".to_string(),
                "The draft release keeps already uploaded assets; re-run to finish".to_string(),
            ],
            ReleaseError::Cli(CliError::InvalidArguments { .. }) => vec![
                "Run 'delta_publish --help' for usage".to_string(),
            ],
            ReleaseError::Config(ConfigError::Missing { field }) => vec![
                format!("Add '{}' to the configuration file", field),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
