//! # Delta Publish
//!
//! Release packaging and publishing for applications that ship
//! incremental delta updates through GitHub releases.
//!
//! A publish run checks the last GitHub release, refreshes the local release
//! directory when it has drifted, derives the next calendar version, runs
//! the external build/sign/package tools, prunes old packages, verifies the
//! `RELEASES` manifest against disk and uploads everything to a draft
//! release.
//!
//! ## Features
//!
//! - **Fail fast**: every error aborts the run; releases stay drafts until published by hand
//! - **Draft gate**: a pending draft release blocks new publishing
//! - **Retention**: one full package and a configurable number of delta packages are kept
//! - **Staleness detection**: local manifest and full package are compared with the last release
//!
//! ## Usage
//!
//! ```bash
//! delta_publish publish                 # Build and upload the next version
//! delta_publish publish --skip-build    # Upload what the release directory holds
//! delta_publish prune --retain 2        # Prune locally
//! delta_publish status                  # Show what the next run would do
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod manifest;
pub mod process;
pub mod reconcile;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use config::{EnvConfig, PublishConfig};
pub use error::{ReleaseError, Result};
pub use github::{GitHubAsset, GitHubRelease, GitHubReleaseManager, RemoteReleaseClient};
pub use manifest::{ReleaseLine, ReleaseManifest};
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use reconcile::{Freshness, PublishOptions, PublishOutcome, ReleasePhase, ReleaseReconciler};
pub use version::CalendarVersion;
