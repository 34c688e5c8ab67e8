//! Release reconciliation: one publish run from remote check to upload.
//!
//! The run is strictly sequential:
//!
//! ```text
//! Idle → Checking → Fresh | Stale → Building → Pruning → Verifying → Uploading → Done
//! ```
//!
//! Any error moves the run to `Aborted`. Without GitHub integration the
//! checking, refresh and upload phases are skipped.

mod staleness;
mod upload;

pub use staleness::{
    BUNDLE_SUFFIX, Freshness, INSTALLER_SUFFIX, RemoteSnapshot, check_freshness,
    is_reusable_asset, refresh_release_dir,
};
pub use upload::{list_release_files, upload_order, upload_plan, verify_release_dir};

use crate::build::BuildPipeline;
use crate::config::PublishConfig;
use crate::error::{ReleaseError, Result};
use crate::github::{GitHubRelease, RemoteReleaseClient};
use crate::manifest::{ReleaseManifest, prune_release_dir};
use crate::process::CommandRunner;
use crate::version::{self, CalendarVersion};
use chrono::NaiveDate;
use std::fmt;

/// State of a publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePhase {
    /// Nothing done yet
    Idle,
    /// Querying the release host
    Checking,
    /// Local directory matches the last release
    Fresh,
    /// Local directory is being replaced from the last release
    Stale,
    /// External build, sign and package step
    Building,
    /// Applying the retention policy
    Pruning,
    /// Checking every manifest entry has its file
    Verifying,
    /// Uploading the release directory
    Uploading,
    /// Run completed
    Done,
    /// Run failed
    Aborted,
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Building => "building",
            Self::Pruning => "pruning",
            Self::Verifying => "verifying",
            Self::Uploading => "uploading",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Per-run switches
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Use this version instead of deriving one
    pub version: Option<String>,
    /// Do not invoke the build/package tools
    pub skip_build: bool,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// Version that was built and published
    pub version: String,
    /// Freshness of the local directory, `None` without GitHub integration
    pub freshness: Option<Freshness>,
    /// Assets downloaded by a refresh
    pub downloaded: Vec<String>,
    /// Packages removed by the retention policy
    pub pruned: Vec<String>,
    /// Files uploaded, in upload order
    pub uploaded: Vec<String>,
    /// Release page, `None` without GitHub integration
    pub release_url: Option<String>,
}

/// Read-only view of the next run
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Newest release including drafts
    pub last_release: Option<GitHubRelease>,
    /// Freshness of the local directory; `None` without GitHub or with a pending draft
    pub freshness: Option<Freshness>,
    /// Version the next run would publish; `None` while a draft is pending
    pub next_version: Option<String>,
    /// Entries in the local manifest
    pub local_packages: usize,
}

/// Drives one publish run over an exclusively owned release directory
pub struct ReleaseReconciler<'a> {
    config: &'a PublishConfig,
    client: Option<&'a dyn RemoteReleaseClient>,
    runner: &'a dyn CommandRunner,
    today: NaiveDate,
    phase: ReleasePhase,
}

impl<'a> ReleaseReconciler<'a> {
    /// Create a reconciler; pass no client to publish locally only
    pub fn new(
        config: &'a PublishConfig,
        client: Option<&'a dyn RemoteReleaseClient>,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            client,
            runner,
            today: version::today(),
            phase: ReleasePhase::Idle,
        }
    }

    /// Override the date used for version derivation
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Current phase
    pub fn phase(&self) -> ReleasePhase {
        self.phase
    }

    fn enter(&mut self, phase: ReleasePhase) {
        log::info!("Release phase: {} → {}", self.phase, phase);
        self.phase = phase;
    }

    /// Run build, prune, verify and publish
    pub async fn run(&mut self, options: &PublishOptions) -> Result<PublishOutcome> {
        match self.run_phases(options).await {
            Ok(outcome) => {
                self.enter(ReleasePhase::Done);
                Ok(outcome)
            }
            Err(e) => {
                log::error!("Release aborted during {}: {}", self.phase, e);
                self.enter(ReleasePhase::Aborted);
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self, options: &PublishOptions) -> Result<PublishOutcome> {
        let mut outcome = PublishOutcome {
            version: String::new(),
            freshness: None,
            downloaded: Vec::new(),
            pruned: Vec::new(),
            uploaded: Vec::new(),
            release_url: None,
        };

        let remote = match self.client {
            Some(client) => {
                self.enter(ReleasePhase::Checking);
                let remote = self.fetch_remote(client).await?;

                let freshness = check_freshness(client, self.config, &remote).await?;
                outcome.freshness = Some(freshness);
                match freshness {
                    Freshness::Fresh => self.enter(ReleasePhase::Fresh),
                    Freshness::Stale => {
                        self.enter(ReleasePhase::Stale);
                        outcome.downloaded =
                            refresh_release_dir(client, self.config, &remote).await?;
                    }
                }
                remote
            }
            None => {
                log::info!("GitHub integration not configured, publishing locally only");
                RemoteSnapshot::default()
            }
        };

        let version = match &options.version {
            Some(version) => version.clone(),
            None => CalendarVersion::next(
                self.today,
                remote.release.as_ref().map(GitHubRelease::name),
            )?
            .to_string(),
        };
        log::info!("Releasing version {}", version);
        outcome.version = version.clone();

        self.enter(ReleasePhase::Building);
        if options.skip_build {
            log::info!("Skipping build, using existing release directory");
        } else {
            BuildPipeline::new(self.config, self.runner)?
                .run(&version)
                .await?;
        }

        self.enter(ReleasePhase::Pruning);
        let manifest_path = self.config.manifest_path();
        if !manifest_path.is_file() {
            return Err(ReleaseError::LocalFileMissing {
                path: manifest_path,
            });
        }
        let pruned = prune_release_dir(&self.config.release_dir, self.config.retain_deltas).await?;
        outcome.pruned = pruned.removed;

        self.enter(ReleasePhase::Verifying);
        verify_release_dir(&self.config.release_dir, &pruned.manifest)?;

        if let Some(client) = self.client {
            self.enter(ReleasePhase::Uploading);
            let release = self.ensure_release(client, &version).await?;

            for path in upload_plan(&self.config.release_dir).await? {
                client.upload_asset(&release, &path).await?;
                if let Some(name) = path.file_name() {
                    outcome.uploaded.push(name.to_string_lossy().into_owned());
                }
            }
            outcome.release_url = Some(release.html_url.clone());
        }

        Ok(outcome)
    }

    /// Newest release must not be a draft; return it with its assets
    async fn fetch_remote(&self, client: &dyn RemoteReleaseClient) -> Result<RemoteSnapshot> {
        let Some(release) = client.get_last_release(true).await? else {
            return Ok(RemoteSnapshot::default());
        };
        if release.draft {
            return Err(ReleaseError::PendingDraftRelease {
                name: release.name().to_string(),
            });
        }
        let assets = client.list_assets(release.id).await?;
        log::info!(
            "Last release {} has {} asset(s)",
            release.name(),
            assets.len()
        );
        Ok(RemoteSnapshot {
            release: Some(release),
            assets,
        })
    }

    /// Reuse the release named `version` or create it as a draft
    async fn ensure_release(
        &self,
        client: &dyn RemoteReleaseClient,
        version: &str,
    ) -> Result<GitHubRelease> {
        if let Some(existing) = client.find_release(version).await? {
            log::info!("Reusing existing release {}", existing.name());
            return Ok(existing);
        }
        let prerelease = self
            .config
            .github
            .as_ref()
            .is_some_and(|gh| gh.prerelease);
        let release = client.create_release(version, true, prerelease).await?;
        log::info!("Created draft release {}", release.name());
        Ok(release)
    }

    /// Report the remote state and what the next run would do, without side effects
    pub async fn status(&self) -> Result<StatusReport> {
        let local_packages = match ReleaseManifest::read(&self.config.manifest_path()).await {
            Ok(manifest) => manifest.len(),
            Err(ReleaseError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };

        let Some(client) = self.client else {
            return Ok(StatusReport {
                last_release: None,
                freshness: None,
                next_version: Some(CalendarVersion::next(self.today, None)?.to_string()),
                local_packages,
            });
        };

        let last = client.get_last_release(true).await?;
        if let Some(release) = last.as_ref().filter(|r| r.draft) {
            log::warn!("Draft release {} is pending", release.name());
            return Ok(StatusReport {
                last_release: last,
                freshness: None,
                next_version: None,
                local_packages,
            });
        }

        let remote = match last.clone() {
            Some(release) => RemoteSnapshot {
                assets: client.list_assets(release.id).await?,
                release: Some(release),
            },
            None => RemoteSnapshot::default(),
        };
        let freshness = check_freshness(client, self.config, &remote).await?;
        let next_version = CalendarVersion::next(
            self.today,
            remote.release.as_ref().map(GitHubRelease::name),
        )?;

        Ok(StatusReport {
            last_release: last,
            freshness: Some(freshness),
            next_version: Some(next_version.to_string()),
            local_packages,
        })
    }
}
