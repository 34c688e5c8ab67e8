//! Publish command implementation.
//!
//! Wires the real GitHub client and subprocess runner into the reconciler
//! and reports the outcome.

use crate::cli::RuntimeConfig;
use crate::config::PublishConfig;
use crate::error::Result;
use crate::github::{GitHubReleaseManager, RemoteReleaseClient};
use crate::process::SystemCommandRunner;
use crate::reconcile::{Freshness, PublishOptions, ReleaseReconciler};

/// Execute publish command
pub(super) async fn execute_publish(
    publish_config: &PublishConfig,
    config: &RuntimeConfig,
    version: Option<String>,
    skip_build: bool,
) -> Result<()> {
    config.section(&format!("Publishing {}", publish_config.pack_id));

    let github = match &publish_config.github {
        Some(settings) => {
            config.verbose_println(&format!("Repository: {}/{}", settings.owner, settings.repo));
            Some(GitHubReleaseManager::new(
                settings.clone(),
                publish_config.upload_timeout,
            )?)
        }
        None => {
            config.warning_println("No GitHub token configured, building and pruning locally only");
            None
        }
    };
    let client = github.as_ref().map(|g| g as &dyn RemoteReleaseClient);
    let runner = SystemCommandRunner;

    let mut reconciler = ReleaseReconciler::new(publish_config, client, &runner);
    let options = PublishOptions {
        version,
        skip_build,
    };
    let outcome = reconciler.run(&options).await?;

    match outcome.freshness {
        Some(Freshness::Fresh) => config.verbose_println("Local release directory was up to date"),
        Some(Freshness::Stale) => config.println(&format!(
            "🔄 Refreshed release directory ({} asset(s) downloaded)",
            outcome.downloaded.len()
        )),
        None => {}
    }

    config.success_println(&format!("Built version {}", outcome.version));

    if !outcome.pruned.is_empty() {
        config.println(&format!("🗑  Pruned {} package(s)", outcome.pruned.len()));
        for name in &outcome.pruned {
            config.indent(name);
        }
    }

    if !outcome.uploaded.is_empty() {
        config.success_println(&format!("Uploaded {} asset(s)", outcome.uploaded.len()));
        for name in &outcome.uploaded {
            config.indent(&format!("📦 {}", name));
        }
    }

    if let Some(url) = &outcome.release_url {
        config.success_println(&format!("Draft release ready: {}", url));
    }

    Ok(())
}
