//! Status command implementation.
//!
//! Displays the remote release state and what the next publish would do,
//! without touching the release directory.

use crate::cli::RuntimeConfig;
use crate::config::PublishConfig;
use crate::error::Result;
use crate::github::{GitHubReleaseManager, RemoteReleaseClient};
use crate::process::SystemCommandRunner;
use crate::reconcile::{Freshness, ReleaseReconciler};

/// Execute status command
pub(super) async fn execute_status(publish_config: &PublishConfig, config: &RuntimeConfig) -> Result<()> {
    let github = publish_config
        .github
        .as_ref()
        .map(|settings| GitHubReleaseManager::new(settings.clone(), publish_config.upload_timeout))
        .transpose()?;
    let client = github.as_ref().map(|g| g as &dyn RemoteReleaseClient);
    let runner = SystemCommandRunner;

    let report = ReleaseReconciler::new(publish_config, client, &runner)
        .status()
        .await?;

    config.println(&format!(
        "📁 {} ({} package(s) in manifest)",
        publish_config.release_dir.display(),
        report.local_packages
    ));

    if client.is_none() {
        config.println("☁️  GitHub: not configured");
    } else {
        match &report.last_release {
            Some(release) if release.draft => {
                config.warning_println(&format!("Draft release {} is pending", release.name()));
            }
            Some(release) => config.println(&format!("☁️  Last release: {}", release.name())),
            None => config.println("☁️  Last release: none"),
        }
    }

    match report.freshness {
        Some(Freshness::Fresh) => config.println("✓ Local release directory is up to date"),
        Some(Freshness::Stale) => config.println("🔄 Local release directory will be refreshed"),
        None => {}
    }

    match &report.next_version {
        Some(version) => config.println(&format!("🏷  Next version: {}", version)),
        None => config.println("🏷  Next version: blocked by pending draft"),
    }

    Ok(())
}
