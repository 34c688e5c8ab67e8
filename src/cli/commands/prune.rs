//! Prune command implementation.
//!
//! Applies the retention policy to the local release directory only.

use crate::cli::RuntimeConfig;
use crate::config::PublishConfig;
use crate::error::Result;
use crate::manifest::prune_release_dir;

/// Execute prune command
pub(super) async fn execute_prune(
    publish_config: &PublishConfig,
    config: &RuntimeConfig,
    retain: Option<usize>,
) -> Result<()> {
    let retain = retain.unwrap_or(publish_config.retain_deltas);
    config.verbose_println(&format!(
        "Pruning {} (keeping {} delta package(s))",
        publish_config.release_dir.display(),
        retain
    ));

    let outcome = prune_release_dir(&publish_config.release_dir, retain).await?;

    if outcome.removed.is_empty() {
        config.success_println("Nothing to prune");
    } else {
        config.success_println(&format!("Pruned {} package(s)", outcome.removed.len()));
        for name in &outcome.removed {
            config.indent(&format!("🗑  {}", name));
        }
    }
    config.indent(&format!("{} package(s) remain", outcome.manifest.len()));
    Ok(())
}
