//! Retention policy for the local release set.
//!
//! Keeps the most recent full package and the `retain_deltas` most recent
//! delta packages. Other entries are never pruned. Files that were never in
//! the manifest are left alone.

use super::{MANIFEST_FILE_NAME, PackageKind, ReleaseLine, ReleaseManifest};
use crate::error::Result;
use std::io::ErrorKind;
use std::path::Path;

/// Split of a manifest into surviving and deleted entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    /// Entries to keep, in original order
    pub keep: Vec<ReleaseLine>,
    /// Entries to delete, in original order
    pub remove: Vec<ReleaseLine>,
}

impl PrunePlan {
    /// Decide which entries survive the retention policy
    pub fn new(lines: &[ReleaseLine], retain_deltas: usize) -> Self {
        let full_count = lines
            .iter()
            .filter(|l| l.kind() == PackageKind::Full)
            .count();
        let delta_count = lines
            .iter()
            .filter(|l| l.kind() == PackageKind::Delta)
            .count();

        // Number of oldest entries of each kind to drop
        let mut drop_full = full_count.saturating_sub(1);
        let mut drop_delta = delta_count.saturating_sub(retain_deltas);

        let mut plan = Self::default();
        for line in lines {
            let doomed = match line.kind() {
                PackageKind::Full if drop_full > 0 => {
                    drop_full -= 1;
                    true
                }
                PackageKind::Delta if drop_delta > 0 => {
                    drop_delta -= 1;
                    true
                }
                _ => false,
            };

            if doomed {
                plan.remove.push(line.clone());
            } else {
                plan.keep.push(line.clone());
            }
        }
        plan
    }

    /// Whether the plan deletes nothing
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty()
    }
}

/// Result of pruning a release directory
#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    /// Manifest after pruning
    pub manifest: ReleaseManifest,
    /// File names removed from the manifest
    pub removed: Vec<String>,
}

/// Apply the retention policy to a release directory.
///
/// Deletes the backing file of every pruned entry (already missing files are
/// skipped) and rewrites the manifest with the survivors in original order.
pub async fn prune_release_dir(release_dir: &Path, retain_deltas: usize) -> Result<PruneOutcome> {
    let manifest_path = release_dir.join(MANIFEST_FILE_NAME);
    let manifest = ReleaseManifest::read(&manifest_path).await?;
    let plan = PrunePlan::new(&manifest.lines, retain_deltas);

    if plan.is_noop() {
        log::debug!("Nothing to prune in {}", release_dir.display());
        return Ok(PruneOutcome {
            manifest,
            removed: Vec::new(),
        });
    }

    let mut removed = Vec::with_capacity(plan.remove.len());
    for line in &plan.remove {
        let path = release_dir.join(&line.filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::info!("Pruned {}", line.filename),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::warn!("{} already absent, dropping from manifest", line.filename)
            }
            Err(e) => return Err(e.into()),
        }
        removed.push(line.filename.clone());
    }

    let manifest = ReleaseManifest::new(plan.keep);
    manifest.write(&manifest_path).await?;

    Ok(PruneOutcome { manifest, removed })
}
