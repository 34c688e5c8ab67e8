//! Local/remote consistency check and release directory refresh.

use crate::config::PublishConfig;
use crate::error::Result;
use crate::github::{GitHubAsset, GitHubRelease, RemoteReleaseClient};
use crate::manifest::MANIFEST_FILE_NAME;
use std::io::ErrorKind;

/// Installer executables are rebuilt locally, never reused
pub const INSTALLER_SUFFIX: &str = "-Setup.exe";

/// Portable platform bundles are rebuilt locally, never reused
pub const BUNDLE_SUFFIX: &str = "-Portable.zip";

/// Whether the local release directory matches the last remote release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Local directory can be built upon as is
    Fresh,
    /// Local directory must be replaced by the remote release
    Stale,
}

/// Last published release and its assets
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    /// Newest non-draft release, if any
    pub release: Option<GitHubRelease>,
    /// Assets attached to `release`
    pub assets: Vec<GitHubAsset>,
}

impl RemoteSnapshot {
    /// The remote manifest asset
    pub fn manifest_asset(&self) -> Option<&GitHubAsset> {
        self.assets.iter().find(|a| a.name == MANIFEST_FILE_NAME)
    }
}

/// Compare the local release directory with the last remote release.
///
/// A release without a `RELEASES` asset was not produced by this tool and
/// counts as fresh. Otherwise both the full package of that release and an
/// identical manifest text must be present locally.
pub async fn check_freshness(
    client: &dyn RemoteReleaseClient,
    config: &PublishConfig,
    remote: &RemoteSnapshot,
) -> Result<Freshness> {
    let Some(release) = &remote.release else {
        log::info!("No previous release, local release directory is authoritative");
        return Ok(Freshness::Fresh);
    };

    let Some(manifest_asset) = remote.manifest_asset() else {
        log::warn!(
            "Release {} has no {} asset, skipping refresh",
            release.name(),
            MANIFEST_FILE_NAME
        );
        return Ok(Freshness::Fresh);
    };

    let full_package = config.full_package_name(release.name());
    let has_full_package = config.release_dir.join(&full_package).is_file();
    if !has_full_package {
        log::info!("{} missing locally", full_package);
        return Ok(Freshness::Stale);
    }

    let local_text = match tokio::fs::read(config.manifest_path()).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("Local {} missing", MANIFEST_FILE_NAME);
            return Ok(Freshness::Stale);
        }
        Err(e) => return Err(e.into()),
    };
    let remote_text = client.fetch_raw_asset_content(manifest_asset.id).await?;

    if local_text == remote_text.as_ref() {
        Ok(Freshness::Fresh)
    } else {
        log::info!("Local {} differs from release {}", MANIFEST_FILE_NAME, release.name());
        Ok(Freshness::Stale)
    }
}

/// Whether a remote asset should be downloaded during a refresh
pub fn is_reusable_asset(name: &str) -> bool {
    !(name.ends_with(INSTALLER_SUFFIX) || name.ends_with(BUNDLE_SUFFIX))
}

/// Wipe the release directory and repopulate it from the remote release.
///
/// Returns the names of the downloaded assets.
pub async fn refresh_release_dir(
    client: &dyn RemoteReleaseClient,
    config: &PublishConfig,
    remote: &RemoteSnapshot,
) -> Result<Vec<String>> {
    let dir = &config.release_dir;
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => log::info!("Removed stale {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    tokio::fs::create_dir_all(dir).await?;

    let mut downloaded = Vec::new();
    for asset in remote.assets.iter().filter(|a| is_reusable_asset(&a.name)) {
        client.download_asset(asset.id, &dir.join(&asset.name)).await?;
        downloaded.push(asset.name.clone());
    }
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installers_and_bundles_are_not_reused() {
        assert!(!is_reusable_asset("App-win-Setup.exe"));
        assert!(!is_reusable_asset("App-win-Portable.zip"));
        assert!(is_reusable_asset("App-2024.115.0-full.nupkg"));
        assert!(is_reusable_asset("App-2024.115.0-delta.nupkg"));
        assert!(is_reusable_asset(MANIFEST_FILE_NAME));
    }

    #[test]
    fn test_manifest_asset_lookup_is_exact() {
        let snapshot = RemoteSnapshot {
            release: None,
            assets: vec![
                GitHubAsset {
                    id: 1,
                    name: "RELEASES-beta".to_string(),
                    size: 0,
                },
                GitHubAsset {
                    id: 2,
                    name: "RELEASES".to_string(),
                    size: 0,
                },
            ],
        };
        assert_eq!(snapshot.manifest_asset().map(|a| a.id), Some(2));
    }
}
