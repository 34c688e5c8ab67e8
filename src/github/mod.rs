//! GitHub integration for release operations.
//!
//! `RemoteReleaseClient` is the seam the reconciler talks to. Every call is
//! a single stateless request/response and every failure is fatal to the
//! run; nothing here retries.

mod release_manager;
mod types;

pub use release_manager::{GitHubReleaseManager, asset_upload_url};
pub use types::{GitHubAsset, GitHubRelease};

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

/// Operations against a release host
#[async_trait]
pub trait RemoteReleaseClient: Send + Sync {
    /// All releases, newest first, in the order the host returns them
    async fn list_releases(&self) -> Result<Vec<GitHubRelease>>;

    /// Assets attached to a release
    async fn list_assets(&self, release_id: u64) -> Result<Vec<GitHubAsset>>;

    /// Create a release whose tag is derived from its name
    async fn create_release(
        &self,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> Result<GitHubRelease>;

    /// Upload a local file as an asset named after the file
    async fn upload_asset(&self, release: &GitHubRelease, path: &Path) -> Result<()>;

    /// Download an asset to `destination`
    async fn download_asset(&self, asset_id: u64, destination: &Path) -> Result<()>;

    /// Raw bytes of an asset, without persisting them
    async fn fetch_raw_asset_content(&self, asset_id: u64) -> Result<Bytes>;

    /// First release of the listing, skipping drafts unless `include_drafts`
    async fn get_last_release(&self, include_drafts: bool) -> Result<Option<GitHubRelease>> {
        Ok(self
            .list_releases()
            .await?
            .into_iter()
            .find(|release| include_drafts || !release.draft))
    }

    /// Release whose name or tag equals `name`
    async fn find_release(&self, name: &str) -> Result<Option<GitHubRelease>> {
        Ok(self
            .list_releases()
            .await?
            .into_iter()
            .find(|release| release.name() == name || release.tag_name == name))
    }
}
