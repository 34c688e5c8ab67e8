//! Completeness check and upload ordering for the release directory.

use crate::error::{ReleaseError, Result};
use crate::manifest::ReleaseManifest;
use std::path::{Path, PathBuf};

/// Fail if any manifest entry lacks its backing file
pub fn verify_release_dir(release_dir: &Path, manifest: &ReleaseManifest) -> Result<()> {
    for line in &manifest.lines {
        let path = release_dir.join(&line.filename);
        if !path.is_file() {
            return Err(ReleaseError::LocalFileMissing { path });
        }
    }
    Ok(())
}

/// Regular, non-hidden files of the release directory, sorted by name
/// ignoring ASCII case
pub async fn list_release_files(release_dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(release_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }
    names.sort_by(|a, b| {
        a.to_ascii_lowercase()
            .cmp(&b.to_ascii_lowercase())
            .then_with(|| a.cmp(b))
    });
    Ok(names)
}

/// Upload order: the directory listing reversed
pub fn upload_order<S: AsRef<str>>(listing: &[S]) -> Vec<String> {
    listing
        .iter()
        .rev()
        .map(|name| name.as_ref().to_string())
        .collect()
}

/// Files to upload, in upload order
pub async fn upload_plan(release_dir: &Path) -> Result<Vec<PathBuf>> {
    let listing = list_release_files(release_dir).await?;
    Ok(upload_order(&listing)
        .into_iter()
        .map(|name| release_dir.join(name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ReleaseLine;

    #[test]
    fn test_upload_order_reverses_listing() {
        assert_eq!(
            upload_order(&["A.exe", "RELEASES", "B-full.nupkg"]),
            ["B-full.nupkg", "RELEASES", "A.exe"]
        );
    }

    #[tokio::test]
    async fn test_listing_skips_dotfiles_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"").unwrap();
        std::fs::write(dir.path().join("RELEASES"), b"").unwrap();
        std::fs::write(dir.path().join("App-1-full.nupkg"), b"").unwrap();
        std::fs::create_dir(dir.path().join("tmp")).unwrap();

        let listing = list_release_files(dir.path()).await.unwrap();
        assert_eq!(listing, ["App-1-full.nupkg", "RELEASES"]);

        let plan = upload_plan(dir.path()).await.unwrap();
        assert_eq!(
            plan,
            [dir.path().join("RELEASES"), dir.path().join("App-1-full.nupkg")]
        );
    }

    #[tokio::test]
    async fn test_manifest_uploads_before_lowercase_packages() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "osulazer-2024.115.0-full.nupkg",
            "osulazer-2024.115.0-delta.nupkg",
            "RELEASES",
            "install.exe",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let listing = list_release_files(dir.path()).await.unwrap();
        assert_eq!(
            listing,
            [
                "install.exe",
                "osulazer-2024.115.0-delta.nupkg",
                "osulazer-2024.115.0-full.nupkg",
                "RELEASES",
            ]
        );
        assert_eq!(
            upload_order(&listing),
            [
                "RELEASES",
                "osulazer-2024.115.0-full.nupkg",
                "osulazer-2024.115.0-delta.nupkg",
                "install.exe",
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_listing_breaks_case_ties_by_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.txt"), b"").unwrap();
        std::fs::write(dir.path().join("App.txt"), b"").unwrap();

        let listing = list_release_files(dir.path()).await.unwrap();
        assert_eq!(listing, ["App.txt", "app.txt"]);
    }

    #[test]
    fn test_verify_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("App-1-full.nupkg"), b"x").unwrap();
        let manifest = ReleaseManifest::new(vec![
            ReleaseLine {
                hash: "a".to_string(),
                filename: "App-1-full.nupkg".to_string(),
                filesize: 1,
            },
            ReleaseLine {
                hash: "b".to_string(),
                filename: "App-1-delta.nupkg".to_string(),
                filesize: 1,
            },
        ]);

        match verify_release_dir(dir.path(), &manifest).unwrap_err() {
            ReleaseError::LocalFileMissing { path } => {
                assert_eq!(path, dir.path().join("App-1-delta.nupkg"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
