//! GitHub REST payloads. Only the fields this tool reads are modelled.

use serde::{Deserialize, Serialize};

/// A release on the release host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRelease {
    /// Release ID
    pub id: u64,
    /// Display name; GitHub allows it to be null
    #[serde(rename = "name", default)]
    pub title: Option<String>,
    /// Git tag of the release
    pub tag_name: String,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Upload URL template, e.g. `.../assets{?name,label}`
    pub upload_url: String,
    /// Release page
    #[serde(default)]
    pub html_url: String,
}

impl GitHubRelease {
    /// Release name, falling back to the tag when the name is empty
    pub fn name(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.tag_name,
        }
    }
}

/// A file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubAsset {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_name_falls_back_to_tag() {
        let release: GitHubRelease = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": null,
            "tag_name": "2024.115.0",
            "draft": false,
            "prerelease": false,
            "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
            "html_url": "https://github.com/o/r/releases/tag/2024.115.0",
            "assets": []
        }))
        .unwrap();
        assert_eq!(release.name(), "2024.115.0");
    }

    #[test]
    fn test_release_name_prefers_title() {
        let release: GitHubRelease = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "2024.115.1",
            "tag_name": "v2024.115.1",
            "upload_url": "u"
        }))
        .unwrap();
        assert_eq!(release.name(), "2024.115.1");
        assert!(!release.draft);
    }
}
