//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use delta_publish::error::{ReleaseError, RemoteError, Result};
use delta_publish::manifest::{MANIFEST_FILE_NAME, ReleaseLine, ReleaseManifest};
use delta_publish::{
    CommandOutput, CommandRunner, CommandSpec, EnvConfig, GitHubAsset, GitHubRelease,
    PublishConfig, RemoteReleaseClient,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const PACK_ID: &str = "App";

/// Configuration rooted in `base`, without GitHub settings
pub fn test_config(base: &Path) -> PublishConfig {
    let text = format!(
        "project = \"App.csproj\"\npack_id = \"{PACK_ID}\"\nmain_exe = \"App.exe\"\ntarget = \"win-x64\"\n"
    );
    PublishConfig::from_toml(&text, base, &EnvConfig::default()).unwrap()
}

pub fn full_name(version: &str) -> String {
    format!("{PACK_ID}-{version}-full.nupkg")
}

pub fn delta_name(version: &str) -> String {
    format!("{PACK_ID}-{version}-delta.nupkg")
}

pub fn manifest_line(filename: &str) -> ReleaseLine {
    ReleaseLine {
        hash: format!("{:040X}", filename.len()),
        filename: filename.to_string(),
        filesize: 42,
    }
}

/// Write package files plus a manifest listing them
pub fn write_release_dir(dir: &Path, packages: &[String]) -> String {
    std::fs::create_dir_all(dir).unwrap();
    for name in packages {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
    let manifest = ReleaseManifest::new(packages.iter().map(|p| manifest_line(p)).collect());
    let text = manifest.to_text();
    std::fs::write(dir.join(MANIFEST_FILE_NAME), &text).unwrap();
    text
}

pub fn release(id: u64, name: &str, draft: bool) -> GitHubRelease {
    GitHubRelease {
        id,
        title: Some(name.to_string()),
        tag_name: name.to_string(),
        draft,
        prerelease: false,
        upload_url: format!("https://uploads.example/releases/{id}/assets{{?name,label}}"),
        html_url: format!("https://github.com/acme/app/releases/tag/{name}"),
    }
}

/// In-memory release host
#[derive(Default)]
pub struct FakeReleaseClient {
    pub releases: Mutex<Vec<GitHubRelease>>,
    pub assets: Mutex<HashMap<u64, Vec<GitHubAsset>>>,
    pub contents: Mutex<HashMap<u64, Vec<u8>>>,
    pub created: Mutex<Vec<(String, bool)>>,
    pub uploaded: Mutex<Vec<String>>,
    pub downloaded: Mutex<Vec<String>>,
    pub fail_uploads: bool,
    pub fail_listing: bool,
    pub fail_assets: bool,
}

impl FakeReleaseClient {
    pub fn with_releases(releases: Vec<GitHubRelease>) -> Self {
        Self {
            releases: Mutex::new(releases),
            ..Self::default()
        }
    }

    /// Attach an asset with content to a release
    pub fn add_asset(&self, release_id: u64, name: &str, content: &[u8]) {
        let mut contents = self.contents.lock().unwrap();
        let id = 1000 + contents.len() as u64;
        contents.insert(id, content.to_vec());
        self.assets
            .lock()
            .unwrap()
            .entry(release_id)
            .or_default()
            .push(GitHubAsset {
                id,
                name: name.to_string(),
                size: content.len() as u64,
            });
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, bool)> {
        self.created.lock().unwrap().clone()
    }

    fn unavailable(operation: &str) -> ReleaseError {
        ReleaseError::Remote(RemoteError::Status {
            operation: operation.to_string(),
            status: 502,
            body: "Bad Gateway".to_string(),
        })
    }

    fn content(&self, asset_id: u64) -> Result<Vec<u8>> {
        self.contents
            .lock()
            .unwrap()
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| {
                ReleaseError::Remote(RemoteError::Status {
                    operation: format!("fetch asset {asset_id}"),
                    status: 404,
                    body: "Not Found".to_string(),
                })
            })
    }
}

#[async_trait]
impl RemoteReleaseClient for FakeReleaseClient {
    async fn list_releases(&self) -> Result<Vec<GitHubRelease>> {
        if self.fail_listing {
            return Err(Self::unavailable("list releases"));
        }
        Ok(self.releases.lock().unwrap().clone())
    }

    async fn list_assets(&self, release_id: u64) -> Result<Vec<GitHubAsset>> {
        if self.fail_assets {
            return Err(Self::unavailable("list assets"));
        }
        Ok(self
            .assets
            .lock()
            .unwrap()
            .get(&release_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_release(
        &self,
        name: &str,
        draft: bool,
        _prerelease: bool,
    ) -> Result<GitHubRelease> {
        let mut releases = self.releases.lock().unwrap();
        let created = release(500 + releases.len() as u64, name, draft);
        releases.insert(0, created.clone());
        self.created.lock().unwrap().push((name.to_string(), draft));
        Ok(created)
    }

    async fn upload_asset(&self, _release: &GitHubRelease, path: &Path) -> Result<()> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail_uploads {
            return Err(ReleaseError::Remote(RemoteError::Timeout {
                operation: format!("upload {name}"),
                seconds: 240,
            }));
        }
        self.uploaded.lock().unwrap().push(name);
        Ok(())
    }

    async fn download_asset(&self, asset_id: u64, destination: &Path) -> Result<()> {
        let content = self.content(asset_id)?;
        std::fs::write(destination, content)?;
        self.downloaded
            .lock()
            .unwrap()
            .push(destination.file_name().unwrap().to_string_lossy().into_owned());
        Ok(())
    }

    async fn fetch_raw_asset_content(&self, asset_id: u64) -> Result<Bytes> {
        Ok(Bytes::from(self.content(asset_id)?))
    }
}

/// Command runner that imitates the packaging tool.
///
/// `pack` writes a full and a delta package for the requested version into
/// the output directory, appends them to the manifest, and drops an
/// installer next to them. Every other command succeeds without effect.
#[derive(Default)]
pub struct FakeToolchain {
    pub commands: Mutex<Vec<CommandSpec>>,
    pub skip_delta_file: bool,
}

impl FakeToolchain {
    pub fn programs(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.program.clone())
            .collect()
    }

    fn arg_after<'c>(command: &'c CommandSpec, flag: &str) -> &'c str {
        let index = command.args.iter().position(|a| a == flag).unwrap();
        &command.args[index + 1]
    }

    fn pack(&self, command: &CommandSpec) -> std::io::Result<()> {
        let version = Self::arg_after(command, "--packVersion");
        let out = PathBuf::from(Self::arg_after(command, "--outputDir"));

        let full = full_name(version);
        let delta = delta_name(version);
        std::fs::write(out.join(&full), b"full")?;
        if !self.skip_delta_file {
            std::fs::write(out.join(&delta), b"delta")?;
        }
        std::fs::write(out.join(format!("{PACK_ID}-win-Setup.exe")), b"setup")?;

        let manifest_path = out.join(MANIFEST_FILE_NAME);
        let mut text = std::fs::read_to_string(&manifest_path).unwrap_or_default();
        for name in [&delta, &full] {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&manifest_line(name).to_string());
        }
        std::fs::write(manifest_path, text)
    }
}

#[async_trait]
impl CommandRunner for FakeToolchain {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.clone());
        if command.args.first().map(String::as_str) == Some("pack") {
            self.pack(command)?;
        }
        Ok(CommandOutput {
            exit_code: 0,
            output: String::new(),
        })
    }
}
