//! Publish configuration.
//!
//! `EnvConfig` is a snapshot of the process environment taken once at
//! startup. `PublishConfig` is built from a TOML file plus that snapshot and
//! is never mutated afterwards.

use crate::error::{ConfigError, ReleaseError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "publish.toml";

/// Default GitHub REST endpoint
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Environment variable holding the signing certificate passphrase
pub const SIGN_PASSWORD_VAR: &str = "SIGN_CERTIFICATE_PASSWORD";

/// Immutable snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs (tests, embedding)
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of a variable
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    /// GitHub token from `GH_TOKEN`, falling back to `GITHUB_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.get("GH_TOKEN").or_else(|| self.get("GITHUB_TOKEN"))
    }
}

/// On-disk shape of the configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    project: Option<String>,
    pack_id: Option<String>,
    main_exe: Option<String>,
    target: Option<String>,
    channel: Option<String>,
    release_dir: Option<PathBuf>,
    publish_dir: Option<PathBuf>,
    retain_deltas: Option<usize>,
    upload_timeout_secs: Option<u64>,
    github: Option<RawGitHub>,
    signing: Option<RawSigning>,
    #[serde(default)]
    tools: RawTools,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGitHub {
    owner: Option<String>,
    repo: Option<String>,
    api_url: Option<String>,
    #[serde(default)]
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSigning {
    certificate: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTools {
    publish: Option<String>,
    pack: Option<String>,
    sign: Option<String>,
}

/// GitHub integration settings. Present only when a token is available.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API base URL
    pub api_url: String,
    /// Bearer token
    pub token: String,
    /// Mark created releases as prerelease
    pub prerelease: bool,
}

/// Code signing settings
#[derive(Debug, Clone)]
pub struct SigningSettings {
    /// Certificate or keystore path
    pub certificate: PathBuf,
    /// Certificate passphrase
    pub passphrase: String,
}

/// External tool executables
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Build/publish toolchain
    pub publish: String,
    /// Packaging tool producing full/delta packages
    pub pack: String,
    /// Signing tool override; platform default when `None`
    pub sign: Option<String>,
}

/// Immutable configuration for one publish run
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Project identifier handed to the build tool
    pub project: String,
    /// Package identifier used in package file names
    pub pack_id: String,
    /// Main executable inside the published output
    pub main_exe: String,
    /// Target runtime identifier, e.g. `win-x64`
    pub target: String,
    /// Optional release channel
    pub channel: Option<String>,
    /// Local release directory
    pub release_dir: PathBuf,
    /// Build output directory
    pub publish_dir: PathBuf,
    /// Number of delta packages to keep
    pub retain_deltas: usize,
    /// Timeout for a single asset upload
    pub upload_timeout: Duration,
    /// GitHub integration, `None` when no token is configured
    pub github: Option<GitHubSettings>,
    /// Code signing, `None` when no certificate is configured
    pub signing: Option<SigningSettings>,
    /// External tool names
    pub tools: ToolSettings,
}

impl PublishConfig {
    /// Default number of delta packages retained
    pub const DEFAULT_RETAIN_DELTAS: usize = 4;

    /// Default asset upload timeout in seconds
    pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 240;

    /// Load the configuration file and resolve it against the environment.
    ///
    /// Relative directories are resolved against the file's parent directory.
    pub fn load(path: &Path, env: &EnvConfig) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReleaseError::Config(ConfigError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&text, base, env)
    }

    /// Build a configuration from TOML text
    pub fn from_toml(text: &str, base_dir: &Path, env: &EnvConfig) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)?;

        let project = required(raw.project, "project")?;
        let pack_id = required(raw.pack_id, "pack_id")?;
        let target = required(raw.target, "target")?;
        let main_exe = raw.main_exe.unwrap_or_else(|| pack_id.clone());

        let retain_deltas = raw.retain_deltas.unwrap_or(Self::DEFAULT_RETAIN_DELTAS);
        let upload_timeout_secs = raw
            .upload_timeout_secs
            .unwrap_or(Self::DEFAULT_UPLOAD_TIMEOUT_SECS);
        if upload_timeout_secs == 0 {
            return Err(ReleaseError::Config(ConfigError::Invalid {
                field: "upload_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            }));
        }

        let github = match raw.github {
            Some(gh) => {
                let owner = required(gh.owner, "github.owner")?;
                let repo = required(gh.repo, "github.repo")?;
                match env.github_token() {
                    Some(token) => Some(GitHubSettings {
                        owner,
                        repo,
                        api_url: gh
                            .api_url
                            .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string())
                            .trim_end_matches('/')
                            .to_string(),
                        token,
                        prerelease: gh.prerelease,
                    }),
                    None => {
                        log::warn!(
                            "No GH_TOKEN or GITHUB_TOKEN set, GitHub publishing is disabled"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let signing = match raw.signing {
            Some(signing) => Some(SigningSettings {
                certificate: resolve(base_dir, signing.certificate),
                passphrase: env.get(SIGN_PASSWORD_VAR).ok_or_else(|| {
                    ReleaseError::Config(ConfigError::Missing {
                        field: SIGN_PASSWORD_VAR.to_string(),
                    })
                })?,
            }),
            None => None,
        };

        Ok(Self {
            project,
            pack_id,
            main_exe,
            target,
            channel: raw.channel.filter(|c| !c.trim().is_empty()),
            release_dir: resolve(
                base_dir,
                raw.release_dir.unwrap_or_else(|| PathBuf::from("releases")),
            ),
            publish_dir: resolve(
                base_dir,
                raw.publish_dir.unwrap_or_else(|| PathBuf::from("publish")),
            ),
            retain_deltas,
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            github,
            signing,
            tools: ToolSettings {
                publish: raw.tools.publish.unwrap_or_else(|| "dotnet".to_string()),
                pack: raw.tools.pack.unwrap_or_else(|| "vpk".to_string()),
                sign: raw.tools.sign,
            },
        })
    }

    /// File name of the full package for a version
    pub fn full_package_name(&self, version: &str) -> String {
        match &self.channel {
            Some(channel) => format!("{}-{}-{}-full.nupkg", self.pack_id, version, channel),
            None => format!("{}-{}-full.nupkg", self.pack_id, version),
        }
    }

    /// Path of the local release manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.release_dir.join(crate::manifest::MANIFEST_FILE_NAME)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ReleaseError::Config(ConfigError::Missing {
                field: field.to_string(),
            })
        })
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
