//! Build, sign and package the application through external tools.
//!
//! The pipeline only assembles command lines; the tools themselves produce
//! the binaries, the full/delta packages and the updated manifest.

use crate::config::{PublishConfig, SigningSettings};
use crate::error::{ConfigError, ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};
use std::path::PathBuf;

/// Timestamp server used for Authenticode signatures
const TIMESTAMP_URL: &str = "http://timestamp.digicert.com";

/// Operating system family of a runtime identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `win-*`
    Windows,
    /// `osx-*`
    MacOs,
    /// `linux-*`
    Linux,
    /// `android-*`
    Android,
}

impl Platform {
    /// Platform of a runtime identifier such as `win-x64` or `osx-arm64`
    pub fn from_target(target: &str) -> Result<Self> {
        let family = target.split('-').next().unwrap_or_default();
        match family {
            "win" => Ok(Self::Windows),
            "osx" | "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "android" => Ok(Self::Android),
            _ => Err(ReleaseError::Config(ConfigError::Invalid {
                field: "target".to_string(),
                reason: format!("unsupported runtime identifier '{}'", target),
            })),
        }
    }

    /// Default signing tool, `None` for platforms that are not signed
    pub fn default_sign_tool(self) -> Option<&'static str> {
        match self {
            Self::Windows => Some("signtool"),
            Self::MacOs => Some("rcodesign"),
            Self::Android => Some("apksigner"),
            Self::Linux => None,
        }
    }
}

/// Runs the external toolchain for one version
pub struct BuildPipeline<'a> {
    config: &'a PublishConfig,
    runner: &'a dyn CommandRunner,
    platform: Platform,
}

impl<'a> BuildPipeline<'a> {
    /// Create a pipeline for the configured target
    pub fn new(config: &'a PublishConfig, runner: &'a dyn CommandRunner) -> Result<Self> {
        Ok(Self {
            config,
            runner,
            platform: Platform::from_target(&config.target)?,
        })
    }

    /// Target platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Publish, sign and package `version` into the release directory
    pub async fn run(&self, version: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.release_dir).await?;

        self.runner.run_checked(&self.publish_command(version)).await?;

        if let Some(sign) = self.sign_command() {
            self.runner.run_checked(&sign).await?;
        } else {
            log::info!("No signing configured for {:?}, skipping", self.platform);
        }

        self.runner.run_checked(&self.pack_command(version)).await?;
        Ok(())
    }

    /// Build tool invocation
    pub fn publish_command(&self, version: &str) -> CommandSpec {
        let c = self.config;
        CommandSpec::new(&c.tools.publish)
            .arg("publish")
            .arg(&c.project)
            .args(["-c", "Release", "-r"])
            .arg(&c.target)
            .arg("-o")
            .arg(path_arg(&c.publish_dir))
            .arg(format!("-p:Version={}", version))
    }

    /// Signing tool invocation for the main executable, if signing applies
    pub fn sign_command(&self) -> Option<CommandSpec> {
        let signing = self.config.signing.as_ref()?;
        let tool = self
            .config
            .tools
            .sign
            .clone()
            .or_else(|| self.platform.default_sign_tool().map(str::to_string))?;
        let target = path_arg(&self.main_exe_path());
        let certificate = path_arg(&signing.certificate);
        let SigningSettings { passphrase, .. } = signing;

        let spec = match self.platform {
            Platform::Windows => CommandSpec::new(tool)
                .args(["sign", "/f"])
                .arg(certificate)
                .arg("/p")
                .secret_arg(passphrase)
                .args(["/fd", "SHA256", "/td", "SHA256", "/tr", TIMESTAMP_URL])
                .arg(target),
            Platform::MacOs => CommandSpec::new(tool)
                .args(["sign", "--p12-file"])
                .arg(certificate)
                .arg("--p12-password")
                .secret_arg(passphrase)
                .args(["--code-signature-flags", "runtime"])
                .arg(target),
            Platform::Android => {
                let mut spec = CommandSpec::new(tool)
                    .args(["sign", "--ks"])
                    .arg(certificate)
                    .arg("--ks-pass")
                    .arg(format!("pass:{}", passphrase))
                    .arg(target);
                spec.secrets.push(passphrase.clone());
                spec
            }
            Platform::Linux => return None,
        };
        Some(spec)
    }

    /// Packaging tool invocation
    pub fn pack_command(&self, version: &str) -> CommandSpec {
        let c = self.config;
        let mut spec = CommandSpec::new(&c.tools.pack)
            .args(["pack", "--packId"])
            .arg(&c.pack_id)
            .arg("--packVersion")
            .arg(version)
            .arg("--packDir")
            .arg(path_arg(&c.publish_dir))
            .arg("--mainExe")
            .arg(&c.main_exe)
            .arg("--outputDir")
            .arg(path_arg(&c.release_dir))
            .arg("--runtime")
            .arg(&c.target);
        if let Some(channel) = &c.channel {
            spec = spec.arg("--channel").arg(channel);
        }
        spec
    }

    fn main_exe_path(&self) -> PathBuf {
        self.config.publish_dir.join(&self.config.main_exe)
    }
}

fn path_arg(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
