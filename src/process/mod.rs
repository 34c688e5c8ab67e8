//! External command execution.
//!
//! The build, signing and packaging tools are opaque subprocesses. They run
//! through `CommandRunner` so tests can substitute canned results.

use crate::error::{CliError, ReleaseError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

/// A command line to execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory, inherited when `None`
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Arguments hidden from logs and error messages (passphrases)
    pub secrets: Vec<String>,
}

impl CommandSpec {
    /// Start a command line
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that must not be displayed
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        self.secrets.push(arg.clone());
        self.args.push(arg);
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if self.secrets.iter().any(|s| arg.contains(s.as_str())) {
                write!(f, " ***")?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when terminated by a signal
    pub exit_code: i32,
    /// Combined stdout and stderr
    pub output: String,
}

impl CommandOutput {
    /// Whether the command exited with code zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to exit
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command, failing on a non-zero exit code
    async fn run_checked(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let output = self.run(command).await?;
        if !output.success() {
            return Err(ReleaseError::Cli(CliError::ExecutionFailed {
                command: command.to_string(),
                reason: format!(
                    "exited with code {}\n{}",
                    output.exit_code,
                    output.output.trim_end()
                ),
            }));
        }
        Ok(output)
    }
}

/// Runs commands as real subprocesses
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        log::info!("Running: {}", command);

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| {
            ReleaseError::Cli(CliError::ExecutionFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_code = output.status.code().unwrap_or(-1);
        log::debug!("{} exited with {}", command.program, exit_code);

        Ok(CommandOutput {
            exit_code,
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hides_secrets() {
        let spec = CommandSpec::new("signtool")
            .args(["sign", "/p"])
            .secret_arg("hunter2")
            .arg("App.exe");
        assert_eq!(spec.to_string(), "signtool sign /p *** App.exe");
    }

    #[test]
    fn test_display_hides_embedded_secret() {
        let spec = CommandSpec::new("apksigner")
            .arg("--ks-pass")
            .arg("pass:hunter2");
        let spec = CommandSpec {
            secrets: vec!["hunter2".to_string()],
            ..spec
        };
        assert_eq!(spec.to_string(), "apksigner --ks-pass ***");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err 1>&2; exit 3"]);
        let output = SystemCommandRunner.run(&spec).await.unwrap();
        assert_eq!(output.exit_code, 3);
        assert!(output.output.contains("out"));
        assert!(output.output.contains("err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_checked_fails_on_nonzero_exit() {
        let spec = CommandSpec::new("sh").args(["-c", "exit 1"]);
        let err = SystemCommandRunner.run_checked(&spec).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Cli(CliError::ExecutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let spec = CommandSpec::new("definitely-not-a-real-tool-4f1c");
        assert!(SystemCommandRunner.run(&spec).await.is_err());
    }
}
