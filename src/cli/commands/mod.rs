//! Command execution functions.
//!
//! Each command loads the configuration, runs, and reports. Failures are
//! printed with recovery suggestions and turned into exit code 1.

mod prune;
mod publish;
mod status;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{EnvConfig, PublishConfig};
use crate::error::Result;

use prune::execute_prune;
use publish::execute_publish;
use status::execute_status;

/// Execute the command selected by `args`
pub async fn execute_command(args: Args, env: &EnvConfig) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    if let Err(e) = args.validate() {
        config.error_println(&e.to_string());
        for suggestion in e.recovery_suggestions() {
            config.indent(&suggestion);
        }
        return Ok(1);
    }

    let result = match PublishConfig::load(&args.config, env) {
        Ok(publish_config) => {
            config.verbose_println(&format!("Loaded {}", args.config.display()));
            match &args.command {
                Command::Publish {
                    version,
                    skip_build,
                } => execute_publish(&publish_config, &config, version.clone(), *skip_build).await,
                Command::Prune { retain } => execute_prune(&publish_config, &config, *retain).await,
                Command::Status => execute_status(&publish_config, &config).await,
            }
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
