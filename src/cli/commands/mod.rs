//! Command execution.
//!
//! Failures of a command turn into exit codes here. Argument and
//! configuration errors propagate to `main`, which exits 1.

mod is_on_pypi;
mod publish;
mod unlocked_deps;

use crate::cli::{Args, Command, OutputManager, RuntimeConfig};
use crate::config::Config;
use crate::error::{DepypiError, Result};

use is_on_pypi::execute_is_on_pypi;
use publish::execute_publish;
use unlocked_deps::execute_has_unlocked_deps;

/// Execute the command named in `args` and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    // Rejected here, before any external command runs or any file is touched.
    if let Err(e) = args.validate() {
        let output = OutputManager::new(false, false);
        report_failure(&output, args.command.name(), &e);
        return Ok(1);
    }

    let config = Config::from_env()?;
    let runtime = RuntimeConfig::new(&args, config);

    let result = match &args.command {
        Command::Upload(publish) => {
            execute_publish(publish, crate::publisher::PublishAction::Upload, &runtime).await
        }
        Command::Register(publish) => {
            execute_publish(publish, crate::publisher::PublishAction::Register, &runtime).await
        }
        Command::IsOnPypi { test, path } => {
            execute_is_on_pypi(*test, path.as_ref(), &runtime).await
        }
        Command::HasUnlockedDeps { path } => {
            execute_has_unlocked_deps(path.as_ref(), &runtime).await
        }
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(runtime.output(), args.command.name(), &e);
            Ok(1)
        }
    }
}

fn report_failure(output: &OutputManager, command: &str, error: &DepypiError) {
    log::debug!("Command '{}' failed: {:?}", command, error);
    output.error(&format!("Command '{}' failed: {}", command, error));

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        output.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            output.println(&format!("  • {}", suggestion));
        }
    }
}
