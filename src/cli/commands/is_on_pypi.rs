//! `isOnPypi` command: read-only existence probe.

use crate::build_tool::{PackageIdentity, SetupPy};
use crate::cli::RuntimeConfig;
use crate::cli::args::working_dir;
use crate::error::Result;
use crate::index::{IndexClient, ProbeOutcome};
use crate::target::PublishTarget;
use std::path::PathBuf;

pub(super) async fn execute_is_on_pypi(
    test: bool,
    path: Option<&PathBuf>,
    runtime: &RuntimeConfig,
) -> Result<()> {
    let target = if test {
        PublishTarget::Test
    } else {
        PublishTarget::Live
    };

    let config = runtime.config();
    let tool = SetupPy::new(&config.python, working_dir(path))?;
    let PackageIdentity { name, version } = PackageIdentity::query(&tool).await?;

    let index = IndexClient::new(config)?;
    let url = index.artifact_url(target, &name, &version);
    let outcome = index.check_url(&url).await;
    let message = availability_line(&name, &version, target, &outcome);

    // An unreachable index is neither "available" nor "not available".
    if let ProbeOutcome::Indeterminate { .. } = outcome {
        runtime.output().warn(&message);
        return outcome.into_result(&url).map(|_| ());
    }
    runtime.output().info(&message);
    Ok(())
}

fn availability_line(
    name: &str,
    version: &str,
    target: PublishTarget,
    outcome: &ProbeOutcome,
) -> String {
    match outcome {
        ProbeOutcome::Available => {
            format!("package {name} of version {version} is available on {target}")
        }
        ProbeOutcome::NotAvailable { .. } => {
            format!("package {name} of version {version} is not on {target}")
        }
        ProbeOutcome::Indeterminate { reason } => format!(
            "could not determine whether package {name} of version {version} is on {target}: {reason}"
        ),
    }
}
