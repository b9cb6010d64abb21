//! `upload` and `register` commands.

use crate::build_tool::SetupPy;
use crate::cli::{PublishArgs, RuntimeConfig};
use crate::error::Result;
use crate::index::IndexClient;
use crate::publisher::{PublishAction, PublishSession, Publisher};

/// Run `action` against the index selected by `args`
pub(super) async fn execute_publish(
    args: &PublishArgs,
    action: PublishAction,
    runtime: &RuntimeConfig,
) -> Result<()> {
    let target = args.target()?;
    let mut session =
        PublishSession::new(target, args.working_dir()).with_dist_type(args.dist_type.clone());
    if let Some(credentials) = args.credentials()? {
        session = session.with_credentials(credentials);
    }

    let config = runtime.config();
    let tool = SetupPy::new(&config.python, &session.working_dir)?;
    let index = IndexClient::new(config)?;
    let publisher = Publisher::new(
        tool,
        index,
        config.clone(),
        runtime.output().clone(),
        session,
    )
    .await?;
    let identity = publisher.identity();
    runtime.output().verbose(&format!(
        "Package {} version {} from {}",
        identity.name,
        identity.version,
        args.working_dir().display()
    ));

    let report = match action {
        PublishAction::Upload => publisher.upload().await?,
        PublishAction::Register => publisher.register().await?,
    };

    if report.credentials_injected {
        runtime
            .output()
            .verbose("Temporary credentials removed and original state restored");
    }
    log::info!(
        "{} of {} {} to {} finished",
        report.action,
        report.identity.name,
        report.identity.version,
        report.target
    );
    Ok(())
}
