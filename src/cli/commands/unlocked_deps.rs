//! `hasUnlockedDeps` command.

use crate::build_tool::SetupPy;
use crate::cli::RuntimeConfig;
use crate::cli::args::working_dir;
use crate::deps::DependencyLister;
use crate::error::Result;
use std::path::PathBuf;

pub(super) async fn execute_has_unlocked_deps(
    path: Option<&PathBuf>,
    runtime: &RuntimeConfig,
) -> Result<()> {
    let dir = working_dir(path);
    let tool = SetupPy::new(&runtime.config().python, &dir)?;
    let declared = DependencyLister::new(&tool).declared(&dir).await?;

    let output = runtime.output();
    if declared.is_empty() {
        output.info("No declared dependencies found");
        return Ok(());
    }

    output.info(&format!("Found {} declared dependencies:", declared.len()));
    for dependency in &declared {
        let state = if dependency.is_locked() {
            "locked"
        } else {
            "unlocked"
        };
        output.indent(&format!("{} ({})", dependency.requirement, state));
    }

    let unlocked = declared.iter().filter(|d| !d.is_locked()).count();
    if unlocked == 0 {
        output.success("All declared dependencies are locked");
    } else {
        output.warn(&format!(
            "{} of {} declared dependencies are unlocked",
            unlocked,
            declared.len()
        ));
    }
    Ok(())
}
