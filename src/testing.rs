//! In-memory [`BuildTool`] for unit tests.

use crate::build_tool::BuildTool;
use crate::error::{DepypiError, Result};
use crate::target::PublishTarget;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub(crate) struct FakeBuildTool {
    name: String,
    version: String,
    fail_publish: bool,
    fail_dry_run: bool,
    dry_run: Vec<String>,
    watched_file: Option<PathBuf>,
    calls: RefCell<Vec<String>>,
    seen_file: RefCell<Option<Option<String>>>,
}

impl FakeBuildTool {
    pub(crate) fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    /// Make `publish` and `register` exit non-zero
    pub(crate) fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub(crate) fn failing_dry_run(mut self) -> Self {
        self.fail_dry_run = true;
        self
    }

    pub(crate) fn with_dry_run(mut self, lines: &[&str]) -> Self {
        self.dry_run = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Snapshot `path` whenever a publishing command runs
    pub(crate) fn watching(mut self, path: &Path) -> Self {
        self.watched_file = Some(path.to_path_buf());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Contents of the watched file during the last publishing command
    pub(crate) fn seen_file(&self) -> Option<Option<String>> {
        self.seen_file.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn mutate(&self, command: String) -> Result<String> {
        if let Some(path) = &self.watched_file {
            *self.seen_file.borrow_mut() = Some(std::fs::read_to_string(path).ok());
        }
        self.record(command.clone());
        if self.fail_publish {
            return Err(DepypiError::PublishCommandFailed {
                command,
                status: "exit status: 1".to_string(),
                stderr: "Upload failed (403): Invalid or non-existent authentication information."
                    .to_string(),
            });
        }
        Ok("Server response (200): OK".to_string())
    }
}

impl BuildTool for FakeBuildTool {
    async fn query_name(&self) -> Result<String> {
        self.record("query_name".to_string());
        Ok(self.name.clone())
    }

    async fn query_version(&self) -> Result<String> {
        self.record("query_version".to_string());
        Ok(self.version.clone())
    }

    async fn publish(&self, target: PublishTarget, dist_type: &str) -> Result<String> {
        self.mutate(format!("publish {} {}", dist_type, target.section()))
    }

    async fn register(&self, target: PublishTarget) -> Result<String> {
        self.mutate(format!("register {}", target.section()))
    }

    async fn install_dry_run(&self, path: &Path) -> Result<Vec<String>> {
        self.record(format!("install_dry_run {}", path.display()));
        if self.fail_dry_run {
            return Err(DepypiError::ExternalToolFailure {
                command: "python setup.py install -v -n".to_string(),
                reason: "exited with exit status: 1".to_string(),
            });
        }
        Ok(self.dry_run.clone())
    }
}
