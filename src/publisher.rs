//! Credential-scoped upload and registration.
//!
//! Each operation runs the same sequence: resolve credentials, inject them
//! if needed, run the build tool, probe the index, restore the credential
//! file. The restore happens on every path out of the operation.
//!
//! The credential file is a single per-user path. Two publish operations
//! running at once for the same account race on it; that is unsupported.

use crate::build_tool::{BuildTool, PackageIdentity};
use crate::cli::OutputManager;
use crate::config::Config;
use crate::credentials::{CredentialPlan, Credentials, PypircGuard, resolve_credentials};
use crate::error::Result;
use crate::index::{IndexClient, ProbeOutcome};
use crate::target::PublishTarget;
use std::fmt;
use std::path::PathBuf;

/// Default distribution format passed to `setup.py`
pub const DEFAULT_DIST_TYPE: &str = "sdist";

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// What a publish operation works against
#[derive(Debug, Clone)]
pub struct PublishSession {
    /// Index to publish to
    pub target: PublishTarget,
    /// Credentials supplied by the caller, if any
    pub credentials: Option<Credentials>,
    /// Directory containing `setup.py`
    pub working_dir: PathBuf,
    /// Distribution format (`sdist`, `bdist_wheel`, ...)
    pub dist_type: String,
}

impl PublishSession {
    /// Session against `target` for the project in `working_dir`
    pub fn new(target: PublishTarget, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            target,
            credentials: None,
            working_dir: working_dir.into(),
            dist_type: DEFAULT_DIST_TYPE.to_string(),
        }
    }

    /// Use explicit credentials instead of the credential file or environment
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the distribution format
    pub fn with_dist_type(mut self, dist_type: impl Into<String>) -> Self {
        self.dist_type = dist_type.into();
        self
    }
}

/// The two publishing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// Build and upload a distribution
    Upload,
    /// Register package metadata
    Register,
}

impl PublishAction {
    fn state(&self) -> &'static str {
        match self {
            PublishAction::Upload => "available",
            PublishAction::Register => "registered",
        }
    }
}

impl fmt::Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishAction::Upload => f.write_str("upload"),
            PublishAction::Register => f.write_str("register"),
        }
    }
}

/// What happened during a successful publish operation
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Operation that ran
    pub action: PublishAction,
    /// Index it ran against
    pub target: PublishTarget,
    /// Package that was published
    pub identity: PackageIdentity,
    /// Post-publish probe result
    pub verification: ProbeOutcome,
    /// Whether temporary credentials were written and then restored
    pub credentials_injected: bool,
}

/// Runs upload and register for one package against one index
pub struct Publisher<B: BuildTool> {
    tool: B,
    index: IndexClient,
    config: Config,
    output: OutputManager,
    session: PublishSession,
    identity: PackageIdentity,
    env: EnvLookup,
}

impl<B: BuildTool> fmt::Debug for Publisher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("session", &self.session)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<B: BuildTool> Publisher<B> {
    /// Create a publisher; queries the package identity once
    pub async fn new(
        tool: B,
        index: IndexClient,
        config: Config,
        output: OutputManager,
        session: PublishSession,
    ) -> Result<Self> {
        let identity = PackageIdentity::query(&tool).await?;
        Ok(Self {
            tool,
            index,
            config,
            output,
            session,
            identity,
            env: Box::new(|name| std::env::var(name).ok()),
        })
    }

    /// Replace how environment variables are read
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.env = Box::new(env);
        self
    }

    /// Package this publisher works on
    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    /// Build tool this publisher runs commands through
    pub fn tool(&self) -> &B {
        &self.tool
    }

    /// Upload a distribution and check that it became downloadable
    pub async fn upload(&self) -> Result<PublishReport> {
        self.run(PublishAction::Upload).await
    }

    /// Register the package and check that the version is listed
    pub async fn register(&self) -> Result<PublishReport> {
        self.run(PublishAction::Register).await
    }

    async fn run(&self, action: PublishAction) -> Result<PublishReport> {
        let guard = self.prepare_credentials()?;
        let credentials_injected = guard.is_some();

        let outcome = self.execute(action).await;

        let outcome = match guard {
            Some(guard) => settle(outcome, guard.restore()),
            None => outcome,
        };

        outcome.map(|verification| PublishReport {
            action,
            target: self.session.target,
            identity: self.identity.clone(),
            verification,
            credentials_injected,
        })
    }

    fn prepare_credentials(&self) -> Result<Option<PypircGuard>> {
        let plan = resolve_credentials(
            self.session.credentials.as_ref(),
            self.config.pypirc_path.is_file(),
            &self.env,
        )?;

        match plan {
            CredentialPlan::UseExisting => {
                self.output
                    .verbose(&format!("Using {}", self.config.pypirc_path.display()));
                Ok(None)
            }
            CredentialPlan::Inject(credentials) => {
                let contents = credentials.render_pypirc(self.session.target);
                let guard = PypircGuard::inject(
                    &self.config.pypirc_path,
                    &self.config.pypirc_backup_path,
                    &contents,
                )?;
                if guard.had_original() {
                    self.output.verbose(&format!(
                        "Moved existing {} to {} for this run",
                        self.config.pypirc_path.display(),
                        self.config.pypirc_backup_path.display()
                    ));
                }
                Ok(Some(guard))
            }
        }
    }

    async fn execute(&self, action: PublishAction) -> Result<ProbeOutcome> {
        let target = self.session.target;
        let PackageIdentity { name, version } = &self.identity;

        self.output
            .progress(&format!("Running {action} of {name} {version} to {target}..."));
        let stdout = match action {
            PublishAction::Upload => {
                self.tool
                    .publish(target, &self.session.dist_type)
                    .await?
            }
            PublishAction::Register => self.tool.register(target).await?,
        };
        let response = stdout.trim_end();
        log::info!("{}", response);
        self.output.verbose(response);

        let verification = match action {
            PublishAction::Upload => self.index.is_available(target, name, version).await,
            PublishAction::Register => self.index.is_registered(target, name, version).await,
        };

        match &verification {
            ProbeOutcome::Available => self.output.success(&format!(
                "package {name} of version {version} is {} on {target}",
                action.state()
            )),
            ProbeOutcome::NotAvailable { status } => {
                log::debug!("Verification probe answered {status}");
                self.output.warn(&format!(
                    "The {action} operation was completed successfully but verification has failed"
                ));
            }
            ProbeOutcome::Indeterminate { reason } => self.output.warn(&format!(
                "The {action} operation was completed successfully but the index could not be checked: {reason}"
            )),
        }

        Ok(verification)
    }
}

/// Combine an operation's outcome with the credential restore.
///
/// The operation's own error wins; a restore failure on top of it is logged.
fn settle<T>(outcome: Result<T>, restored: Result<()>) -> Result<T> {
    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            log::error!("Failed to restore credential file: {}", restore_err);
            Err(e)
        }
    }
}
