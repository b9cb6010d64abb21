//! Command line argument parsing and validation.

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::{CliError, DepypiError, Result};
use crate::publisher::DEFAULT_DIST_TYPE;
use crate::target::PublishTarget;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Uploads, registers and verifies package index operations
#[derive(Parser, Debug)]
#[command(
    name = "depypi",
    version,
    about = "Uploads, registers and verifies Pypi operations",
    long_about = "Uploads, registers and verifies Pypi operations.

Credentials for upload and register are taken, in order, from --credentials,
an existing ~/.pypirc, or the PYPIUSER and PYPIPWD environment variables.

Usage:
  depypi upload --test -c USER PASSWORD
  depypi register --force --path ./my-package
  depypi isOnPypi --test
  depypi hasUnlockedDeps --path ./my-package"
)]
pub struct Args {
    /// Print extra detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload package to pypi
    Upload(PublishArgs),

    /// Register package to pypi
    Register(PublishArgs),

    /// Check if package exists on pypi
    #[command(name = "isOnPypi", alias = "is-on-pypi")]
    IsOnPypi {
        /// Check pypitest. Default is to check pypi
        #[arg(short, long)]
        test: bool,

        /// Location of setup.py
        #[arg(short, long, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Check if the package has unlocked dependencies
    #[command(name = "hasUnlockedDeps", alias = "has-unlocked-deps")]
    HasUnlockedDeps {
        /// Location of setup.py
        #[arg(short, long, value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

impl Command {
    /// Name shown in status and error lines
    pub fn name(&self) -> &'static str {
        match self {
            Command::Upload(_) => "upload",
            Command::Register(_) => "register",
            Command::IsOnPypi { .. } => "isOnPypi",
            Command::HasUnlockedDeps { .. } => "hasUnlockedDeps",
        }
    }
}

/// Flags shared by `upload` and `register`
#[derive(clap::Args, Debug, Clone)]
pub struct PublishArgs {
    /// Distribution type. Default is sdist
    #[arg(short, long, default_value = DEFAULT_DIST_TYPE)]
    pub dist_type: String,

    /// Target pypi
    #[arg(short, long)]
    pub force: bool,

    /// Target pypitest
    #[arg(short, long)]
    pub test: bool,

    /// Location of setup.py
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Use specific credentials (not what is in .pypirc). Usage: -c USER PASSWORD
    #[arg(
        short,
        long,
        num_args = 2,
        allow_hyphen_values = true,
        value_names = ["USER", "PASSWORD"]
    )]
    pub credentials: Option<Vec<String>>,
}

impl PublishArgs {
    /// Index selected by `--force` / `--test`; `--force` wins when both are given
    pub fn target(&self) -> Result<PublishTarget> {
        PublishTarget::from_flags(self.force, self.test)
            .ok_or_else(|| CliError::MissingTarget.into())
    }

    /// Explicit credentials, rejecting anything but a user/password pair
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        self.credentials
            .as_deref()
            .map(Credentials::from_values)
            .transpose()
    }

    /// Directory holding `setup.py`
    pub fn working_dir(&self) -> PathBuf {
        working_dir(self.path.as_ref())
    }
}

/// `--path` or the current directory
pub(crate) fn working_dir(path: Option<&PathBuf>) -> PathBuf {
    path.cloned().unwrap_or_else(|| PathBuf::from("."))
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Result<Self> {
        Self::parse_args_from(std::env::args_os())
    }

    /// Parse `argv`.
    ///
    /// A `--credentials` option with the wrong number of values becomes
    /// [`DepypiError::CredentialFormatInvalid`]; every other clap error
    /// (help, version, usage) exits the way clap does.
    pub fn parse_args_from<I, T>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(argv).or_else(|e| match credential_value_count(&e) {
            Some(count) => Err(DepypiError::CredentialFormatInvalid { count }),
            None => e.exit(),
        })
    }

    /// Validate arguments that clap cannot check on its own.
    ///
    /// Runs before any external command or file access.
    pub fn validate(&self) -> Result<()> {
        if let Command::Upload(publish) | Command::Register(publish) = &self.command {
            publish.target()?;
            publish.credentials()?;
        }
        Ok(())
    }
}

fn credential_value_count(error: &clap::Error) -> Option<usize> {
    if error.kind() != ErrorKind::WrongNumberOfValues {
        return None;
    }
    let Some(ContextValue::String(arg)) = error.get(ContextKind::InvalidArg) else {
        return None;
    };
    if !arg.starts_with("--credentials") {
        return None;
    }
    match error.get(ContextKind::ActualNumValues) {
        Some(ContextValue::Number(count)) => usize::try_from(*count).ok(),
        _ => None,
    }
}

/// Configuration derived from command line arguments and the environment
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
    config: Config,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(args: &Args, config: Config) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, false),
            config,
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Environment-derived settings
    pub fn config(&self) -> &Config {
        &self.config
    }
}
