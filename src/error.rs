//! Error types for depypi operations.
//!
//! Every failure surfaces here and is mapped to an exit code by the CLI.
//! Nothing in the library terminates the process itself.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for depypi operations
pub type Result<T> = std::result::Result<T, DepypiError>;

/// Main error type for all depypi operations
#[derive(Error, Debug)]
pub enum DepypiError {
    /// No usable credentials could be resolved
    #[error("Unable to find credentials for the package index")]
    CredentialsMissing,

    /// Caller supplied credentials in the wrong shape
    #[error(
        "Credentials provided are of the wrong format: expected a username and a password, got {count} value(s)"
    )]
    CredentialFormatInvalid {
        /// Number of values that were supplied
        count: usize,
    },

    /// Publish or register command exited non-zero
    #[error("'{command}' failed ({status}): {stderr}")]
    PublishCommandFailed {
        /// Command line that was run
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// Query or dependency listing command failed or could not be started
    #[error("'{command}' failed: {reason}")]
    ExternalToolFailure {
        /// Command line that was run
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Network failure while probing the index
    #[error("Could not reach {url}: {reason}")]
    ProbeIndeterminate {
        /// URL that was probed
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Backup, write or restore of the credential file failed
    #[error("Credential file operation failed for {path}: {source}")]
    CredentialFile {
        /// File that was being touched
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Neither the live nor the test index was selected
    #[error("Target not specified. Please use --force for pypi or --test for pypitest")]
    MissingTarget,
}

impl DepypiError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            DepypiError::CredentialsMissing => vec![
                "Create a ~/.pypirc file (see https://packaging.python.org/specifications/pypirc/)"
                    .to_string(),
                "Set the environment variables PYPIUSER and PYPIPWD".to_string(),
                "Pass credentials explicitly: depypi upload -c USER PASSWORD".to_string(),
            ],
            DepypiError::CredentialFormatInvalid { .. } => vec![
                "Pass both values: -c USER PASSWORD".to_string(),
                "When calling the library, use Credentials::new(user, password)".to_string(),
            ],
            DepypiError::PublishCommandFailed { .. } => vec![
                "Run the same setup.py command manually to inspect its output".to_string(),
                "Check that the version is not already on the index".to_string(),
            ],
            DepypiError::ExternalToolFailure { .. } => vec![
                "Ensure python is on PATH or set DEPYPI_PYTHON".to_string(),
                "Pass --path pointing at the directory containing setup.py".to_string(),
            ],
            DepypiError::ProbeIndeterminate { .. } => vec![
                "Check network connectivity to the index".to_string(),
                "Raise DEPYPI_PROBE_TIMEOUT_SECS if the index is slow".to_string(),
            ],
            DepypiError::Cli(CliError::MissingTarget) => vec![
                "Use --force to target pypi".to_string(),
                "Use --test to target pypitest".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
