//! Index credentials and how they are found.
//!
//! Resolution order is fixed: explicit pair, then an existing credential
//! file, then the `PYPIUSER` / `PYPIPWD` environment variables.

mod guard;

pub use guard::PypircGuard;

use crate::config::{PASSWORD_ENV_VAR, USER_ENV_VAR};
use crate::error::{DepypiError, Result};
use crate::target::PublishTarget;
use std::fmt;

/// Username and password for an index
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a username and a password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials from loosely-shaped caller input.
    ///
    /// Anything other than exactly two values is rejected.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        match values {
            [username, password] => Ok(Self::new(username.as_ref(), password.as_ref())),
            other => Err(DepypiError::CredentialFormatInvalid { count: other.len() }),
        }
    }

    /// Username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Render a credential file granting access to `target` only
    pub fn render_pypirc(&self, target: PublishTarget) -> String {
        // The test template carries a blank line before its section; kept as-is.
        let separator = match target {
            PublishTarget::Live => "",
            PublishTarget::Test => "\n",
        };
        format!(
            "[distutils]\nindex-servers =\n    {section}\n{separator}[{section}]\nrepository={repository}\nusername={user}\npassword={password}",
            section = target.section(),
            repository = target.repository_url(),
            user = self.username,
            password = self.password,
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What a publish operation has to do about credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPlan {
    /// Write a generated credential file and restore the original afterwards
    Inject(Credentials),
    /// Leave the existing credential file alone
    UseExisting,
}

/// Decide where credentials come from.
///
/// `env` looks up environment variables; it is a parameter so callers (and
/// tests) control what the process environment looks like.
pub fn resolve_credentials<F>(
    explicit: Option<&Credentials>,
    pypirc_exists: bool,
    env: F,
) -> Result<CredentialPlan>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(credentials) = explicit {
        log::debug!("Using explicit credentials for '{}'", credentials.username());
        return Ok(CredentialPlan::Inject(credentials.clone()));
    }

    if pypirc_exists {
        log::debug!("Using existing credential file");
        return Ok(CredentialPlan::UseExisting);
    }

    let non_empty = |name: &str| env(name).filter(|value| !value.is_empty());
    match (non_empty(USER_ENV_VAR), non_empty(PASSWORD_ENV_VAR)) {
        (Some(username), Some(password)) => {
            log::debug!("Using credentials from {USER_ENV_VAR}/{PASSWORD_ENV_VAR}");
            Ok(CredentialPlan::Inject(Credentials::new(username, password)))
        }
        _ => Err(DepypiError::CredentialsMissing),
    }
}
