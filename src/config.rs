//! Runtime configuration read from the environment.
//!
//! Every setting has a default; environment variables only override.

use crate::error::{DepypiError, Result};
use crate::target::PublishTarget;
use std::path::PathBuf;
use url::Url;

/// Environment variable holding the fallback index username
pub const USER_ENV_VAR: &str = "PYPIUSER";

/// Environment variable holding the fallback index password
pub const PASSWORD_ENV_VAR: &str = "PYPIPWD";

const PYPIRC_FILE_NAME: &str = ".pypirc";
const PYPIRC_BACKUP_FILE_NAME: &str = ".pypirc.crt.backup";

/// Configuration shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    /// Interpreter used to run `setup.py`
    pub python: String,

    /// Timeout applied to each index probe, in seconds
    pub probe_timeout_secs: u64,

    /// Base URL of the live index
    pub live_index_url: String,

    /// Base URL of the test index
    pub test_index_url: String,

    /// Per-user credential file
    pub pypirc_path: PathBuf,

    /// Where an existing credential file is parked while credentials are injected
    pub pypirc_backup_path: PathBuf,
}

impl Config {
    /// Configuration rooted at a given home directory
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            python: "python".to_string(),
            probe_timeout_secs: 5,
            live_index_url: PublishTarget::Live.default_index_url().to_string(),
            test_index_url: PublishTarget::Test.default_index_url().to_string(),
            pypirc_path: home.join(PYPIRC_FILE_NAME),
            pypirc_backup_path: home.join(PYPIRC_BACKUP_FILE_NAME),
        }
    }

    /// Parse a numeric variable, clamping it to `[min, max]`
    fn parse_secs_env(var_name: &str, default: u64, min: u64, max: u64) -> u64 {
        std::env::var(var_name)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|v| v.clamp(min, max))
            .unwrap_or(default)
    }

    /// Create config from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            DepypiError::Config("could not determine the home directory".to_string())
        })?;
        let mut config = Self::with_home(home);

        if let Ok(python) = std::env::var("DEPYPI_PYTHON")
            && !python.trim().is_empty()
        {
            config.python = python;
        }
        config.probe_timeout_secs = Self::parse_secs_env("DEPYPI_PROBE_TIMEOUT_SECS", 5, 1, 60);
        if let Ok(url) = std::env::var("DEPYPI_LIVE_INDEX_URL") {
            config.live_index_url = url;
        }
        if let Ok(url) = std::env::var("DEPYPI_TEST_INDEX_URL") {
            config.test_index_url = url;
        }

        config.validate()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Validate that the configured values are usable
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_secs == 0 {
            return Err(DepypiError::Config(
                "probe timeout must be at least one second".to_string(),
            ));
        }
        for (name, value) in [
            ("DEPYPI_LIVE_INDEX_URL", &self.live_index_url),
            ("DEPYPI_TEST_INDEX_URL", &self.test_index_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| DepypiError::Config(format!("{name} '{value}' is not a URL: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(DepypiError::Config(format!(
                    "{name} '{value}' must use http or https"
                )));
            }
        }
        Ok(())
    }

    /// Base URL of the index behind `target`
    pub fn index_url(&self, target: PublishTarget) -> &str {
        match target {
            PublishTarget::Live => &self.live_index_url,
            PublishTarget::Test => &self.test_index_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_home_paths() {
        let config = Config::with_home("/home/dev");
        assert_eq!(config.pypirc_path, PathBuf::from("/home/dev/.pypirc"));
        assert_eq!(
            config.pypirc_backup_path,
            PathBuf::from("/home/dev/.pypirc.crt.backup")
        );
        assert_eq!(config.python, "python");
        assert_eq!(config.probe_timeout_secs, 5);
    }

    #[test]
    fn test_index_url_per_target() {
        let config = Config::with_home("/tmp");
        assert_eq!(config.index_url(PublishTarget::Live), "https://pypi.python.org");
        assert_eq!(config.index_url(PublishTarget::Test), "https://testpypi.python.org");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::with_home("/tmp");
        config.test_index_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(DepypiError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::with_home("/tmp");
        config.live_index_url = "ftp://mirror.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::with_home("/tmp");
        config.probe_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Config::with_home("/tmp").validate().is_ok());
    }
}
