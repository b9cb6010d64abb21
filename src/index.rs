//! HTTP probes against a package index.
//!
//! A probe answers "is this (name, version) visible yet?". Transport
//! failures are reported as [`ProbeOutcome::Indeterminate`], never as absent.

use crate::config::Config;
use crate::error::{DepypiError, Result};
use crate::target::PublishTarget;
use std::time::Duration;

/// Result of probing the index for a package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The index answered with a 2xx status
    Available,
    /// The index answered with any other status
    NotAvailable {
        /// HTTP status code returned
        status: u16,
    },
    /// The index could not be reached
    Indeterminate {
        /// Why the probe failed
        reason: String,
    },
}

impl ProbeOutcome {
    /// Whether the index confirmed the package version
    pub fn is_available(&self) -> bool {
        matches!(self, ProbeOutcome::Available)
    }

    /// Turn an indeterminate outcome into a [`DepypiError::ProbeIndeterminate`]
    pub fn into_result(self, url: &str) -> Result<bool> {
        match self {
            ProbeOutcome::Available => Ok(true),
            ProbeOutcome::NotAvailable { .. } => Ok(false),
            ProbeOutcome::Indeterminate { reason } => Err(DepypiError::ProbeIndeterminate {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

/// URL of the source distribution for `name`-`version` under `base`
pub fn artifact_url(base: &str, name: &str, version: &str) -> String {
    let initial = name.chars().next().map(String::from).unwrap_or_default();
    format!(
        "{}/packages/source/{}/{}/{}-{}.tar.gz",
        base.trim_end_matches('/'),
        initial,
        name,
        name,
        version
    )
}

/// URL of the registration page for `name` `version` under `base`
pub fn registration_url(base: &str, name: &str, version: &str) -> String {
    format!("{}/pypi/{}/{}", base.trim_end_matches('/'), name, version)
}

/// Client that probes the live and test indices
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: reqwest::Client,
    live_url: String,
    test_url: String,
}

impl IndexClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .user_agent(concat!("depypi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DepypiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            live_url: config.index_url(PublishTarget::Live).to_string(),
            test_url: config.index_url(PublishTarget::Test).to_string(),
        })
    }

    fn base(&self, target: PublishTarget) -> &str {
        match target {
            PublishTarget::Live => &self.live_url,
            PublishTarget::Test => &self.test_url,
        }
    }

    /// Existence probe URL for a package version on `target`
    pub fn artifact_url(&self, target: PublishTarget, name: &str, version: &str) -> String {
        artifact_url(self.base(target), name, version)
    }

    /// Registration probe URL for a package version on `target`
    pub fn registration_url(&self, target: PublishTarget, name: &str, version: &str) -> String {
        registration_url(self.base(target), name, version)
    }

    /// Is the source distribution downloadable from `target`?
    pub async fn is_available(
        &self,
        target: PublishTarget,
        name: &str,
        version: &str,
    ) -> ProbeOutcome {
        self.check_url(&self.artifact_url(target, name, version)).await
    }

    /// Is the package version registered on `target`?
    pub async fn is_registered(
        &self,
        target: PublishTarget,
        name: &str,
        version: &str,
    ) -> ProbeOutcome {
        self.check_url(&self.registration_url(target, name, version))
            .await
    }

    /// GET `url` and classify the response
    pub async fn check_url(&self, url: &str) -> ProbeOutcome {
        log::debug!("Probing {}", url);
        match self.http.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                log::debug!("{} answered {}", url, status);
                if status.is_success() {
                    ProbeOutcome::Available
                } else {
                    ProbeOutcome::NotAvailable {
                        status: status.as_u16(),
                    }
                }
            }
            Err(e) => {
                log::warn!("Probe of {} failed: {}", url, e);
                ProbeOutcome::Indeterminate {
                    reason: e.to_string(),
                }
            }
        }
    }
}
