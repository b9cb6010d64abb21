//! # depypi
//!
//! Uploads, registers and verifies Python package index operations.
//!
//! The tool drives a project's `setup.py` and probes the index over HTTP.
//! Credentials can be injected into `~/.pypirc` for the duration of a single
//! upload or registration; the original file state is always put back.
//!
//! ## Usage
//!
//! ```bash
//! depypi upload --test -c USER PASSWORD   # Upload an sdist to the test index
//! depypi register --force                 # Register on the live index
//! depypi isOnPypi                         # Is this version on the live index?
//! depypi hasUnlockedDeps --path ./pkg     # List declared dependencies
//! ```
//!
//! ## Constraints
//!
//! `~/.pypirc` is shared by every process of the same user. Running two
//! uploads or registrations at once is unsupported.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build_tool;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod deps;
pub mod error;
pub mod index;
pub mod publisher;
pub mod target;

#[cfg(test)]
mod testing;

pub use build_tool::{BuildTool, PackageIdentity, SetupPy};
pub use cli::Args;
pub use config::Config;
pub use credentials::{CredentialPlan, Credentials, PypircGuard};
pub use deps::DependencyLister;
pub use error::{CliError, DepypiError, Result};
pub use index::{IndexClient, ProbeOutcome};
pub use publisher::{PublishAction, PublishReport, PublishSession, Publisher};
pub use target::PublishTarget;
