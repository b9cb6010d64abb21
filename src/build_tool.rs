//! Adapter around the project's build descriptor (`setup.py`).
//!
//! Every external command depypi runs goes through [`BuildTool`], so the
//! text scraping that depends on setuptools' output stays in one place.

use crate::error::{DepypiError, Result};
use crate::target::PublishTarget;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Output;

/// Name and version of the package being published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    /// Package name as reported by the build descriptor
    pub name: String,
    /// Package version as reported by the build descriptor
    pub version: String,
}

impl PackageIdentity {
    /// Query name and version once from `tool`
    pub async fn query<B: BuildTool>(tool: &B) -> Result<Self> {
        let name = tool.query_name().await?;
        let version = tool.query_version().await?;
        log::debug!("Package identity: {} {}", name, version);
        Ok(Self { name, version })
    }
}

/// Operations the publisher and dependency lister need from a build tool
pub trait BuildTool {
    /// Package name (`setup.py --name`)
    fn query_name(&self) -> impl Future<Output = Result<String>>;

    /// Package version (`setup.py --version`)
    fn query_version(&self) -> impl Future<Output = Result<String>>;

    /// Build a distribution and upload it to `target`; returns captured stdout
    fn publish(
        &self,
        target: PublishTarget,
        dist_type: &str,
    ) -> impl Future<Output = Result<String>>;

    /// Register the package metadata with `target`; returns captured stdout
    fn register(&self, target: PublishTarget) -> impl Future<Output = Result<String>>;

    /// Dry-run install in `path`, returning the output lines
    fn install_dry_run(&self, path: &Path) -> impl Future<Output = Result<Vec<String>>>;
}

/// [`BuildTool`] backed by `python setup.py`
#[derive(Debug, Clone)]
pub struct SetupPy {
    python: PathBuf,
    working_dir: PathBuf,
}

impl SetupPy {
    /// Locate `python` on PATH and scope commands to `working_dir`
    pub fn new(python: &str, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let python = which::which(python).map_err(|e| DepypiError::ExternalToolFailure {
            command: python.to_string(),
            reason: format!("interpreter not found: {e}"),
        })?;
        Ok(Self {
            python,
            working_dir: working_dir.into(),
        })
    }

    fn describe(args: &[&str]) -> String {
        format!("python setup.py {}", args.join(" "))
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let command = Self::describe(args);
        log::debug!("Running '{}' in {}", command, dir.display());

        tokio::process::Command::new(&self.python)
            .arg("setup.py")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| DepypiError::ExternalToolFailure {
                command,
                reason: e.to_string(),
            })
    }

    /// Run a read-only query; a non-zero exit is an [`DepypiError::ExternalToolFailure`]
    async fn query(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(dir, args).await?;
        if !output.status.success() {
            return Err(DepypiError::ExternalToolFailure {
                command: Self::describe(args),
                reason: failure_reason(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a publishing command; a non-zero exit is a [`DepypiError::PublishCommandFailed`]
    async fn mutate(&self, args: &[&str]) -> Result<String> {
        let output = self.run(&self.working_dir, args).await?;
        if !output.status.success() {
            return Err(DepypiError::PublishCommandFailed {
                command: Self::describe(args),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BuildTool for SetupPy {
    async fn query_name(&self) -> Result<String> {
        self.query(&self.working_dir, &["--name"])
            .await
            .map(|out| join_lines(&out))
    }

    async fn query_version(&self) -> Result<String> {
        self.query(&self.working_dir, &["--version"])
            .await
            .map(|out| join_lines(&out))
    }

    async fn publish(&self, target: PublishTarget, dist_type: &str) -> Result<String> {
        self.mutate(&[dist_type, "upload", "-r", target.section()]).await
    }

    async fn register(&self, target: PublishTarget) -> Result<String> {
        self.mutate(&["register", "-r", target.section()]).await
    }

    async fn install_dry_run(&self, path: &Path) -> Result<Vec<String>> {
        let out = self.query(path, &["install", "-v", "-n"]).await?;
        Ok(out.lines().map(String::from).collect())
    }
}

/// setuptools prints some values across several lines; they are concatenated.
fn join_lines(output: &str) -> String {
    output.lines().collect::<String>()
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        format!("exited with {}: {}", output.status, stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines("depypi\n"), "depypi");
        assert_eq!(join_lines("0.1\n.1\n"), "0.1.1");
        assert_eq!(join_lines(""), "");
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            SetupPy::describe(&["sdist", "upload", "-r", "pypitest"]),
            "python setup.py sdist upload -r pypitest"
        );
    }

    #[test]
    fn test_missing_interpreter() {
        let result = SetupPy::new("definitely-not-a-python-binary", ".");
        assert!(matches!(
            result,
            Err(DepypiError::ExternalToolFailure { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_runs_in_working_dir() {
        // `sh setup.py --name` runs the script below, standing in for python.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("setup.py"),
            "case \"$1\" in\n  --name) echo demo ;;\n  --version) echo 1.2.0 ;;\n  install) echo 'Searching for requests>=2.7.0'; echo 'noise' ;;\n  *) echo boom >&2; exit 3 ;;\nesac\n",
        )
        .unwrap();

        let tool = SetupPy::new("sh", dir.path()).unwrap();
        let identity = PackageIdentity::query(&tool).await.unwrap();
        assert_eq!(identity.name, "demo");
        assert_eq!(identity.version, "1.2.0");

        let lines = tool.install_dry_run(dir.path()).await.unwrap();
        assert_eq!(lines, vec!["Searching for requests>=2.7.0", "noise"]);

        let err = tool.register(PublishTarget::Test).await.unwrap_err();
        match err {
            DepypiError::PublishCommandFailed { command, stderr, .. } => {
                assert_eq!(command, "python setup.py register -r pypitest");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
