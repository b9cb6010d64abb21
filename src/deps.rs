//! Declared-dependency listing from a dry-run install.
//!
//! This is a flat text scan of installer output, not a resolver.

use crate::build_tool::BuildTool;
use crate::error::Result;
use std::path::Path;

/// Prefix setuptools prints for each requirement it would fetch
const DECLARATION_PREFIX: &str = "Searching for";

/// A requirement found in dry-run output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Requirement text exactly as printed, e.g. `requests>=2.7.0`
    pub requirement: String,
}

impl DeclaredDependency {
    /// Whether the requirement pins an exact version with `==`
    pub fn is_locked(&self) -> bool {
        self.requirement.contains("==")
    }
}

/// Pull requirement strings out of dry-run output, in encounter order
pub fn parse_declarations<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            line.as_ref()
                .strip_prefix(DECLARATION_PREFIX)
                .map(|rest| rest.trim().to_string())
        })
        .collect()
}

/// Lists what a project declares as dependencies
#[derive(Debug)]
pub struct DependencyLister<'a, B: BuildTool> {
    tool: &'a B,
}

impl<'a, B: BuildTool> DependencyLister<'a, B> {
    /// Create a lister running commands through `tool`
    pub fn new(tool: &'a B) -> Self {
        Self { tool }
    }

    /// Requirement strings declared by the project at `path`
    pub async fn list_declared_dependencies(&self, path: &Path) -> Result<Vec<String>> {
        let lines = self.tool.install_dry_run(path).await?;
        let dependencies = parse_declarations(&lines);
        log::debug!(
            "Found {} declared dependencies in {}",
            dependencies.len(),
            path.display()
        );
        Ok(dependencies)
    }

    /// Same as [`Self::list_declared_dependencies`], wrapped for classification
    pub async fn declared(&self, path: &Path) -> Result<Vec<DeclaredDependency>> {
        Ok(self
            .list_declared_dependencies(path)
            .await?
            .into_iter()
            .map(|requirement| DeclaredDependency { requirement })
            .collect())
    }
}
