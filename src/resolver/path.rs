//! Lookup on caller-supplied search paths and the system `PATH`.

use std::path::PathBuf;
use std::sync::Arc;

use super::{dedup_preserving_order, ExecutableName, Resolution, Resolver, ResolverError};
use crate::util::os::OsUtils;

/// Where a [`PathResolver`] looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// Caller-supplied search paths, then the system `PATH`. Finding nothing is an error.
    SearchPathsThenSystem,
    /// Caller-supplied search paths only. Finding nothing yields [`Resolution::Absent`].
    SearchPathsOnly,
}

/// Finds an executable by name in directories.
#[derive(Debug, Clone)]
pub struct PathResolver {
    binary: String,
    tool: String,
    names: ExecutableName,
    search_paths: Vec<PathBuf>,
    scope: PathScope,
    os: Arc<dyn OsUtils>,
}

impl PathResolver {
    /// Create a resolver for `binary`, reported as `tool` in errors.
    pub fn new(binary: &str, tool: &str, os: Arc<dyn OsUtils>) -> Self {
        PathResolver {
            binary: binary.to_string(),
            tool: tool.to_string(),
            names: ExecutableName::new(binary),
            search_paths: Vec::new(),
            scope: PathScope::SearchPathsThenSystem,
            os,
        }
    }

    /// Override the per-platform executable names.
    pub fn with_names(mut self, names: ExecutableName) -> Self {
        self.names = names;
        self
    }

    /// Directories searched before the system `PATH`.
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    /// Restrict the lookup to the caller-supplied search paths.
    pub fn search_paths_only(mut self) -> Self {
        self.scope = PathScope::SearchPathsOnly;
        self
    }

    fn lookup(&self, search_paths: Option<&[PathBuf]>) -> Vec<PathBuf> {
        self.names
            .candidates(self.os.os_family())
            .iter()
            .flat_map(|name| self.os.which(name, search_paths))
            .collect()
    }
}

impl Resolver for PathResolver {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn tool(&self) -> &str {
        &self.tool
    }

    fn resolve(&self) -> Result<Resolution, ResolverError> {
        let mut found = Vec::new();
        if !self.search_paths.is_empty() {
            found.extend(self.lookup(Some(&self.search_paths)));
        }
        if self.scope == PathScope::SearchPathsThenSystem {
            found.extend(self.lookup(None));
        }
        dedup_preserving_order(&mut found);

        match (found.is_empty(), self.scope) {
            (false, _) => Ok(Resolution::Found(found)),
            (true, PathScope::SearchPathsOnly) => Ok(Resolution::Absent),
            (true, PathScope::SearchPathsThenSystem) => Err(ResolverError::not_found(&self.tool)),
        }
    }
}
