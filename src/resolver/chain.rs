//! Ordered composition of resolution stages.

use super::{Resolution, Resolver, ResolverError};

/// Tries stages in priority order; the first stage that finds something wins.
///
/// An absent stage falls through to the next one. A stage that fails aborts
/// the chain. When every stage is absent the chain reports the tool as not
/// found.
#[derive(Debug)]
pub struct ResolverChain {
    binary: String,
    tool: String,
    stages: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    /// Create an empty chain for `binary`, reported as `tool` in errors.
    pub fn new(binary: &str, tool: &str) -> Self {
        ResolverChain {
            binary: binary.to_string(),
            tool: tool.to_string(),
            stages: Vec::new(),
        }
    }

    /// Append a lower-priority stage.
    pub fn then(mut self, stage: impl Resolver + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Resolver for ResolverChain {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn tool(&self) -> &str {
        &self.tool
    }

    fn resolve(&self) -> Result<Resolution, ResolverError> {
        for stage in &self.stages {
            match stage.resolve()? {
                Resolution::Found(paths) if !paths.is_empty() => {
                    tracing::debug!("{} resolved by {:?}", self.binary, stage);
                    return Ok(Resolution::Found(paths));
                }
                _ => continue,
            }
        }
        Err(ResolverError::not_found(&self.tool))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::resolver::{ExecutableName, PathResolver, ProjectLocalResolver};
    use crate::test_support::MemoryOs;
    use crate::util::os::OsUtils;

    fn gradle_chain(os: Arc<dyn OsUtils>, search_paths: Vec<PathBuf>) -> ResolverChain {
        ResolverChain::new("gradle", "Gradle")
            .then(
                PathResolver::new("gradle", "Gradle", os.clone())
                    .with_search_paths(search_paths)
                    .search_paths_only(),
            )
            .then(ProjectLocalResolver::new(
                "gradle",
                ExecutableName::new("gradlew").with_windows_names(["gradlew.bat"]),
                "/app",
                os.clone(),
            ))
            .then(PathResolver::new("gradle", "Gradle", os))
    }

    #[test]
    fn test_absent_wrapper_falls_through_to_path() {
        let os: Arc<dyn OsUtils> = Arc::new(
            MemoryOs::new()
                .with_dir("/app")
                .with_executable("/usr/bin/gradle")
                .with_path_dir("/usr/bin"),
        );

        let chain = gradle_chain(os, Vec::new());
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.exec_paths().unwrap(), vec![PathBuf::from("/usr/bin/gradle")]);
    }

    #[test]
    fn test_wrapper_preferred_over_path() {
        let os: Arc<dyn OsUtils> = Arc::new(
            MemoryOs::new()
                .with_executable("/app/gradlew")
                .with_executable("/usr/bin/gradle")
                .with_path_dir("/usr/bin"),
        );

        let chain = gradle_chain(os, Vec::new());
        assert_eq!(chain.exec_paths().unwrap(), vec![PathBuf::from("/app/gradlew")]);
    }

    #[test]
    fn test_search_paths_preferred_over_wrapper() {
        let os: Arc<dyn OsUtils> = Arc::new(
            MemoryOs::new()
                .with_executable("/app/gradlew")
                .with_executable("/opt/gradle/bin/gradle"),
        );

        let chain = gradle_chain(os, vec![PathBuf::from("/opt/gradle/bin")]);
        assert_eq!(
            chain.exec_paths().unwrap(),
            vec![PathBuf::from("/opt/gradle/bin/gradle")]
        );
    }

    #[test]
    fn test_nothing_found_names_logical_tool() {
        let os: Arc<dyn OsUtils> = Arc::new(MemoryOs::new().with_dir("/app"));

        let err = gradle_chain(os, Vec::new()).exec_paths().unwrap_err();
        assert_eq!(err.to_string(), "No Gradle executable found!");
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let chain = ResolverChain::new("make", "Make");
        assert!(chain.is_empty());
        assert_eq!(
            chain.resolve().unwrap_err(),
            ResolverError::not_found("Make")
        );
    }
}
