//! Lookup of a wrapper script checked into the project.

use std::path::PathBuf;
use std::sync::Arc;

use super::{ExecutableName, Resolution, Resolver, ResolverError};
use crate::util::os::OsUtils;

/// Finds a project-pinned wrapper such as `gradlew`.
///
/// Most projects do not ship one, so a miss is [`Resolution::Absent`],
/// never an error.
#[derive(Debug, Clone)]
pub struct ProjectLocalResolver {
    binary: String,
    names: ExecutableName,
    project_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl ProjectLocalResolver {
    /// Create a resolver looking for `names` directly inside `project_dir`.
    pub fn new(
        binary: &str,
        names: ExecutableName,
        project_dir: impl Into<PathBuf>,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        ProjectLocalResolver {
            binary: binary.to_string(),
            names,
            project_dir: project_dir.into(),
            os,
        }
    }
}

impl Resolver for ProjectLocalResolver {
    fn binary(&self) -> &str {
        &self.binary
    }

    fn resolve(&self) -> Result<Resolution, ResolverError> {
        let found: Vec<PathBuf> = self
            .names
            .candidates(self.os.os_family())
            .iter()
            .map(|name| self.project_dir.join(name))
            .filter(|p| self.os.exists(p))
            .collect();

        if found.is_empty() {
            Ok(Resolution::Absent)
        } else {
            Ok(Resolution::Found(found))
        }
    }
}
