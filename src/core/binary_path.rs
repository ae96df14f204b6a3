//! A toolchain executable that survived resolution and validation.

use std::path::{Path, PathBuf};

/// A resolved and validated binary, owned by the workflow that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPath {
    language: String,
    dependency_manager: Option<String>,
    binary: String,
    path: PathBuf,
    version: Option<String>,
}

impl BinaryPath {
    /// Create a new binary path.
    pub fn new(
        language: impl Into<String>,
        dependency_manager: Option<String>,
        binary: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        BinaryPath {
            language: language.into(),
            dependency_manager,
            binary: binary.into(),
            path: path.into(),
            version: None,
        }
    }

    /// Attach the version a validator detected.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn dependency_manager(&self) -> Option<&str> {
        self.dependency_manager.as_deref()
    }

    /// Logical binary name, e.g. `mvn`.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Resolved filesystem location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
