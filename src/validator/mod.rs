//! Runtime/binary validation.
//!
//! A [`Validator`] vets one resolved candidate for the target runtime. The
//! only hard failure is a candidate that does not exist or cannot be
//! executed. Version probes that disagree with the runtime, or that cannot
//! be read at all, only log a warning: the build invocation itself is the
//! final judge of whether a toolchain works.

mod go;
mod jvm;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::util::os::OsUtils;

pub use go::GoRuntimeValidator;
pub use jvm::{JvmFlavor, JvmValidator};

/// Error from validating a candidate binary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("{} does not exist or is not executable", .path.display())]
    BinaryNotFound { path: PathBuf },
}

/// A candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub path: PathBuf,
    /// Version detected by the probe, if any.
    pub version: Option<String>,
}

impl Validated {
    /// A validated path with no detected version.
    pub fn path(path: &Path) -> Self {
        Validated {
            path: path.to_path_buf(),
            version: None,
        }
    }
}

/// Accepts or rejects a resolved binary for the target runtime.
pub trait Validator: Send + Sync + fmt::Debug {
    fn validate(&self, path: &Path) -> Result<Validated, ValidatorError>;
}

/// Accepts any candidate that exists and is executable.
#[derive(Debug, Clone)]
pub struct RuntimeValidator {
    os: Arc<dyn OsUtils>,
}

impl RuntimeValidator {
    /// Create a new passthrough validator.
    pub fn new(os: Arc<dyn OsUtils>) -> Self {
        RuntimeValidator { os }
    }
}

impl Validator for RuntimeValidator {
    fn validate(&self, path: &Path) -> Result<Validated, ValidatorError> {
        ensure_executable(self.os.as_ref(), path)?;
        Ok(Validated::path(path))
    }
}

/// Fail unless `path` exists and is executable.
pub fn ensure_executable(os: &dyn OsUtils, path: &Path) -> Result<(), ValidatorError> {
    if os.exists(path) && os.is_executable(path) {
        Ok(())
    } else {
        Err(ValidatorError::BinaryNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Extract a major version from a dotted version string.
///
/// When the first component is the literal `1`, the major version is the
/// second component (`1.8.0_292` is 8); otherwise it is the first (`11.0.1`
/// is 11).
pub fn parse_major_version(version: &str) -> Option<String> {
    let mut parts = version.trim().split('.');
    let first = parts.next().filter(|s| !s.is_empty())?;
    let major = if first == "1" { parts.next()? } else { first };
    let digits: String = major.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Parse a version string into semver::Version, handling incomplete versions.
///
/// Handles versions like "1.21.3", "1.22rc1", or versions with only major.minor parts.
pub fn parse_version_flexible(version_str: &str) -> Option<semver::Version> {
    // Remove any suffix after the first non-version character
    let clean_version = version_str
        .trim()
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or(version_str);

    if let Ok(v) = clean_version.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = clean_version.split('.').collect();
    let major = parts.first().and_then(|s| s.parse().ok())?;
    let minor = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
    let patch = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(semver::Version::new(major, minor, patch))
}
