//! Executable resolution.
//!
//! A [`Resolver`] turns a logical binary (`mvn`, `gradle`, `go`) into an
//! ordered list of candidate paths, most preferred first. Resolvers compose:
//! [`ResolverChain`] tries stages in priority order and stops at the first
//! stage that finds something. A stage whose tool is optional reports
//! [`Resolution::Absent`] instead of failing, so the chain moves on.
//!
//! Priority, highest first:
//! 1. Caller-supplied search paths
//! 2. A project-local wrapper (e.g. `gradlew`)
//! 3. The system `PATH`

mod chain;
mod errors;
mod path;
mod project;

use std::fmt;
use std::path::PathBuf;

use crate::util::os::OsFamily;

pub use chain::ResolverChain;
pub use errors::ResolverError;
pub use path::{PathResolver, PathScope};
pub use project::ProjectLocalResolver;

/// Outcome of one resolution stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Candidates, most preferred first. Never empty.
    Found(Vec<PathBuf>),
    /// An optional tool that is not there; the caller should try elsewhere.
    Absent,
}

/// Locates a toolchain executable.
pub trait Resolver: Send + Sync + fmt::Debug {
    /// Logical binary name, used as the key for the resolved binary.
    fn binary(&self) -> &str;

    /// Human-facing tool name used in errors, e.g. `Maven`.
    fn tool(&self) -> &str {
        self.binary()
    }

    /// Run this resolution stage.
    fn resolve(&self) -> Result<Resolution, ResolverError>;

    /// Candidate paths, most preferred first, or a not-found error naming the tool.
    fn exec_paths(&self) -> Result<Vec<PathBuf>, ResolverError> {
        match self.resolve()? {
            Resolution::Found(paths) if !paths.is_empty() => {
                tracing::debug!("{} candidates: {:?}", self.binary(), paths);
                Ok(paths)
            }
            _ => Err(ResolverError::not_found(self.tool())),
        }
    }
}

/// The executable file names one logical tool goes by on each OS family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableName {
    unix: Vec<String>,
    windows: Vec<String>,
}

impl ExecutableName {
    /// A tool named `name` on Unix and `name.exe` on Windows.
    pub fn new(name: &str) -> Self {
        ExecutableName {
            unix: vec![name.to_string()],
            windows: vec![format!("{}.exe", name)],
        }
    }

    /// Replace the Windows names, e.g. `mvn.cmd` or `bundler.bat`.
    pub fn with_windows_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.windows = names.into_iter().map(Into::into).collect();
        self
    }

    /// File names to look for on `family`, in preference order.
    pub fn candidates(&self, family: OsFamily) -> &[String] {
        match family {
            OsFamily::Unix => &self.unix,
            OsFamily::Windows => &self.windows,
        }
    }
}

/// Remove duplicate paths, keeping the first occurrence.
fn dedup_preserving_order(paths: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}
