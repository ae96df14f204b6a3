//! Build steps.
//!
//! An [`Action`] is one discrete step of a workflow: copy the sources,
//! resolve dependencies, compile, clean up. Each action is constructed with
//! everything it needs and shares no mutable state with its siblings.

mod common;

use std::fmt;
use std::io;

use thiserror::Error;

use crate::toolchain::ToolError;

pub use common::{CleanUpAction, CopyDependenciesAction, CopySourceAction, MoveDependenciesAction};

/// Directory and file names never copied out of a source tree.
pub const DEFAULT_EXCLUDES: &[&str] = &[".aws-sam", ".git"];

/// What an action is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    CopySource,
    CopyDependencies,
    MoveDependencies,
    ResolveDependencies,
    CompileSource,
    CleanUp,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Purpose::CopySource => "COPY_SOURCE",
            Purpose::CopyDependencies => "COPY_DEPENDENCIES",
            Purpose::MoveDependencies => "MOVE_DEPENDENCIES",
            Purpose::ResolveDependencies => "RESOLVE_DEPENDENCIES",
            Purpose::CompileSource => "COMPILE_SOURCE",
            Purpose::CleanUp => "CLEAN_UP",
        };
        f.write_str(s)
    }
}

/// Error from executing an action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// An expected failure carrying a diagnostic fit for the operator.
    #[error("{0}")]
    Failed(String),

    /// An I/O error the action did not anticipate.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ActionError {
    /// Create an expected failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ActionError::Failed(message.into())
    }
}

impl From<ToolError> for ActionError {
    fn from(err: ToolError) -> Self {
        ActionError::Failed(err.to_string())
    }
}

/// A single build step.
pub trait Action: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn purpose(&self) -> Purpose;

    fn execute(&self) -> Result<(), ActionError>;
}

impl fmt::Display for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name={}, Purpose={}, Description={}",
            self.name(),
            self.purpose(),
            self.description()
        )
    }
}
