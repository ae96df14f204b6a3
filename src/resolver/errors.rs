//! Resolution error types.

use thiserror::Error;

/// Error locating a toolchain executable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// Nothing usable was found; `tool` is the human-facing tool name.
    #[error("No {tool} executable found!")]
    NotFound { tool: String },
}

impl ResolverError {
    /// Create a not-found error for the named tool.
    pub fn not_found(tool: impl Into<String>) -> Self {
        ResolverError::NotFound { tool: tool.into() }
    }
}
