//! Core value types shared by every layer.
//!
//! - [`Capability`]: the registry key for a build strategy
//! - [`BinaryPath`]: a resolved toolchain executable
//! - [`Runtime`] and [`Architecture`]: what the artifacts target

pub mod binary_path;
pub mod capability;
pub mod runtime;

pub use binary_path::BinaryPath;
pub use capability::Capability;
pub use runtime::{
    Architecture, Runtime, UnsupportedArchitecture, UnsupportedRuntime, SUPPORTED_RUNTIMES,
};
