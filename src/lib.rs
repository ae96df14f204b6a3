//! Lambda Builders - capability-dispatched build workflows for Lambda functions
//!
//! A caller names a capability (language, dependency manager, application
//! framework) and the crate picks the registered workflow for it, resolves
//! and validates the toolchain binaries that workflow needs, and runs its
//! actions in order. The same engine is reachable in-process through
//! [`LambdaBuilder`] or from another process through the JSON-RPC
//! [`protocol`].

pub mod actions;
pub mod builder;
pub mod core;
pub mod protocol;
pub mod registry;
pub mod resolver;
pub mod toolchain;
pub mod util;
pub mod validator;
pub mod workflow;
pub mod workflows;

/// Test utilities and mocks for unit tests.
///
/// Only compiled for `cargo test`. Provides an in-memory [`util::os::OsUtils`]
/// and a few ready-made workflows and actions.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{BuildError, LambdaBuilder};
pub use crate::core::{Architecture, BinaryPath, Capability, Runtime};
pub use crate::protocol::{ProtocolHandler, ProtocolVersion, Response};
pub use crate::registry::{Registry, RegistryError};
pub use crate::workflow::{Workflow, WorkflowConfig, WorkflowError, WorkflowFactory};
