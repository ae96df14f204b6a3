//! Library entry point: pick a workflow for a capability and run it.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::core::Capability;
use crate::registry::{Registry, RegistryError};
use crate::util::os::OsUtils;
use crate::workflow::{WorkflowConfig, WorkflowError, WorkflowFactory};

/// Error from a full build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// A builder bound to the workflow selected for one capability.
pub struct LambdaBuilder {
    capability: Capability,
    factory: Arc<dyn WorkflowFactory>,
}

impl LambdaBuilder {
    /// Select the workflow for `capability` from `registry`.
    pub fn new(capability: Capability, registry: &Registry) -> Result<Self, BuildError> {
        let factory = registry.resolve(&capability)?;
        tracing::debug!(
            "Found workflow '{}' to support capabilities '{}'",
            factory.name(),
            capability
        );
        Ok(LambdaBuilder {
            capability,
            factory,
        })
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Name of the selected workflow.
    pub fn workflow_name(&self) -> &str {
        self.factory.name()
    }

    /// Build `config` and return the artifacts directory.
    pub fn build(&self, config: WorkflowConfig, os: Arc<dyn OsUtils>) -> Result<PathBuf, BuildError> {
        let workflow = self.factory.create(config, os)?;

        if !workflow.is_supported() {
            tracing::warn!(
                "Workflow '{}' does not recognize the manifest file; attempting the build anyway",
                workflow.name()
            );
        }

        tracing::debug!("{}", workflow);
        workflow.run()?;
        Ok(workflow.artifacts_dir().to_path_buf())
    }
}
