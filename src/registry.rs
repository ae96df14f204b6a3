//! Capability registry.
//!
//! Maps a [`Capability`] to the [`WorkflowFactory`] that builds it. Lookups
//! are exact on language and dependency manager; a registered capability
//! without a framework serves any requested framework, but a registration
//! naming the requested framework always wins over it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::Capability;
use crate::workflow::WorkflowFactory;

/// Error registering or looking up a workflow.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unable to find a workflow matching given capability: {capability}")]
    NotFound { capability: Capability },

    #[error("A workflow is already registered for capability: {capability}")]
    Duplicate { capability: Capability },
}

struct Entry {
    capability: Capability,
    factory: Arc<dyn WorkflowFactory>,
}

/// Table of workflow factories keyed by capability.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Create a registry with every built-in workflow registered.
    pub fn with_builtin_workflows() -> Self {
        let mut registry = Registry::new();
        crate::workflows::register_builtin(&mut registry);
        registry
    }

    /// Register `factory` under `capability`.
    ///
    /// Registering the exact same capability twice is rejected.
    pub fn register(
        &mut self,
        capability: Capability,
        factory: Arc<dyn WorkflowFactory>,
    ) -> Result<(), RegistryError> {
        if self.contains(&capability) {
            return Err(RegistryError::Duplicate { capability });
        }
        tracing::debug!(
            "registering workflow '{}' for capability ({})",
            factory.name(),
            capability
        );
        self.entries.push(Entry {
            capability,
            factory,
        });
        Ok(())
    }

    /// Register a factory under the capability it declares.
    pub fn register_workflow<F>(&mut self, factory: F) -> Result<(), RegistryError>
    where
        F: WorkflowFactory + 'static,
    {
        let capability = factory.capability();
        self.register(capability, Arc::new(factory))
    }

    /// Find the factory serving `requested`.
    pub fn resolve(
        &self,
        requested: &Capability,
    ) -> Result<Arc<dyn WorkflowFactory>, RegistryError> {
        self.entries
            .iter()
            .filter(|entry| entry.capability.matches(requested))
            .min_by_key(|entry| entry.capability.is_framework_wildcard())
            .map(|entry| Arc::clone(&entry.factory))
            .ok_or_else(|| RegistryError::NotFound {
                capability: requested.clone(),
            })
    }

    /// Whether exactly this capability is registered.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.entries.iter().any(|e| &e.capability == capability)
    }

    /// Registered capabilities, in registration order.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> + '_ {
        self.entries.iter().map(|e| &e.capability)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.capability.to_string(), e.factory.name().to_string())),
            )
            .finish()
    }
}
