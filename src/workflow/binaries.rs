//! Binary resolution pass run before a workflow builds its actions.

use std::collections::HashMap;
use std::path::PathBuf;

use super::WorkflowError;
use crate::core::{BinaryPath, Capability, Runtime};
use crate::resolver::Resolver;
use crate::validator::{Validator, ValidatorError};

/// Binaries resolved for one workflow instance, keyed by logical name.
#[derive(Debug, Clone, Default)]
pub struct Binaries {
    by_name: HashMap<String, BinaryPath>,
}

impl Binaries {
    /// Create an empty set.
    pub fn new() -> Self {
        Binaries::default()
    }

    pub fn insert(&mut self, binary: BinaryPath) {
        self.by_name.insert(binary.binary().to_string(), binary);
    }

    pub fn get(&self, name: &str) -> Option<&BinaryPath> {
        self.by_name.get(name)
    }

    /// Look up a binary an action cannot run without.
    ///
    /// A miss means the workflow asked for a binary it never declared a
    /// resolver for, which is a configuration error.
    pub fn require(&self, workflow: &str, name: &str) -> Result<BinaryPath, WorkflowError> {
        self.get(name).cloned().ok_or_else(|| WorkflowError::Configuration {
            workflow: workflow.to_string(),
            reason: format!("no resolver was registered for required binary '{}'", name),
        })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Resolve every binary, then keep the first candidate each validator accepts.
///
/// Resolvers and validators are paired by position.
pub fn resolve_binaries(
    workflow: &str,
    capability: &Capability,
    runtime: Option<&Runtime>,
    resolvers: Vec<Box<dyn Resolver>>,
    validators: Vec<Box<dyn Validator>>,
) -> Result<Binaries, WorkflowError> {
    if resolvers.len() != validators.len() {
        return Err(WorkflowError::Configuration {
            workflow: workflow.to_string(),
            reason: format!(
                "{} resolvers but {} validators; every resolved binary needs a validator",
                resolvers.len(),
                validators.len()
            ),
        });
    }

    let mut binaries = Binaries::new();
    for (resolver, validator) in resolvers.iter().zip(validators.iter()) {
        let candidates = resolver.exec_paths().map_err(|e| WorkflowError::Failed {
            workflow: workflow.to_string(),
            action: "Resolver".to_string(),
            reason: e.to_string(),
        })?;

        let mut invalid: Vec<PathBuf> = Vec::new();
        let mut chosen = None;
        for candidate in candidates {
            match validator.validate(&candidate) {
                Ok(validated) => {
                    chosen = Some(validated);
                    break;
                }
                Err(e @ ValidatorError::BinaryNotFound { .. }) => {
                    tracing::debug!("rejected {}: {}", candidate.display(), e);
                    invalid.push(candidate);
                }
            }
        }

        let Some(validated) = chosen else {
            let binary = resolver.binary();
            let runtime = runtime.map(Runtime::to_string).unwrap_or_else(|| "None".to_string());
            return Err(WorkflowError::Failed {
                workflow: workflow.to_string(),
                action: "Validation".to_string(),
                reason: format!(
                    "Binary validation failed for {0}, searched for {0} in following locations: \
                     {1:?} which did not satisfy constraints for runtime: {2}. Do you have {0} for \
                     runtime: {2} on your PATH?",
                    binary, invalid, runtime
                ),
            });
        };

        tracing::debug!(
            "using {} at {}",
            resolver.binary(),
            validated.path.display()
        );
        binaries.insert(
            BinaryPath::new(
                capability.language.clone(),
                capability.dependency_manager.clone(),
                resolver.binary(),
                validated.path,
            )
            .with_version(validated.version),
        );
    }
    Ok(binaries)
}
