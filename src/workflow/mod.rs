//! The ordered action pipeline.
//!
//! A [`WorkflowFactory`] describes one build strategy: the capability it
//! serves, the binaries it needs and how to turn a [`WorkflowConfig`] into
//! actions. [`WorkflowFactory::create`] resolves and validates binaries
//! first, then builds the [`Workflow`]; [`Workflow::run`] executes the
//! actions strictly in order and stops at the first failure.

mod binaries;
mod config;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::actions::{Action, ActionError};
use crate::core::Capability;
use crate::resolver::Resolver;
use crate::util::os::OsUtils;
use crate::validator::Validator;

pub use binaries::{resolve_binaries, Binaries};
pub use config::{Options, WorkflowConfig};

/// Error building or running a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// An action, resolver or validator failed in an expected way.
    #[error("{workflow}:{action} - {reason}")]
    Failed {
        workflow: String,
        action: String,
        reason: String,
    },

    /// An action failed in a way it did not anticipate.
    #[error("{workflow}:{action} - {reason}")]
    Unknown {
        workflow: String,
        action: String,
        reason: String,
    },

    /// The workflow cannot be built from the inputs it was given.
    #[error("{workflow} - {reason}")]
    Configuration { workflow: String, reason: String },

    #[error("{workflow} - Workflow does not have any actions registered")]
    NoActions { workflow: String },
}

/// Where a workflow does its work by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildDirectory {
    Scratch,
    Artifacts,
    Source,
}

/// Whether a workflow can build directly inside the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildInSourceSupport {
    NotSupported,
    OptionallySupported,
    ExclusivelySupported,
}

impl BuildInSourceSupport {
    /// Whether a requested `build_in_source` value can be honored.
    pub fn accepts(&self, build_in_source: bool) -> bool {
        match self {
            BuildInSourceSupport::NotSupported => !build_in_source,
            BuildInSourceSupport::OptionallySupported => true,
            BuildInSourceSupport::ExclusivelySupported => build_in_source,
        }
    }
}

/// Inputs every factory method receives.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub config: WorkflowConfig,
    /// Effective build directory after applying `build_in_source`.
    pub build_dir: PathBuf,
    pub os: Arc<dyn OsUtils>,
}

/// A build strategy for one capability.
pub trait WorkflowFactory: Send + Sync {
    fn name(&self) -> &str;

    fn capability(&self) -> Capability;

    /// Manifest file names this workflow understands; empty means any.
    fn supported_manifests(&self) -> &[&str] {
        &[]
    }

    fn default_build_dir(&self) -> BuildDirectory {
        BuildDirectory::Scratch
    }

    fn build_in_source_support(&self) -> BuildInSourceSupport {
        BuildInSourceSupport::NotSupported
    }

    /// Reject unusable options before any binary is resolved.
    fn validate_options(&self, _ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        Ok(())
    }

    /// Resolvers for every binary the actions need.
    fn resolvers(&self, _ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        Vec::new()
    }

    /// One validator per resolver, in the same order.
    fn validators(&self, _ctx: &WorkflowContext) -> Vec<Box<dyn Validator>> {
        Vec::new()
    }

    /// Build the ordered actions from resolved binaries.
    fn actions(
        &self,
        ctx: &WorkflowContext,
        binaries: &Binaries,
    ) -> Result<Vec<Box<dyn Action>>, WorkflowError>;

    /// Construct a ready-to-run workflow for `config`.
    fn create(
        &self,
        config: WorkflowConfig,
        os: Arc<dyn OsUtils>,
    ) -> Result<Workflow, WorkflowError> {
        let build_dir = select_build_dir(
            self.name(),
            self.default_build_dir(),
            self.build_in_source_support(),
            &config,
        );
        let ctx = WorkflowContext {
            config,
            build_dir,
            os,
        };

        self.validate_options(&ctx)?;

        let capability = self.capability();
        let binaries = resolve_binaries(
            self.name(),
            &capability,
            ctx.config.runtime.as_ref(),
            self.resolvers(&ctx),
            self.validators(&ctx),
        )?;
        let actions = self.actions(&ctx, &binaries)?;

        Ok(Workflow {
            name: self.name().to_string(),
            capability,
            supported_manifests: self
                .supported_manifests()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            manifest_path: ctx.config.manifest_path.clone(),
            artifacts_dir: ctx.config.artifacts_dir.clone(),
            actions,
        })
    }
}

/// Pick the directory a workflow builds in.
///
/// A `build_in_source` request the workflow cannot honor is ignored with a
/// warning and the workflow's default applies.
pub fn select_build_dir(
    workflow: &str,
    default: BuildDirectory,
    support: BuildInSourceSupport,
    config: &WorkflowConfig,
) -> PathBuf {
    let in_source = match config.build_in_source {
        Some(requested) if support.accepts(requested) => requested,
        Some(requested) => {
            tracing::warn!(
                "Workflow {} does not support value \"{}\" for building in source. Using default value.",
                workflow,
                requested
            );
            default == BuildDirectory::Source
        }
        None => default == BuildDirectory::Source,
    };

    if in_source {
        return config.source_dir.clone();
    }
    match default {
        BuildDirectory::Artifacts => config.artifacts_dir.clone(),
        BuildDirectory::Scratch | BuildDirectory::Source => config.scratch_dir.clone(),
    }
}

/// An ordered sequence of actions for one build.
#[derive(Debug)]
pub struct Workflow {
    name: String,
    capability: Capability,
    supported_manifests: Vec<String>,
    manifest_path: PathBuf,
    artifacts_dir: PathBuf,
    actions: Vec<Box<dyn Action>>,
}

impl Workflow {
    /// Create a workflow directly from actions.
    pub fn new(
        name: impl Into<String>,
        capability: Capability,
        artifacts_dir: impl Into<PathBuf>,
        actions: Vec<Box<dyn Action>>,
    ) -> Self {
        Workflow {
            name: name.into(),
            capability,
            supported_manifests: Vec::new(),
            manifest_path: PathBuf::new(),
            artifacts_dir: artifacts_dir.into(),
            actions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The build's output location.
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    /// Whether the manifest's file name is one this workflow understands.
    pub fn is_supported(&self) -> bool {
        if self.supported_manifests.is_empty() {
            return true;
        }
        self.manifest_path
            .file_name()
            .map(|name| {
                let name = name.to_string_lossy();
                self.supported_manifests.iter().any(|m| *m == name)
            })
            .unwrap_or(false)
    }

    /// Execute every action in order, stopping at the first failure.
    pub fn run(&self) -> Result<(), WorkflowError> {
        tracing::debug!("Running workflow '{}'", self.name);

        if self.actions.is_empty() {
            return Err(WorkflowError::NoActions {
                workflow: self.name.clone(),
            });
        }

        for action in &self.actions {
            let info = format!("Workflow='{}',Action='{}'", self.name, action.name());
            tracing::info!("Running {}: {}", info, action.description());

            match action.execute() {
                Ok(()) => tracing::debug!("{} succeeded", info),
                Err(ActionError::Failed(reason)) => {
                    tracing::debug!("{} failed: {}", info, reason);
                    return Err(WorkflowError::Failed {
                        workflow: self.name.clone(),
                        action: action.name().to_string(),
                        reason,
                    });
                }
                Err(e) => {
                    tracing::debug!("{} raised an unexpected error: {}", info, e);
                    return Err(WorkflowError::Unknown {
                        workflow: self.name.clone(),
                        action: action.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workflow={}", self.name)?;
        write!(f, "Actions=")?;
        for action in &self.actions {
            write!(f, "\n\t{}", action)?;
        }
        Ok(())
    }
}
