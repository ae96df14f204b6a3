//! Built-in workflows.
//!
//! Each workflow wires the shared resolver, validator and action machinery
//! to one toolchain. Tool invocations stay minimal; projects needing more
//! control supply their own [`WorkflowFactory`](crate::workflow::WorkflowFactory).

pub mod custom_make;
pub mod go_modules;
pub mod java;
pub mod java_gradle;
pub mod java_maven;
pub mod ruby_bundler;

use crate::registry::Registry;

pub use custom_make::CustomMakeWorkflow;
pub use go_modules::GoModulesWorkflow;
pub use java_gradle::JavaGradleWorkflow;
pub use java_maven::JavaMavenWorkflow;
pub use ruby_bundler::RubyBundlerWorkflow;

/// Register every built-in workflow.
pub fn register_builtin(registry: &mut Registry) {
    let results = [
        registry.register_workflow(JavaMavenWorkflow),
        registry.register_workflow(JavaGradleWorkflow),
        registry.register_workflow(CustomMakeWorkflow),
        registry.register_workflow(GoModulesWorkflow),
        registry.register_workflow(RubyBundlerWorkflow),
    ];
    for result in results {
        if let Err(e) = result {
            tracing::warn!("skipping built-in workflow: {}", e);
        }
    }
}
