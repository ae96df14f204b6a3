//! Pieces shared by the Java workflows.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{Action, ActionError, CleanUpAction, Purpose};
use crate::util::fs::CopyFilter;
use crate::util::os::OsUtils;
use crate::workflow::WorkflowConfig;

/// Directory under the artifacts (and dependencies) dir holding dependency jars.
pub const LIB_DIR: &str = "lib";

/// Copies `<artifacts>/lib` into `<dependencies>/lib`.
#[derive(Debug)]
pub struct JavaCopyDependenciesAction {
    artifacts_dir: PathBuf,
    dependencies_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl JavaCopyDependenciesAction {
    pub fn new(artifacts_dir: &Path, dependencies_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        JavaCopyDependenciesAction {
            artifacts_dir: artifacts_dir.to_path_buf(),
            dependencies_dir: dependencies_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for JavaCopyDependenciesAction {
    fn name(&self) -> &str {
        "JavaCopyDependencies"
    }

    fn description(&self) -> &str {
        "Copying dependencies"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopyDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        let lib = self.artifacts_dir.join(LIB_DIR);
        let target = self.dependencies_dir.join(LIB_DIR);
        self.os
            .makedirs(&target)
            .and_then(|()| self.os.copytree(&lib, &target, &CopyFilter::all()))
            .map_err(|e| ActionError::failed(e.to_string()))
    }
}

/// Moves `<artifacts>/lib` to `<dependencies>/lib`.
#[derive(Debug)]
pub struct JavaMoveDependenciesAction {
    artifacts_dir: PathBuf,
    dependencies_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl JavaMoveDependenciesAction {
    pub fn new(artifacts_dir: &Path, dependencies_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        JavaMoveDependenciesAction {
            artifacts_dir: artifacts_dir.to_path_buf(),
            dependencies_dir: dependencies_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for JavaMoveDependenciesAction {
    fn name(&self) -> &str {
        "JavaMoveDependencies"
    }

    fn description(&self) -> &str {
        "Move dependencies"
    }

    fn purpose(&self) -> Purpose {
        Purpose::MoveDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.os
            .move_path(
                &self.artifacts_dir.join(LIB_DIR),
                &self.dependencies_dir.join(LIB_DIR),
            )
            .map_err(|e| ActionError::failed(e.to_string()))
    }
}

/// Trailing actions that populate `dependencies_dir`, if one was requested.
pub fn dependency_actions(config: &WorkflowConfig, os: &Arc<dyn OsUtils>) -> Vec<Box<dyn Action>> {
    let Some(deps) = &config.dependencies_dir else {
        return Vec::new();
    };

    let mut actions: Vec<Box<dyn Action>> = vec![Box::new(CleanUpAction::new(deps, Arc::clone(os)))];
    if config.combine_dependencies {
        actions.push(Box::new(JavaCopyDependenciesAction::new(
            &config.artifacts_dir,
            deps,
            Arc::clone(os),
        )));
    } else {
        actions.push(Box::new(JavaMoveDependenciesAction::new(
            &config.artifacts_dir,
            deps,
            Arc::clone(os),
        )));
    }
    actions
}
