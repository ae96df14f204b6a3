//! `provided` runtimes built by a Makefile target.
//!
//! The function's logical id selects the target: `make --makefile <manifest>
//! build-<id>` runs with `ARTIFACTS_DIR` exported, and the Makefile is
//! expected to put everything the function needs there.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{Action, ActionError, CopySourceAction, Purpose};
use crate::core::Capability;
use crate::resolver::{PathResolver, Resolver};
use crate::toolchain::SubprocessTool;
use crate::util::os::OsUtils;
use crate::validator::{RuntimeValidator, Validator};
use crate::workflow::{
    Binaries, BuildDirectory, BuildInSourceSupport, WorkflowContext, WorkflowError,
    WorkflowFactory,
};

const MAKE: &str = "make";

/// Option naming the function whose `build-<id>` target runs.
pub const BUILD_LOGICAL_ID: &str = "build_logical_id";
/// Option overriding the directory make runs in.
pub const WORKING_DIRECTORY: &str = "working_directory";

/// Runs the `build-<logical id>` target.
#[derive(Debug)]
pub struct MakeBuildAction {
    artifacts_dir: PathBuf,
    manifest_path: PathBuf,
    working_dir: PathBuf,
    build_logical_id: String,
    make: SubprocessTool,
    os: Arc<dyn OsUtils>,
}

impl MakeBuildAction {
    pub fn new(
        artifacts_dir: &Path,
        manifest_path: &Path,
        working_dir: &Path,
        build_logical_id: &str,
        make: SubprocessTool,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        MakeBuildAction {
            artifacts_dir: artifacts_dir.to_path_buf(),
            manifest_path: manifest_path.to_path_buf(),
            working_dir: working_dir.to_path_buf(),
            build_logical_id: build_logical_id.to_string(),
            make,
            os,
        }
    }

    /// `ARTIFACTS_DIR` as the Makefile should see it.
    ///
    /// On Windows with a POSIX shell available, make runs recipes through
    /// that shell, which needs forward slashes.
    fn artifacts_dir_value(&self) -> String {
        let dir = self.artifacts_dir.display().to_string();
        if self.os.is_windows() && !self.os.which("sh", None).is_empty() {
            return dir.replace('\\', "/");
        }
        dir
    }
}

impl Action for MakeBuildAction {
    fn name(&self) -> &str {
        "MakeBuild"
    }

    fn description(&self) -> &str {
        "Running build target on Makefile"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        if !self.os.exists(&self.manifest_path) {
            return Err(ActionError::failed(format!(
                "Makefile not found at {}",
                self.manifest_path.display()
            )));
        }

        self.os.makedirs(&self.artifacts_dir)?;

        let artifacts_dir = self.artifacts_dir_value();
        tracing::info!("Current Artifacts Directory : {}", artifacts_dir);

        let mut env = self.os.environ();
        env.insert("ARTIFACTS_DIR".to_string(), artifacts_dir);

        let manifest = self.manifest_path.display().to_string();
        let target = format!("build-{}", self.build_logical_id);
        self.make.run(
            ["--makefile", manifest.as_str(), target.as_str()],
            Some(self.working_dir.as_path()),
            Some(&env),
        )?;
        Ok(())
    }
}

/// `{provided, -, -}`.
#[derive(Debug, Default)]
pub struct CustomMakeWorkflow;

impl WorkflowFactory for CustomMakeWorkflow {
    fn name(&self) -> &str {
        "CustomMakeBuilder"
    }

    fn capability(&self) -> Capability {
        Capability::new("provided", None, None)
    }

    fn supported_manifests(&self) -> &[&str] {
        &["Makefile", "makefile", "GNUmakefile"]
    }

    fn default_build_dir(&self) -> BuildDirectory {
        BuildDirectory::Scratch
    }

    fn build_in_source_support(&self) -> BuildInSourceSupport {
        BuildInSourceSupport::OptionallySupported
    }

    fn validate_options(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        if ctx.config.option_str(BUILD_LOGICAL_ID).is_none() {
            return Err(WorkflowError::Configuration {
                workflow: self.name().to_string(),
                reason: format!(
                    "Build target is not found! Option '{}' is required",
                    BUILD_LOGICAL_ID
                ),
            });
        }
        Ok(())
    }

    fn resolvers(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        vec![Box::new(
            PathResolver::new(MAKE, "Make", Arc::clone(&ctx.os))
                .with_search_paths(ctx.config.executable_search_paths.iter().cloned()),
        )]
    }

    fn validators(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Validator>> {
        vec![Box::new(RuntimeValidator::new(Arc::clone(&ctx.os)))]
    }

    fn actions(
        &self,
        ctx: &WorkflowContext,
        binaries: &Binaries,
    ) -> Result<Vec<Box<dyn Action>>, WorkflowError> {
        let config = &ctx.config;
        let os = &ctx.os;
        let build_logical_id = config.option_str(BUILD_LOGICAL_ID).ok_or_else(|| {
            WorkflowError::Configuration {
                workflow: self.name().to_string(),
                reason: format!("Option '{}' is required", BUILD_LOGICAL_ID),
            }
        })?;
        let make = SubprocessTool::new("Make", binaries.require(self.name(), MAKE)?, Arc::clone(os))
            .log_output(true);

        let working_dir = config
            .option_str(WORKING_DIRECTORY)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.build_dir.clone());

        let mut actions: Vec<Box<dyn Action>> = Vec::new();
        if ctx.build_dir != config.source_dir {
            actions.push(Box::new(CopySourceAction::new(
                &config.source_dir,
                &ctx.build_dir,
                Arc::clone(os),
            )));
        }
        actions.push(Box::new(MakeBuildAction::new(
            &config.artifacts_dir,
            &config.manifest_path,
            &working_dir,
            build_logical_id,
            make,
            Arc::clone(os),
        )));
        Ok(actions)
    }
}
