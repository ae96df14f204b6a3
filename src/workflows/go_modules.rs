//! Go projects using modules, built in place with `go build`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{Action, ActionError, Purpose};
use crate::core::{Architecture, Capability};
use crate::resolver::{PathResolver, Resolver};
use crate::toolchain::SubprocessTool;
use crate::util::os::OsUtils;
use crate::validator::{GoRuntimeValidator, Validator};
use crate::workflow::{
    Binaries, BuildDirectory, BuildInSourceSupport, WorkflowContext, WorkflowError,
    WorkflowFactory,
};

const GO: &str = "go";

/// Option naming the output executable under the artifacts directory.
pub const ARTIFACT_EXECUTABLE_NAME: &str = "artifact_executable_name";
/// Option stripping file system paths from the binary.
pub const TRIM_GO_PATH: &str = "trim_go_path";

/// Cross-compiles the module in `source_dir` for Lambda.
#[derive(Debug)]
pub struct GoModulesBuildAction {
    source_dir: PathBuf,
    output_path: PathBuf,
    architecture: Architecture,
    trim_go_path: bool,
    debug: bool,
    go: SubprocessTool,
    os: Arc<dyn OsUtils>,
}

impl GoModulesBuildAction {
    /// Create a new build action writing the executable to `output_path`.
    pub fn new(
        source_dir: &Path,
        output_path: &Path,
        architecture: Architecture,
        go: SubprocessTool,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        GoModulesBuildAction {
            source_dir: source_dir.to_path_buf(),
            output_path: output_path.to_path_buf(),
            architecture,
            trim_go_path: false,
            debug: false,
            go,
            os,
        }
    }

    pub fn trim_go_path(mut self, enabled: bool) -> Self {
        self.trim_go_path = enabled;
        self
    }

    /// Disable optimizations and inlining so the binary can be debugged.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        if self.trim_go_path {
            args.push("-trimpath".to_string());
        }
        if self.debug {
            args.push("-gcflags".to_string());
            args.push("all=-N -l".to_string());
        }
        args.push("-o".to_string());
        args.push(self.output_path.display().to_string());
        args.push(self.source_dir.display().to_string());
        args
    }

    fn env(&self) -> HashMap<String, String> {
        let mut env = self.os.environ();
        env.insert("GOOS".to_string(), "linux".to_string());
        env.insert("GOARCH".to_string(), self.architecture.go_arch().to_string());
        env.insert("CGO_ENABLED".to_string(), "0".to_string());
        env
    }
}

impl Action for GoModulesBuildAction {
    fn name(&self) -> &str {
        "GoModulesBuild"
    }

    fn description(&self) -> &str {
        "Building Go package with Go Modules"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.go
            .run(self.args(), Some(self.source_dir.as_path()), Some(&self.env()))?;
        Ok(())
    }
}

/// `{go, modules, *}`.
#[derive(Debug, Default)]
pub struct GoModulesWorkflow;

impl WorkflowFactory for GoModulesWorkflow {
    fn name(&self) -> &str {
        "GoModulesBuilder"
    }

    fn capability(&self) -> Capability {
        Capability::new("go", Some("modules"), None)
    }

    fn supported_manifests(&self) -> &[&str] {
        &["go.mod"]
    }

    fn default_build_dir(&self) -> BuildDirectory {
        BuildDirectory::Source
    }

    fn build_in_source_support(&self) -> BuildInSourceSupport {
        BuildInSourceSupport::ExclusivelySupported
    }

    fn validate_options(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        if ctx.config.option_str(ARTIFACT_EXECUTABLE_NAME).is_none() {
            return Err(WorkflowError::Configuration {
                workflow: self.name().to_string(),
                reason: format!("Option '{}' is required", ARTIFACT_EXECUTABLE_NAME),
            });
        }
        Ok(())
    }

    fn resolvers(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        vec![Box::new(
            PathResolver::new(GO, "Go", Arc::clone(&ctx.os))
                .with_search_paths(ctx.config.executable_search_paths.iter().cloned()),
        )]
    }

    fn validators(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Validator>> {
        vec![Box::new(GoRuntimeValidator::new(
            ctx.config.runtime.clone(),
            Arc::clone(&ctx.os),
        ))]
    }

    fn actions(
        &self,
        ctx: &WorkflowContext,
        binaries: &Binaries,
    ) -> Result<Vec<Box<dyn Action>>, WorkflowError> {
        let config = &ctx.config;
        let handler = config.option_str(ARTIFACT_EXECUTABLE_NAME).ok_or_else(|| {
            WorkflowError::Configuration {
                workflow: self.name().to_string(),
                reason: format!("Option '{}' is required", ARTIFACT_EXECUTABLE_NAME),
            }
        })?;
        let go = SubprocessTool::new("Builder", binaries.require(self.name(), GO)?, Arc::clone(&ctx.os));

        let build = GoModulesBuildAction::new(
            &ctx.build_dir,
            &config.artifacts_dir.join(handler),
            config.architecture,
            go,
            Arc::clone(&ctx.os),
        )
        .trim_go_path(config.option_bool(TRIM_GO_PATH))
        .debug(config.is_debug());

        Ok(vec![Box::new(build)])
    }
}
