//! Java projects built with Gradle.
//!
//! The Gradle binary comes from, in order: the caller's search paths, the
//! project's own `gradlew` wrapper, the system `PATH`. The build runs with an
//! init script that lays the function out under `<scratch>/lambda-build`,
//! which is then copied to the artifacts directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::java::dependency_actions;
use crate::actions::{Action, ActionError, Purpose};
use crate::core::Capability;
use crate::resolver::{ExecutableName, PathResolver, ProjectLocalResolver, Resolver, ResolverChain};
use crate::toolchain::SubprocessTool;
use crate::util::fs::CopyFilter;
use crate::util::os::OsUtils;
use crate::validator::{JvmFlavor, JvmValidator, Validator};
use crate::workflow::{Binaries, WorkflowContext, WorkflowError, WorkflowFactory};

const GRADLE: &str = "gradle";

pub const INIT_SCRIPT: &str = "lambda-build-init.gradle";
const INIT_SCRIPT_CONTENTS: &str = include_str!("resources/lambda-build-init.gradle");
const SCRATCH_DIR_PROPERTY: &str = "software.amazon.aws.lambdabuilders.scratch-dir";
const GRADLE_CACHE_DIR_NAME: &str = "gradle-cache";
/// Directory under scratch the init script writes the function layout to.
pub const BUILD_OUTPUT_DIR: &str = "lambda-build";

/// Runs `gradle build` with the lambda-build init script.
#[derive(Debug)]
pub struct GradleBuildAction {
    source_dir: PathBuf,
    build_file: PathBuf,
    scratch_dir: PathBuf,
    gradle: SubprocessTool,
    os: Arc<dyn OsUtils>,
}

impl GradleBuildAction {
    pub fn new(
        source_dir: &Path,
        build_file: &Path,
        scratch_dir: &Path,
        gradle: SubprocessTool,
        os: Arc<dyn OsUtils>,
    ) -> Self {
        GradleBuildAction {
            source_dir: source_dir.to_path_buf(),
            build_file: build_file.to_path_buf(),
            scratch_dir: scratch_dir.to_path_buf(),
            gradle,
            os,
        }
    }

    fn write_init_script(&self) -> Result<PathBuf, ActionError> {
        let path = self.scratch_dir.join(INIT_SCRIPT);
        self.os
            .makedirs(&self.scratch_dir)
            .and_then(|()| self.os.write_file(&path, INIT_SCRIPT_CONTENTS.as_bytes()))
            .map_err(|e| ActionError::failed(e.to_string()))?;
        Ok(path)
    }
}

impl Action for GradleBuildAction {
    fn name(&self) -> &str {
        "GradleBuild"
    }

    fn description(&self) -> &str {
        "Building the project using Gradle"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        let init_script = self.write_init_script()?;

        if !self.os.exists(&self.build_file) {
            return Err(ActionError::failed(format!(
                "Gradle Failed: Gradle build file not found: {}",
                self.build_file.display()
            )));
        }

        let args = vec![
            "build".to_string(),
            "--build-file".to_string(),
            self.build_file.display().to_string(),
            "--project-cache-dir".to_string(),
            self.scratch_dir.join(GRADLE_CACHE_DIR_NAME).display().to_string(),
            format!("-D{}={}", SCRATCH_DIR_PROPERTY, self.scratch_dir.display()),
            "--init-script".to_string(),
            init_script.display().to_string(),
        ];
        self.gradle
            .run(&args, Some(self.source_dir.as_path()), None)?;
        Ok(())
    }
}

/// Copies `<scratch>/lambda-build` into the artifacts directory.
#[derive(Debug)]
pub struct GradleCopyArtifactsAction {
    scratch_dir: PathBuf,
    artifacts_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl GradleCopyArtifactsAction {
    pub fn new(scratch_dir: &Path, artifacts_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        GradleCopyArtifactsAction {
            scratch_dir: scratch_dir.to_path_buf(),
            artifacts_dir: artifacts_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for GradleCopyArtifactsAction {
    fn name(&self) -> &str {
        "GradleCopyArtifacts"
    }

    fn description(&self) -> &str {
        "Copying the built artifacts"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopySource
    }

    fn execute(&self) -> Result<(), ActionError> {
        let output = self.scratch_dir.join(BUILD_OUTPUT_DIR);
        if !self.os.is_dir(&output) {
            return Err(ActionError::failed(format!(
                "Gradle build did not produce {}",
                output.display()
            )));
        }
        self.os
            .makedirs(&self.artifacts_dir)
            .and_then(|()| {
                self.os
                    .copytree(&output, &self.artifacts_dir, &CopyFilter::all())
            })
            .map_err(|e| ActionError::failed(e.to_string()))
    }
}

/// `{java, gradle, *}`.
#[derive(Debug, Default)]
pub struct JavaGradleWorkflow;

impl WorkflowFactory for JavaGradleWorkflow {
    fn name(&self) -> &str {
        "JavaGradleWorkflow"
    }

    fn capability(&self) -> Capability {
        Capability::new("java", Some("gradle"), None)
    }

    fn supported_manifests(&self) -> &[&str] {
        &["build.gradle", "build.gradle.kts"]
    }

    fn resolvers(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        let os = &ctx.os;
        let chain = ResolverChain::new(GRADLE, "Gradle")
            .then(
                PathResolver::new(GRADLE, "Gradle", Arc::clone(os))
                    .with_search_paths(ctx.config.executable_search_paths.iter().cloned())
                    .search_paths_only(),
            )
            .then(ProjectLocalResolver::new(
                GRADLE,
                ExecutableName::new("gradlew").with_windows_names(["gradlew.bat"]),
                &ctx.config.source_dir,
                Arc::clone(os),
            ))
            .then(PathResolver::new(GRADLE, "Gradle", Arc::clone(os)));
        vec![Box::new(chain)]
    }

    fn validators(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Validator>> {
        vec![Box::new(JvmValidator::new(
            JvmFlavor::Gradle,
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
        let os = &ctx.os;
        let gradle = SubprocessTool::new(
            "Gradle",
            binaries.require(self.name(), GRADLE)?,
            Arc::clone(os),
        );

        let mut actions: Vec<Box<dyn Action>> = vec![
            Box::new(GradleBuildAction::new(
                &config.source_dir,
                &config.manifest_path,
                &config.scratch_dir,
                gradle,
                Arc::clone(os),
            )),
            Box::new(GradleCopyArtifactsAction::new(
                &config.scratch_dir,
                &config.artifacts_dir,
                Arc::clone(os),
            )),
        ];
        actions.extend(dependency_actions(config, os));
        Ok(actions)
    }
}
