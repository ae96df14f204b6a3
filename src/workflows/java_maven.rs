//! Java projects built with Maven.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::java::{dependency_actions, LIB_DIR};
use crate::actions::{Action, ActionError, CopySourceAction, Purpose};
use crate::core::Capability;
use crate::resolver::{ExecutableName, PathResolver, Resolver};
use crate::toolchain::{DiagnosticStream, SubprocessTool};
use crate::util::fs::CopyFilter;
use crate::util::os::OsUtils;
use crate::validator::{JvmFlavor, JvmValidator, Validator};
use crate::workflow::{Binaries, WorkflowContext, WorkflowError, WorkflowFactory};

const MVN: &str = "mvn";

/// `mvn clean install` in the build directory.
#[derive(Debug)]
pub struct MavenBuildAction {
    build_dir: PathBuf,
    maven: SubprocessTool,
}

impl MavenBuildAction {
    pub fn new(build_dir: &Path, maven: SubprocessTool) -> Self {
        MavenBuildAction {
            build_dir: build_dir.to_path_buf(),
            maven,
        }
    }
}

impl Action for MavenBuildAction {
    fn name(&self) -> &str {
        "MavenBuild"
    }

    fn description(&self) -> &str {
        "Building the project using Maven"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.maven
            .run(["clean", "install"], Some(self.build_dir.as_path()), None)?;
        Ok(())
    }
}

/// Copies runtime-scoped dependency jars into `target/dependency`.
#[derive(Debug)]
pub struct MavenCopyDependencyAction {
    build_dir: PathBuf,
    maven: SubprocessTool,
}

impl MavenCopyDependencyAction {
    pub fn new(build_dir: &Path, maven: SubprocessTool) -> Self {
        MavenCopyDependencyAction {
            build_dir: build_dir.to_path_buf(),
            maven,
        }
    }
}

impl Action for MavenCopyDependencyAction {
    fn name(&self) -> &str {
        "MavenCopyDependency"
    }

    fn description(&self) -> &str {
        "Copy dependency jars to target directory"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopySource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.maven.run(
            [
                "dependency:copy-dependencies",
                "-DincludeScope=runtime",
                "-Dmdep.prependGroupId=true",
            ],
            Some(self.build_dir.as_path()),
            None,
        )?;
        Ok(())
    }
}

/// Lays out `target/classes` and `target/dependency` as a function bundle.
#[derive(Debug)]
pub struct MavenCopyArtifactsAction {
    build_dir: PathBuf,
    artifacts_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl MavenCopyArtifactsAction {
    pub fn new(build_dir: &Path, artifacts_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        MavenCopyArtifactsAction {
            build_dir: build_dir.to_path_buf(),
            artifacts_dir: artifacts_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for MavenCopyArtifactsAction {
    fn name(&self) -> &str {
        "MavenCopyArtifacts"
    }

    fn description(&self) -> &str {
        "Copying the built artifacts"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopySource
    }

    fn execute(&self) -> Result<(), ActionError> {
        let classes = self.build_dir.join("target").join("classes");
        if !self.os.is_dir(&classes) {
            return Err(ActionError::failed(
                "Required target/classes directory was not produced from 'mvn package'",
            ));
        }

        let dependencies = self.build_dir.join("target").join("dependency");
        let copy = || -> std::io::Result<()> {
            self.os.makedirs(&self.artifacts_dir)?;
            self.os
                .copytree(&classes, &self.artifacts_dir, &CopyFilter::all())?;
            if self.os.is_dir(&dependencies) {
                self.os.copytree(
                    &dependencies,
                    &self.artifacts_dir.join(LIB_DIR),
                    &CopyFilter::all(),
                )?;
            }
            Ok(())
        };
        copy().map_err(|e| ActionError::failed(e.to_string()))
    }
}

/// Lays out the built jar and its dependencies as a layer under `java/lib`.
#[derive(Debug)]
pub struct MavenCopyLayerArtifactsAction {
    build_dir: PathBuf,
    artifacts_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl MavenCopyLayerArtifactsAction {
    pub fn new(build_dir: &Path, artifacts_dir: &Path, os: Arc<dyn OsUtils>) -> Self {
        MavenCopyLayerArtifactsAction {
            build_dir: build_dir.to_path_buf(),
            artifacts_dir: artifacts_dir.to_path_buf(),
            os,
        }
    }
}

impl Action for MavenCopyLayerArtifactsAction {
    fn name(&self) -> &str {
        "MavenCopyLayerArtifacts"
    }

    fn description(&self) -> &str {
        "Copying the built layer artifacts"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CopySource
    }

    fn execute(&self) -> Result<(), ActionError> {
        let target = self.build_dir.join("target");
        if !self.os.is_dir(&target) {
            return Err(ActionError::failed(
                "Required target directory was not produced from 'mvn package'",
            ));
        }

        let lib = self.artifacts_dir.join("java").join(LIB_DIR);
        let dependencies = target.join("dependency");
        let jars = CopyFilter::all().including(["*.jar"]);
        let copy = || -> std::io::Result<()> {
            self.os.makedirs(&lib)?;
            for entry in self.os.listdir(&target)? {
                let Some(name) = entry.file_name() else {
                    continue;
                };
                if self.os.is_dir(&entry) || !jars.allows_file(&name.to_string_lossy()) {
                    continue;
                }
                self.os.copy_file(&entry, &lib.join(name))?;
            }
            if self.os.is_dir(&dependencies) {
                self.os.copytree(&dependencies, &lib, &CopyFilter::all())?;
            }
            Ok(())
        };
        copy().map_err(|e| ActionError::failed(e.to_string()))
    }
}

/// `{java, maven, *}`.
#[derive(Debug, Default)]
pub struct JavaMavenWorkflow;

impl WorkflowFactory for JavaMavenWorkflow {
    fn name(&self) -> &str {
        "JavaMavenWorkflow"
    }

    fn capability(&self) -> Capability {
        Capability::new("java", Some("maven"), None)
    }

    fn supported_manifests(&self) -> &[&str] {
        &["pom.xml"]
    }

    fn resolvers(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        vec![Box::new(
            PathResolver::new(MVN, "Maven", Arc::clone(&ctx.os))
                .with_names(ExecutableName::new(MVN).with_windows_names(["mvn.cmd"]))
                .with_search_paths(ctx.config.executable_search_paths.iter().cloned()),
        )]
    }

    fn validators(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Validator>> {
        vec![Box::new(JvmValidator::new(
            JvmFlavor::Maven,
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
        let maven = SubprocessTool::new("Maven", binaries.require(self.name(), MVN)?, Arc::clone(os))
            .diagnostics_on(DiagnosticStream::Stdout);

        let copy_artifacts: Box<dyn Action> = if config.is_building_layer {
            Box::new(MavenCopyLayerArtifactsAction::new(
                &ctx.build_dir,
                &config.artifacts_dir,
                Arc::clone(os),
            ))
        } else {
            Box::new(MavenCopyArtifactsAction::new(
                &ctx.build_dir,
                &config.artifacts_dir,
                Arc::clone(os),
            ))
        };

        let mut actions: Vec<Box<dyn Action>> = vec![
            Box::new(CopySourceAction::new(
                &config.source_dir,
                &ctx.build_dir,
                Arc::clone(os),
            )),
            Box::new(MavenBuildAction::new(&ctx.build_dir, maven.clone())),
            Box::new(MavenCopyDependencyAction::new(&ctx.build_dir, maven)),
            copy_artifacts,
        ];
        actions.extend(dependency_actions(config, os));
        Ok(actions)
    }
}
