//! Ruby functions with gems vendored by Bundler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{
    Action, ActionError, CleanUpAction, CopyDependenciesAction, CopySourceAction,
    MoveDependenciesAction, Purpose,
};
use crate::core::Capability;
use crate::resolver::{ExecutableName, PathResolver, Resolver};
use crate::toolchain::{DiagnosticStream, SubprocessTool};
use crate::validator::{RuntimeValidator, Validator};
use crate::workflow::{
    Binaries, BuildDirectory, WorkflowContext, WorkflowError, WorkflowFactory,
};

const BUNDLE: &str = "bundle";

/// Runs `bundle install` to produce a complete `Gemfile.lock`.
#[derive(Debug)]
pub struct RubyBundleAction {
    source_dir: PathBuf,
    bundler: SubprocessTool,
}

impl RubyBundleAction {
    pub fn new(source_dir: &Path, bundler: SubprocessTool) -> Self {
        RubyBundleAction {
            source_dir: source_dir.to_path_buf(),
            bundler,
        }
    }
}

impl Action for RubyBundleAction {
    fn name(&self) -> &str {
        "RubyBundle"
    }

    fn description(&self) -> &str {
        "Resolving dependencies using Bundler"
    }

    fn purpose(&self) -> Purpose {
        Purpose::ResolveDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        tracing::debug!("Running bundle install in {}", self.source_dir.display());
        self.bundler.run(
            ["install", "--without", "development", "test"],
            Some(self.source_dir.as_path()),
            None,
        )?;
        Ok(())
    }
}

/// Vendors gems into `vendor/bundle` with `bundle install --deployment`.
#[derive(Debug)]
pub struct RubyBundleDeploymentAction {
    source_dir: PathBuf,
    bundler: SubprocessTool,
}

impl RubyBundleDeploymentAction {
    pub fn new(source_dir: &Path, bundler: SubprocessTool) -> Self {
        RubyBundleDeploymentAction {
            source_dir: source_dir.to_path_buf(),
            bundler,
        }
    }
}

impl Action for RubyBundleDeploymentAction {
    fn name(&self) -> &str {
        "RubyBundleDeployment"
    }

    fn description(&self) -> &str {
        "Package dependencies for deployment."
    }

    fn purpose(&self) -> Purpose {
        Purpose::ResolveDependencies
    }

    fn execute(&self) -> Result<(), ActionError> {
        tracing::debug!(
            "Running bundle install --deployment in {}",
            self.source_dir.display()
        );
        self.bundler.run(
            ["install", "--deployment", "--without", "development", "test"],
            Some(self.source_dir.as_path()),
            None,
        )?;
        Ok(())
    }
}

/// `{ruby, bundler, -}`.
///
/// Source is copied into the artifacts directory and Bundler runs there, so
/// the vendored gems end up next to the handler.
#[derive(Debug, Default)]
pub struct RubyBundlerWorkflow;

impl WorkflowFactory for RubyBundlerWorkflow {
    fn name(&self) -> &str {
        "RubyBundlerWorkflow"
    }

    fn capability(&self) -> Capability {
        Capability::new("ruby", Some("bundler"), None)
    }

    fn supported_manifests(&self) -> &[&str] {
        &["Gemfile"]
    }

    fn default_build_dir(&self) -> BuildDirectory {
        BuildDirectory::Artifacts
    }

    fn resolvers(&self, ctx: &WorkflowContext) -> Vec<Box<dyn Resolver>> {
        vec![Box::new(
            PathResolver::new(BUNDLE, "Bundler", Arc::clone(&ctx.os))
                .with_names(ExecutableName::new(BUNDLE).with_windows_names(["bundler.bat"]))
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
        let bundler =
            SubprocessTool::new("Bundler", binaries.require(self.name(), BUNDLE)?, Arc::clone(os))
                .diagnostics_on(DiagnosticStream::Stdout);

        let mut actions: Vec<Box<dyn Action>> = vec![
            Box::new(CopySourceAction::new(
                &config.source_dir,
                &config.artifacts_dir,
                Arc::clone(os),
            )),
            Box::new(RubyBundleAction::new(&config.artifacts_dir, bundler.clone())),
            Box::new(RubyBundleDeploymentAction::new(&config.artifacts_dir, bundler)),
        ];

        if let Some(deps) = &config.dependencies_dir {
            actions.push(Box::new(CleanUpAction::new(deps, Arc::clone(os))));
            if config.combine_dependencies {
                actions.push(Box::new(CopyDependenciesAction::new(
                    &config.source_dir,
                    &config.artifacts_dir,
                    deps,
                    Arc::clone(os),
                )));
            } else {
                actions.push(Box::new(MoveDependenciesAction::new(
                    &config.source_dir,
                    &config.artifacts_dir,
                    deps,
                    Arc::clone(os),
                )));
            }
        }

        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{action_names, MemoryOs, MockProcessOutput};
    use crate::workflow::WorkflowConfig;

    fn ruby_os() -> MemoryOs {
        MemoryOs::new()
            .with_executable("/usr/bin/bundle")
            .with_path_dir("/usr/bin")
            .with_file("/src/handler.rb", "def handler(event:, context:); end")
            .with_file("/src/Gemfile", "source 'https://rubygems.org'")
    }

    fn config() -> WorkflowConfig {
        WorkflowConfig::new("/src", "/artifacts", "/scratch", "/src/Gemfile")
    }

    #[test]
    fn test_actions_without_dependencies_dir() {
        let os = Arc::new(ruby_os());
        let workflow = RubyBundlerWorkflow.create(config(), os).unwrap();
        assert_eq!(
            action_names(&workflow),
            vec!["CopySource", "RubyBundle", "RubyBundleDeployment"]
        );
    }

    #[test]
    fn test_build_in_source_request_is_ignored() {
        let os = Arc::new(ruby_os().with_default_output(MockProcessOutput::success("")));
        let mut config = config();
        config.build_in_source = Some(true);

        RubyBundlerWorkflow.create(config, os.clone()).unwrap().run().unwrap();

        assert!(os
            .commands()
            .iter()
            .all(|c| c.get_cwd() == Some(Path::new("/artifacts"))));
        assert!(os.file("/artifacts/handler.rb").is_some());
    }

    #[test]
    fn test_dependencies_dir_copy_or_move() {
        let os = Arc::new(ruby_os());
        let mut config = config();
        config.dependencies_dir = Some(PathBuf::from("/deps"));

        let workflow = RubyBundlerWorkflow.create(config.clone(), os.clone()).unwrap();
        assert_eq!(
            action_names(&workflow),
            vec![
                "CopySource",
                "RubyBundle",
                "RubyBundleDeployment",
                "CleanUp",
                "CopyDependencies"
            ]
        );

        config.combine_dependencies = false;
        let workflow = RubyBundlerWorkflow.create(config, os).unwrap();
        assert_eq!(action_names(&workflow).last().map(String::as_str), Some("MoveDependencies"));
    }

    #[test]
    fn test_runs_bundler_in_artifacts() {
        let os = Arc::new(ruby_os().with_default_output(MockProcessOutput::success("Bundle complete!")));

        RubyBundlerWorkflow.create(config(), os.clone()).unwrap().run().unwrap();

        assert!(os.file("/artifacts/handler.rb").is_some());
        let commands = os.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0].get_args(),
            ["install", "--without", "development", "test"]
        );
        assert_eq!(
            commands[1].get_args(),
            ["install", "--deployment", "--without", "development", "test"]
        );
        assert!(commands
            .iter()
            .all(|c| c.get_cwd() == Some(Path::new("/artifacts"))));
    }

    #[test]
    fn test_failure_reports_stdout() {
        let os = Arc::new(ruby_os().expect_prefix(
            "/usr/bin/bundle install --without",
            MockProcessOutput::with_output(
                7,
                "Could not find gem 'nokogiri' in any of the gem sources\n",
                "warning on stderr",
            ),
        ));

        let err = RubyBundlerWorkflow.create(config(), os.clone()).unwrap().run().unwrap_err();
        assert_eq!(
            err.to_string(),
            "RubyBundlerWorkflow:RubyBundle - Bundler Failed: Could not find gem 'nokogiri' in any of the gem sources"
        );
        assert_eq!(os.commands().len(), 1);
    }

    #[test]
    fn test_windows_uses_bundler_bat() {
        let os = Arc::new(
            MemoryOs::windows()
                .with_executable("C:/Ruby/bin/bundler.bat")
                .with_path_dir("C:/Ruby/bin"),
        );

        let workflow = RubyBundlerWorkflow.create(config(), os).unwrap();
        assert_eq!(workflow.actions().len(), 3);
    }

    #[test]
    fn test_missing_bundler() {
        let os = Arc::new(MemoryOs::new().with_path_dir("/usr/bin"));

        let err = RubyBundlerWorkflow.create(config(), os).unwrap_err();
        assert!(err.to_string().contains("No Bundler executable found!"));
    }
}
