//! Per-build inputs handed to a workflow.

use std::path::PathBuf;

use serde_json::Value;

use crate::core::{Architecture, Runtime};

/// Free-form, workflow-specific options.
pub type Options = serde_json::Map<String, Value>;

/// Everything one build needs to know.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub source_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub runtime: Option<Runtime>,
    pub architecture: Architecture,
    pub options: Options,
    /// Searched before the system `PATH`, in order.
    pub executable_search_paths: Vec<PathBuf>,
    /// Build mode, e.g. `debug` or `release`.
    pub mode: Option<String>,
    /// Separate directory that receives dependencies.
    pub dependencies_dir: Option<PathBuf>,
    /// Copy dependencies (true) or move them (false) into `dependencies_dir`.
    pub combine_dependencies: bool,
    pub is_building_layer: bool,
    pub build_in_source: Option<bool>,
}

impl WorkflowConfig {
    /// Create a config with the four required paths and defaults for the rest.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        artifacts_dir: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        WorkflowConfig {
            source_dir: source_dir.into(),
            artifacts_dir: artifacts_dir.into(),
            scratch_dir: scratch_dir.into(),
            manifest_path: manifest_path.into(),
            runtime: None,
            architecture: Architecture::default(),
            options: Options::new(),
            executable_search_paths: Vec::new(),
            mode: None,
            dependencies_dir: None,
            combine_dependencies: true,
            is_building_layer: false,
            build_in_source: None,
        }
    }

    /// Set the target runtime.
    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Set a single option.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// String-valued option, if present and non-empty.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Boolean option; absent or non-boolean values read as `false`.
    pub fn option_bool(&self, key: &str) -> bool {
        self.options
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the build mode is debug.
    pub fn is_debug(&self) -> bool {
        self.mode
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case("debug"))
            .unwrap_or(false)
    }
}
