//! JSON-RPC request protocol.
//!
//! One request per invocation. [`ProtocolHandler::handle`] decodes the
//! envelope, checks the declared protocol version, dispatches the single
//! `LambdaBuilder.build` method and encodes the outcome. Every failure is
//! reported inside the response body with a fixed code:
//!
//! | Code     | Meaning                                               |
//! |----------|-------------------------------------------------------|
//! | `-32700` | request is not JSON                                   |
//! | `-32600` | request is JSON but not a valid build request         |
//! | `-32601` | method other than `LambdaBuilder.build`               |
//! | `505`    | unsupported protocol version                          |
//! | `400`    | the build itself failed                               |
//! | `500`    | the build aborted unexpectedly                        |

mod transport;
mod version;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::builder::LambdaBuilder;
use crate::core::{Architecture, Capability, Runtime};
use crate::registry::Registry;
use crate::util::os::OsUtils;
use crate::workflow::{Options, WorkflowConfig};

pub use transport::serve;
pub use version::{ProtocolVersion, UnsupportedProtocolVersion};

/// The only method this protocol serves.
pub const BUILD_METHOD: &str = "LambdaBuilder.build";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const UNSUPPORTED_PROTOCOL_VERSION: i32 = 505;
pub const BUILD_FAILED: i32 = 400;
pub const INTERNAL_ERROR: i32 = 500;

/// Successful build payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub artifacts_dir: String,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ErrorObject {
    /// Create a new error object with empty `data`.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        ErrorObject {
            code,
            message: message.into(),
            data: Value::Object(Map::new()),
        }
    }
}

/// Response envelope. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BuildResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(id: Value, artifacts_dir: impl Into<String>) -> Self {
        Response {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(BuildResult {
                artifacts_dir: artifacts_dir.into(),
            }),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Response {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject::new(code, message)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Process exit code for this response.
    ///
    /// Only a request that could not be framed at all exits non-zero.
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            Some(e) if e.code == PARSE_ERROR => 1,
            _ => 0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `params` of a build request.
///
/// Unknown keys (`optimizations`, `experimental_flags`, ...) are accepted
/// and ignored.
#[derive(Debug, Deserialize)]
struct BuildParams {
    capability: Capability,
    source_dir: PathBuf,
    artifacts_dir: PathBuf,
    scratch_dir: PathBuf,
    manifest_path: PathBuf,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    architecture: Option<String>,
    #[serde(default)]
    options: Option<Options>,
    #[serde(default)]
    executable_search_paths: Option<Vec<PathBuf>>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    dependencies_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    combine_dependencies: bool,
    #[serde(default)]
    is_building_layer: bool,
    #[serde(default)]
    build_in_source: Option<bool>,
}

/// Serves build requests against a registry.
#[derive(Debug)]
pub struct ProtocolHandler {
    registry: Registry,
    os: Arc<dyn OsUtils>,
    extra_search_paths: Vec<PathBuf>,
}

impl ProtocolHandler {
    /// Create a new handler.
    pub fn new(registry: Registry, os: Arc<dyn OsUtils>) -> Self {
        ProtocolHandler {
            registry,
            os,
            extra_search_paths: Vec::new(),
        }
    }

    /// Search paths appended after each request's own `executable_search_paths`.
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_search_paths.extend(paths);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one raw request.
    pub fn handle(&self, input: &str) -> Response {
        let response = self.dispatch(input);
        if let Some(error) = &response.error {
            tracing::error!("Builder request failed ({}): {}", error.code, error.message);
        }
        response
    }

    fn dispatch(&self, input: &str) -> Response {
        let request: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(e) => return Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)),
        };
        let Some(request) = request.as_object() else {
            return Response::error(Value::Null, INVALID_REQUEST, "Invalid Request: expected a JSON object");
        };

        let id = request.get("id").cloned().unwrap_or(Value::Null);

        let params = request.get("params").and_then(Value::as_object);

        let declared = params.and_then(|p| {
            p.get("__protocol_version")
                .or_else(|| p.get("protocol_version"))
        });
        let declared = match declared {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Response::error(
                    id,
                    UNSUPPORTED_PROTOCOL_VERSION,
                    format!("Unsupported Protocol Version: {}", other),
                )
            }
        };
        let version = match ProtocolVersion::negotiate(declared) {
            Ok(v) => v,
            Err(e) => return Response::error(id, UNSUPPORTED_PROTOCOL_VERSION, e.to_string()),
        };

        let Some(method) = request.get("method").and_then(Value::as_str) else {
            return Response::error(id, INVALID_REQUEST, "Invalid Request: missing method");
        };
        if method != BUILD_METHOD {
            tracing::debug!("rejecting method '{}'", method);
            return Response::error(id, METHOD_NOT_FOUND, "Method unavailable");
        }

        let Some(params) = params else {
            return Response::error(id, INVALID_REQUEST, "Invalid Request: missing params");
        };

        let params: BuildParams = match serde_json::from_value(Value::Object(params.clone())) {
            Ok(p) => p,
            Err(e) => {
                return Response::error(id, INVALID_REQUEST, format!("Invalid Request: {}", e))
            }
        };

        self.build(id, version, params)
    }

    fn build(&self, id: Value, version: ProtocolVersion, params: BuildParams) -> Response {
        let config = match self.workflow_config(&params) {
            Ok(c) => c,
            Err(message) => return Response::error(id, BUILD_FAILED, message),
        };

        tracing::debug!(
            "building capability ({}) with protocol {}",
            params.capability,
            version
        );

        let builder = match LambdaBuilder::new(params.capability, &self.registry) {
            Ok(b) => b,
            Err(e) => return Response::error(id, BUILD_FAILED, e.to_string()),
        };

        let os = Arc::clone(&self.os);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| builder.build(config, os)));
        match outcome {
            Ok(Ok(artifacts_dir)) => {
                Response::success(id, artifacts_dir.to_string_lossy().into_owned())
            }
            Ok(Err(e)) => Response::error(id, BUILD_FAILED, e.to_string()),
            Err(_) => Response::error(id, INTERNAL_ERROR, "Internal error: the build aborted"),
        }
    }

    fn workflow_config(&self, params: &BuildParams) -> Result<WorkflowConfig, String> {
        let runtime = params
            .runtime
            .as_deref()
            .map(str::parse::<Runtime>)
            .transpose()
            .map_err(|e| e.to_string())?;
        let architecture = params
            .architecture
            .as_deref()
            .map(str::parse::<Architecture>)
            .transpose()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();

        let mut search_paths = params.executable_search_paths.clone().unwrap_or_default();
        search_paths.extend(self.extra_search_paths.iter().cloned());

        let mut config = WorkflowConfig::new(
            &params.source_dir,
            &params.artifacts_dir,
            &params.scratch_dir,
            &params.manifest_path,
        );
        config.runtime = runtime;
        config.architecture = architecture;
        config.options = params.options.clone().unwrap_or_default();
        config.executable_search_paths = search_paths;
        config.mode = params.mode.clone();
        config.dependencies_dir = params.dependencies_dir.clone();
        config.combine_dependencies = params.combine_dependencies;
        config.is_building_layer = params.is_building_layer;
        config.build_in_source = params.build_in_source;
        Ok(config)
    }
}
