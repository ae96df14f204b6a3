//! Test fixtures for common test scenarios.
//!
//! Recording actions for pipeline tests, a trivial "hello" workflow for
//! registry and protocol tests, and request builders.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::actions::{Action, ActionError, Purpose};
use crate::core::Capability;
use crate::util::os::OsUtils;
use crate::workflow::{Binaries, Workflow, WorkflowContext, WorkflowError, WorkflowFactory};

/// Shared record of which actions ran, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog(Arc<Mutex<Vec<String>>>);

impl RecordingLog {
    fn push(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }

    /// Names of the actions that executed.
    pub fn names(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Ok,
    Fail(String),
    Io,
}

/// An action that records its execution and then succeeds or fails on cue.
#[derive(Debug)]
pub struct RecordingAction {
    name: String,
    outcome: Outcome,
    log: RecordingLog,
}

impl RecordingAction {
    /// An action that succeeds.
    pub fn ok(name: &str, log: &RecordingLog) -> Box<dyn Action> {
        Box::new(RecordingAction {
            name: name.to_string(),
            outcome: Outcome::Ok,
            log: log.clone(),
        })
    }

    /// An action that fails with a typed error.
    pub fn failing(name: &str, reason: &str, log: &RecordingLog) -> Box<dyn Action> {
        Box::new(RecordingAction {
            name: name.to_string(),
            outcome: Outcome::Fail(reason.to_string()),
            log: log.clone(),
        })
    }

    /// An action that fails with an unexpected I/O error.
    pub fn io_error(name: &str, log: &RecordingLog) -> Box<dyn Action> {
        Box::new(RecordingAction {
            name: name.to_string(),
            outcome: Outcome::Io,
            log: log.clone(),
        })
    }
}

impl Action for RecordingAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records that it ran"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.log.push(&self.name);
        match &self.outcome {
            Outcome::Ok => Ok(()),
            Outcome::Fail(reason) => Err(ActionError::failed(reason.clone())),
            Outcome::Io => Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into()),
        }
    }
}

/// Writes `hello.txt` containing `Hello World` into the artifacts directory.
#[derive(Debug)]
pub struct WriteHelloAction {
    artifacts_dir: PathBuf,
    os: Arc<dyn OsUtils>,
}

impl Action for WriteHelloAction {
    fn name(&self) -> &str {
        "WriteHelloAction"
    }

    fn description(&self) -> &str {
        "Writes a hello.txt file"
    }

    fn purpose(&self) -> Purpose {
        Purpose::CompileSource
    }

    fn execute(&self) -> Result<(), ActionError> {
        self.os
            .write_file(&self.artifacts_dir.join("hello.txt"), b"Hello World")?;
        Ok(())
    }
}

/// Workflow for `{python, test, test}` running a single [`WriteHelloAction`].
#[derive(Debug, Default)]
pub struct HelloWorkflow;

impl WorkflowFactory for HelloWorkflow {
    fn name(&self) -> &str {
        "HelloWorkflow"
    }

    fn capability(&self) -> Capability {
        Capability::new("python", Some("test"), Some("test"))
    }

    fn actions(
        &self,
        ctx: &WorkflowContext,
        _binaries: &Binaries,
    ) -> Result<Vec<Box<dyn Action>>, WorkflowError> {
        Ok(vec![Box::new(WriteHelloAction {
            artifacts_dir: ctx.config.artifacts_dir.clone(),
            os: ctx.os.clone(),
        })])
    }
}

/// A build request envelope for `capability` writing into `/artifacts`.
pub fn build_request(capability: Value, protocol_version: Option<&str>) -> Value {
    let mut params = json!({
        "capability": capability,
        "source_dir": "/source",
        "artifacts_dir": "/artifacts",
        "scratch_dir": "/scratch",
        "manifest_path": "/source/manifest",
        "runtime": "python3.12",
        "options": {},
    });
    if let Some(v) = protocol_version {
        params["__protocol_version"] = json!(v);
    }
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "LambdaBuilder.build",
        "params": params,
    })
}

/// The `{python, test, test}` capability as JSON.
pub fn hello_capability() -> Value {
    json!({
        "language": "python",
        "dependency_manager": "test",
        "application_framework": "test",
    })
}

/// Names of a workflow's actions, in execution order.
pub fn action_names(workflow: &Workflow) -> Vec<String> {
    workflow
        .actions()
        .iter()
        .map(|a| a.name().to_string())
        .collect()
}
