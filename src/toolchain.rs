//! Thin wrapper around a toolchain executable.
//!
//! Workflow actions never spawn processes themselves; they hold a
//! [`SubprocessTool`] built from a resolved [`BinaryPath`] and call
//! [`SubprocessTool::run`].

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::core::BinaryPath;
use crate::util::os::OsUtils;
use crate::util::process::ProcessBuilder;

/// Error from running a toolchain executable.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool ran and exited non-zero. `message` is its own diagnostic output.
    #[error("{tool} Failed: {message}")]
    Execution { tool: String, message: String },

    /// The tool could not be started at all.
    #[error("{tool} Failed: could not run {command}: {source}")]
    Spawn {
        tool: String,
        command: String,
        source: io::Error,
    },
}

/// Which output stream carries a tool's error diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStream {
    Stderr,
    /// Maven and Bundler report failures on stdout.
    Stdout,
}

/// A toolchain executable bound to a resolved path.
#[derive(Debug, Clone)]
pub struct SubprocessTool {
    tool: String,
    binary: BinaryPath,
    diagnostics: DiagnosticStream,
    log_output: bool,
    os: Arc<dyn OsUtils>,
}

impl SubprocessTool {
    /// Create a tool named `tool` (e.g. `Maven`) that runs `binary`.
    pub fn new(tool: &str, binary: BinaryPath, os: Arc<dyn OsUtils>) -> Self {
        SubprocessTool {
            tool: tool.to_string(),
            binary,
            diagnostics: DiagnosticStream::Stderr,
            log_output: false,
            os,
        }
    }

    /// Read failure diagnostics from `stream` instead of stderr.
    pub fn diagnostics_on(mut self, stream: DiagnosticStream) -> Self {
        self.diagnostics = stream;
        self
    }

    /// Log each stdout line at info level.
    pub fn log_output(mut self, enabled: bool) -> Self {
        self.log_output = enabled;
        self
    }

    /// The binary this tool runs.
    pub fn binary(&self) -> &BinaryPath {
        &self.binary
    }

    /// Run the tool and return its stdout.
    ///
    /// `env`, when given, replaces the inherited environment entirely.
    pub fn run<I, S>(
        &self,
        args: I,
        cwd: Option<&Path>,
        env: Option<&HashMap<String, String>>,
    ) -> Result<String, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = ProcessBuilder::new(self.binary.path())
            .args(args)
            .log_output(self.log_output);
        if let Some(cwd) = cwd {
            cmd = cmd.cwd(cwd);
        }
        if let Some(env) = env {
            cmd = cmd.env_replace(env.clone());
        }

        tracing::debug!("{} command: {}", self.tool, cmd.display_command());

        let output = self.os.run(&cmd).map_err(|source| ToolError::Spawn {
            tool: self.tool.clone(),
            command: cmd.display_command(),
            source,
        })?;

        if !output.success() {
            let diagnostic = match self.diagnostics {
                DiagnosticStream::Stderr => &output.stderr,
                DiagnosticStream::Stdout => &output.stdout,
            };
            return Err(ToolError::Execution {
                tool: self.tool.clone(),
                message: diagnostic.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
