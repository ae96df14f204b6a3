//! Go toolchain version probe.

use std::path::Path;
use std::sync::Arc;

use super::{ensure_executable, parse_version_flexible, Validated, Validator, ValidatorError};
use crate::core::Runtime;
use crate::util::os::OsUtils;
use crate::util::process::ProcessBuilder;

/// Oldest Go 1 release with module support.
const MIN_GO1_MINOR: u64 = 11;

/// Probes `go version` and warns unless the toolchain is Go 1.11 or newer.
#[derive(Debug, Clone)]
pub struct GoRuntimeValidator {
    runtime: Option<Runtime>,
    os: Arc<dyn OsUtils>,
}

impl GoRuntimeValidator {
    /// Create a new Go validator.
    pub fn new(runtime: Option<Runtime>, os: Arc<dyn OsUtils>) -> Self {
        GoRuntimeValidator { runtime, os }
    }

    /// Toolchain version, from output like `go version go1.21.3 linux/amd64`.
    pub fn version(&self, path: &Path) -> Option<semver::Version> {
        let output = self.os.run(&ProcessBuilder::new(path).arg("version")).ok()?;
        if !output.success() {
            return None;
        }
        let field = output.stdout.split_whitespace().nth(2)?;
        parse_version_flexible(field.strip_prefix("go")?)
    }
}

impl Validator for GoRuntimeValidator {
    fn validate(&self, path: &Path) -> Result<Validated, ValidatorError> {
        ensure_executable(self.os.as_ref(), path)?;

        if let Some(runtime) = &self.runtime {
            if runtime.as_str() != "go1.x" {
                tracing::warn!("'{}' runtime is not a supported Go runtime", runtime);
            }
        }

        let version = self.version(path);
        match &version {
            Some(v) if v.major == 1 && v.minor >= MIN_GO1_MINOR => {}
            Some(v) => tracing::warn!(
                "{} reports Go {}, builds for go1.x expect Go 1.{} or newer",
                path.display(),
                v,
                MIN_GO1_MINOR
            ),
            None => tracing::warn!(
                "{} failed to report a version with 'go version'; unable to check compatibility \
                 with go1.x",
                path.display()
            ),
        }

        Ok(Validated {
            path: path.to_path_buf(),
            version: version.map(|v| v.to_string()),
        })
    }
}
