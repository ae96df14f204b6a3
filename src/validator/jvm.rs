//! JVM version probe for Java build tools.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::{ensure_executable, parse_major_version, Validated, Validator, ValidatorError};
use crate::core::Runtime;
use crate::util::os::OsUtils;
use crate::util::process::ProcessBuilder;

/// Which build tool's `-version` output to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JvmFlavor {
    /// `Java version: 11.0.2, vendor: ...`
    Maven,
    /// `JVM:          11.0.2 (Oracle Corporation 11.0.2+9)`
    Gradle,
}

impl JvmFlavor {
    fn line_prefix(&self) -> &'static str {
        match self {
            JvmFlavor::Maven => "Java version",
            JvmFlavor::Gradle => "JVM",
        }
    }

    fn pattern(&self) -> Option<&'static Regex> {
        match self {
            JvmFlavor::Maven => MAVEN_JVM_PATTERN.as_ref(),
            JvmFlavor::Gradle => GRADLE_JVM_PATTERN.as_ref(),
        }
    }

    fn compatibility_hint(&self) -> &'static str {
        match self {
            JvmFlavor::Maven => "'maven.compiler.target' in Maven",
            JvmFlavor::Gradle => "'targetCompatibility' in Gradle",
        }
    }
}

static MAVEN_JVM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Java version:\s+([\d\.]+)").ok());

static GRADLE_JVM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"JVM:\s+(\d[\d\.]*)").ok());

/// Probes `<tool> -version` and warns when the JVM is newer than the runtime.
#[derive(Debug, Clone)]
pub struct JvmValidator {
    flavor: JvmFlavor,
    runtime: Option<Runtime>,
    os: Arc<dyn OsUtils>,
}

impl JvmValidator {
    /// Create a new JVM validator.
    pub fn new(flavor: JvmFlavor, runtime: Option<Runtime>, os: Arc<dyn OsUtils>) -> Self {
        JvmValidator {
            flavor,
            runtime,
            os,
        }
    }

    /// Major JVM version reported by the tool, or `None` when the probe fails.
    pub fn major_version(&self, path: &Path) -> Option<String> {
        let output = self
            .os
            .run(&ProcessBuilder::new(path).arg("-version"))
            .ok()?;
        if !output.success() {
            return None;
        }

        let line = output
            .stdout
            .lines()
            .find(|l| l.trim_start().starts_with(self.flavor.line_prefix()))?;
        let version = self.flavor.pattern()?.captures(line)?.get(1)?.as_str();
        parse_major_version(version)
    }
}

impl Validator for JvmValidator {
    fn validate(&self, path: &Path) -> Result<Validated, ValidatorError> {
        ensure_executable(self.os.as_ref(), path)?;

        let jvm_major = self.major_version(path);
        let target = self.runtime.as_ref().and_then(Runtime::java_major);

        match (&jvm_major, target) {
            (Some(jvm), Some(target)) => {
                if jvm.parse::<u32>().map(|v| v > target).unwrap_or(false) {
                    tracing::warn!(
                        "{} is using a JVM with major version {} which is newer than {} that is \
                         supported by AWS Lambda. The compiled function code may not run in AWS \
                         Lambda unless the project has been configured to be compatible with \
                         Java {} using {}.",
                        path.display(),
                        jvm,
                        target,
                        target,
                        self.flavor.compatibility_hint()
                    );
                }
            }
            (Some(_), None) => {}
            (None, _) => {
                tracing::warn!(
                    "{} failed to return a version string using the '-version' option. The \
                     workflow is unable to check that the version of the JVM used is compatible \
                     with AWS Lambda.",
                    path.display()
                );
            }
        }

        Ok(Validated {
            path: path.to_path_buf(),
            version: jvm_major,
        })
    }
}
