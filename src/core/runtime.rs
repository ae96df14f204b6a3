//! Target runtimes and instruction set architectures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every runtime a build may target.
pub const SUPPORTED_RUNTIMES: &[&str] = &[
    "nodejs16.x",
    "nodejs18.x",
    "nodejs20.x",
    "nodejs22.x",
    "nodejs24.x",
    "python3.8",
    "python3.9",
    "python3.10",
    "python3.11",
    "python3.12",
    "python3.13",
    "python3.14",
    "ruby3.2",
    "ruby3.3",
    "ruby3.4",
    "java8",
    "java11",
    "java17",
    "java21",
    "java25",
    "go1.x",
    "dotnet6",
    "dotnet8",
    "dotnet10",
    "provided",
    "provided.al2",
    "provided.al2023",
];

/// Error returned for a runtime outside [`SUPPORTED_RUNTIMES`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Runtime '{0}' is not supported")]
pub struct UnsupportedRuntime(pub String);

/// Error returned for an architecture other than `x86_64` or `arm64`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Architecture '{0}' is not supported, valid values: x86_64, arm64")]
pub struct UnsupportedArchitecture(pub String);

/// A validated target runtime, e.g. `java11`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Runtime(String);

impl Runtime {
    /// The runtime identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a Java runtime.
    pub fn is_java(&self) -> bool {
        self.java_major().is_some()
    }

    /// Java major version for `javaN` runtimes.
    pub fn java_major(&self) -> Option<u32> {
        self.0.strip_prefix("java")?.parse().ok()
    }
}

impl FromStr for Runtime {
    type Err = UnsupportedRuntime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if SUPPORTED_RUNTIMES.contains(&s) {
            Ok(Runtime(s.to_string()))
        } else {
            Err(UnsupportedRuntime(s.to_string()))
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instruction set architecture of the deployed function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Architecture {
    /// The `GOARCH` value for this architecture.
    pub fn go_arch(&self) -> &'static str {
        match self {
            Architecture::X86_64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl FromStr for Architecture {
    type Err = UnsupportedArchitecture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Architecture::X86_64),
            "arm64" => Ok(Architecture::Arm64),
            _ => Err(UnsupportedArchitecture(s.to_string())),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm64 => write!(f, "arm64"),
        }
    }
}
