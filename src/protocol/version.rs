//! Protocol version negotiation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A `<major>.<minor>` version this build does not understand.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported Protocol Version: {0}")]
pub struct UnsupportedProtocolVersion(pub String);

/// Versions of the request envelope, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProtocolVersion {
    /// Assumed when a request does not declare a version.
    #[default]
    V0_1,
    V0_2,
    V0_3,
}

impl ProtocolVersion {
    /// The newest version this build speaks.
    pub const CURRENT: ProtocolVersion = ProtocolVersion::V0_3;

    pub const ALL: [ProtocolVersion; 3] = [
        ProtocolVersion::V0_1,
        ProtocolVersion::V0_2,
        ProtocolVersion::V0_3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::V0_1 => "0.1",
            ProtocolVersion::V0_2 => "0.2",
            ProtocolVersion::V0_3 => "0.3",
        }
    }

    /// Resolve a declared version, defaulting to the oldest when absent.
    pub fn negotiate(declared: Option<&str>) -> Result<Self, UnsupportedProtocolVersion> {
        match declared {
            None => {
                tracing::debug!(
                    "request does not declare a protocol version; assuming {}",
                    ProtocolVersion::default()
                );
                Ok(ProtocolVersion::default())
            }
            Some(v) => {
                let version = v.parse()?;
                tracing::debug!("request declares protocol version {}", version);
                Ok(version)
            }
        }
    }
}

static VERSION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\.([0-9]+)$").ok());

impl FromStr for ProtocolVersion {
    type Err = UnsupportedProtocolVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || UnsupportedProtocolVersion(s.to_string());

        let caps = VERSION_PATTERN
            .as_ref()
            .and_then(|re| re.captures(s))
            .ok_or_else(unsupported)?;
        let major: u64 = caps[1].parse().map_err(|_| unsupported())?;
        let minor: u64 = caps[2].parse().map_err(|_| unsupported())?;

        match (major, minor) {
            (0, 1) => Ok(ProtocolVersion::V0_1),
            (0, 2) => Ok(ProtocolVersion::V0_2),
            (0, 3) => Ok(ProtocolVersion::V0_3),
            _ => Err(unsupported()),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
