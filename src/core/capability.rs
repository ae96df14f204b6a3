//! Capability: the key a workflow is registered under.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The (language, dependency manager, framework) triple identifying a build strategy.
///
/// An absent `application_framework` on a *registered* capability is a
/// wildcard that matches any requested framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub language: String,
    #[serde(default)]
    pub dependency_manager: Option<String>,
    #[serde(default)]
    pub application_framework: Option<String>,
}

impl Capability {
    /// Create a new capability.
    pub fn new(
        language: impl Into<String>,
        dependency_manager: Option<&str>,
        application_framework: Option<&str>,
    ) -> Self {
        Capability {
            language: language.into(),
            dependency_manager: dependency_manager.map(str::to_string),
            application_framework: application_framework.map(str::to_string),
        }
    }

    /// Whether this registered capability serves the `requested` one.
    ///
    /// Language and dependency manager must be equal. The framework must be
    /// equal unless this capability leaves it open.
    pub fn matches(&self, requested: &Capability) -> bool {
        self.language == requested.language
            && self.dependency_manager == requested.dependency_manager
            && (self.application_framework.is_none()
                || self.application_framework == requested.application_framework)
    }

    /// Whether the framework is left open.
    pub fn is_framework_wildcard(&self) -> bool {
        self.application_framework.is_none()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.language,
            self.dependency_manager.as_deref().unwrap_or("None"),
            self.application_framework.as_deref().unwrap_or("None")
        )
    }
}
