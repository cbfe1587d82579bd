//! Typed store failure taxonomy.

use serde::{Deserialize, Serialize};

/// Category of a dependency failure.
///
/// Every failed dependency outcome carries exactly one of these, so callers
/// get machine-checkable categories instead of free-text messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyErrorKind {
    /// Store unreachable or misconfigured.
    Unavailable,
    /// Deadline exceeded before the operation settled.
    Timeout,
    /// Store answered, but with malformed or unexpected data.
    InvalidResponse,
}

impl DependencyErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl std::fmt::Display for DependencyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned by store client operations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct StoreError {
    pub kind: DependencyErrorKind,
    pub detail: String,
}

impl StoreError {
    pub fn unavailable(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: DependencyErrorKind::Unavailable,
            detail: detail.to_string(),
        }
    }

    pub fn invalid_response(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: DependencyErrorKind::InvalidResponse,
            detail: detail.to_string(),
        }
    }
}
