//! Per-dependency outcomes and the assembled result.

use crate::stores::DependencyErrorKind;

/// The settled result of one dependency's probe operation.
///
/// Immutable once constructed; one instance per dependency per request.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyOutcome {
    /// The operation completed and produced a value.
    Success(serde_json::Value),
    /// The operation failed with a typed cause.
    Failure {
        kind: DependencyErrorKind,
        detail: String,
    },
    /// The dependency was not attempted.
    Skipped(String),
}

impl DependencyOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failure { .. } => "failure",
            Self::Skipped(_) => "skipped",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Outcomes for every configured dependency, in configuration order.
///
/// Always holds exactly one entry per configured dependency; a slot is never
/// dropped, whatever happened to its operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    entries: Vec<(String, DependencyOutcome)>,
}

impl AggregatedResult {
    pub fn new(entries: Vec<(String, DependencyOutcome)>) -> Self {
        Self { entries }
    }

    /// Overall health: true iff no dependency failed.
    ///
    /// Skipped dependencies do not count against overall health.
    pub fn ok(&self) -> bool {
        !self.entries.iter().any(|(_, outcome)| outcome.is_failure())
    }

    pub fn entries(&self) -> &[(String, DependencyOutcome)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DependencyOutcome> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }
}
