//! Deadline enforcement around store operations.

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::aggregate::outcome::DependencyOutcome;
use crate::stores::{DependencyErrorKind, StoreError};

/// Per-dependency deadline policy, fixed at orchestrator construction.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    /// Maximum duration the operation may run.
    pub deadline: Duration,
    /// Failure kind recorded when the deadline fires.
    pub on_exceeded: DependencyErrorKind,
}

/// Races an operation against its policy's deadline.
///
/// Everything that can happen to the operation is converted into a
/// `DependencyOutcome` value here; nothing escapes this boundary. A fired
/// deadline cancels the operation by dropping its future, which affects
/// only this branch.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    policy: TimeoutPolicy,
}

impl TimeoutGuard {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    pub async fn run<F>(&self, operation: F) -> DependencyOutcome
    where
        F: Future<Output = Result<serde_json::Value, StoreError>>,
    {
        match time::timeout(self.policy.deadline, operation).await {
            Ok(Ok(value)) => DependencyOutcome::Success(value),
            Ok(Err(e)) => DependencyOutcome::Failure {
                kind: e.kind,
                detail: e.detail,
            },
            Err(_) => DependencyOutcome::Failure {
                kind: self.policy.on_exceeded,
                detail: "deadline exceeded".to_string(),
            },
        }
    }
}
