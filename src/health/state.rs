//! Per-dependency health state.
//!
//! # Responsibilities
//! - Track each dependency's health across requests
//! - Apply consecutive success/failure thresholds before transitions
//! - Expose a snapshot for the health endpoint

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::aggregate::{AggregatedResult, DependencyOutcome};
use crate::config::HealthConfig;

/// Health state enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Health tracking for a single dependency.
#[derive(Debug)]
pub struct DependencyHealth {
    name: String,
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
}

impl DependencyHealth {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> HealthState {
        self.state.load(Ordering::Relaxed).into()
    }

    /// Unknown counts as healthy; only confirmed failure streaks demote.
    pub fn is_healthy(&self) -> bool {
        self.state() != HealthState::Unhealthy
    }

    /// Record a successful outcome.
    pub fn record_success(&self, healthy_threshold: usize) {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.state.load(Ordering::Relaxed) == HealthState::Healthy as u8 {
            return;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= healthy_threshold {
            self.state.store(HealthState::Healthy as u8, Ordering::Relaxed);
            tracing::info!(dependency = %self.name, "Dependency marked healthy");
        }
    }

    /// Record a failed outcome.
    pub fn record_failure(&self, unhealthy_threshold: usize) {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        if self.state.load(Ordering::Relaxed) == HealthState::Unhealthy as u8 {
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= unhealthy_threshold {
            self.state
                .store(HealthState::Unhealthy as u8, Ordering::Relaxed);
            tracing::warn!(dependency = %self.name, "Dependency marked unhealthy");
        }
    }
}

/// Health entries for every configured dependency, in configuration order.
#[derive(Debug)]
pub struct HealthRegistry {
    entries: Vec<Arc<DependencyHealth>>,
    config: HealthConfig,
}

impl HealthRegistry {
    pub fn new(names: impl IntoIterator<Item = String>, config: HealthConfig) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|n| Arc::new(DependencyHealth::new(n)))
                .collect(),
            config,
        }
    }

    /// Fold a request's outcomes into the per-dependency state machines.
    ///
    /// Skipped outcomes carry no signal and leave state untouched.
    pub fn observe(&self, result: &AggregatedResult) {
        for (name, outcome) in result.entries() {
            let Some(entry) = self.get(name) else {
                continue;
            };
            match outcome {
                DependencyOutcome::Success(_) => {
                    entry.record_success(self.config.healthy_threshold as usize)
                }
                DependencyOutcome::Failure { .. } => {
                    entry.record_failure(self.config.unhealthy_threshold as usize)
                }
                DependencyOutcome::Skipped(_) => {}
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<DependencyHealth>> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Current state of every dependency, in configuration order.
    pub fn snapshot(&self) -> Vec<(String, HealthState)> {
        self.entries
            .iter()
            .map(|e| (e.name().to_string(), e.state()))
            .collect()
    }

    pub fn any_unhealthy(&self) -> bool {
        self.entries.iter().any(|e| !e.is_healthy())
    }
}
