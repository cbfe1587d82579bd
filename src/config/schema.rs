//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::stores::DependencyErrorKind;

/// Root configuration for the aggregation gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Backing store dependencies, in the order they appear in responses.
    pub dependencies: Vec<DependencyConfig>,

    /// Whole-request timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-dependency health thresholds.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Payload written into the stores by the probe operations.
    pub greeting: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            dependencies: Vec::new(),
            timeouts: TimeoutConfig::default(),
            health: HealthConfig::default(),
            observability: ObservabilityConfig::default(),
            greeting: "Hi".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// The store contract a configured dependency speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Key-value store (put/get string values).
    KeyValue,
    /// Relational store (exec/query SQL statements).
    Relational,
    /// Object store (put/get byte blobs).
    Object,
}

/// One backing store dependency.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DependencyConfig {
    /// Unique dependency name; becomes the response field name.
    pub name: String,

    /// Which store contract this dependency speaks.
    pub kind: StoreKind,

    /// Base endpoint URL (e.g., "http://127.0.0.1:9001").
    pub endpoint: String,

    /// Deadline for this dependency's whole probe operation.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Failure kind recorded when the deadline fires.
    #[serde(default = "default_on_exceeded")]
    pub on_exceeded: DependencyErrorKind,

    /// Disabled dependencies keep their response slot as "skipped".
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DependencyConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn default_deadline_ms() -> u64 {
    500
}

fn default_on_exceeded() -> DependencyErrorKind {
    DependencyErrorKind::Timeout
}

fn default_enabled() -> bool {
    true
}

/// Timeout configuration for the inbound surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Per-dependency health tracking thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Consecutive failures before a dependency is marked unhealthy.
    pub unhealthy_threshold: u32,

    /// Consecutive successes before a dependency is marked healthy.
    pub healthy_threshold: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            unhealthy_threshold: 3,
            healthy_threshold: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
