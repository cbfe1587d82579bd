//! Concurrent fan-out over the configured dependencies.
//!
//! # Responsibilities
//! - Build each dependency's probe operation from its store binding
//! - Dispatch all probes concurrently, each under its own TimeoutGuard
//! - Join on every branch and assemble one outcome slot per dependency
//!
//! # Design Decisions
//! - Output order is configuration order, never completion order
//! - One branch's failure or timeout cannot abort or delay its siblings
//! - Probe keys are namespaced per request so concurrent requests never
//!   touch the same store keys

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use hyper_util::client::legacy::Client;
use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};

use crate::aggregate::guard::{TimeoutGuard, TimeoutPolicy};
use crate::aggregate::outcome::{AggregatedResult, DependencyOutcome};
use crate::config::{GatewayConfig, StoreKind};
use crate::observability::metrics;
use crate::stores::{
    HttpKeyValueStore, HttpObjectStore, HttpRelationalStore, KeyValueStore, ObjectStore,
    RelationalStore, StoreError,
};

/// Object-store previews are clipped to this many characters.
const OBJECT_PREVIEW_CHARS: usize = 32;

/// Error raised when the orchestrator cannot be constructed.
///
/// This is a startup-fatal misconfiguration, never a per-request condition.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("duplicate dependency name: {0}")]
    DuplicateDependency(String),
}

/// The store a dependency is bound to, or the reason it is not.
pub enum Binding {
    KeyValue(Arc<dyn KeyValueStore>),
    Relational(Arc<dyn RelationalStore>),
    Object(Arc<dyn ObjectStore>),
    Disabled { reason: String },
}

/// One configured dependency with its guard and binding.
pub struct Dependency {
    name: String,
    guard: TimeoutGuard,
    binding: Binding,
}

impl Dependency {
    pub fn new(name: impl Into<String>, policy: TimeoutPolicy, binding: Binding) -> Self {
        Self {
            name: name.into(),
            guard: TimeoutGuard::new(policy),
            binding,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Fans requests out to every configured dependency and joins the outcomes.
pub struct Orchestrator {
    dependencies: Vec<Dependency>,
    greeting: String,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| &d.name).collect::<Vec<_>>(),
            )
            .field("greeting", &self.greeting)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator from explicit dependencies.
    ///
    /// Rejects duplicate dependency names; every name becomes a response
    /// field, so collisions would silently drop a slot.
    pub fn new(
        dependencies: Vec<Dependency>,
        greeting: impl Into<String>,
    ) -> Result<Self, OrchestratorError> {
        let mut seen = std::collections::HashSet::new();
        for dep in &dependencies {
            if !seen.insert(dep.name.clone()) {
                return Err(OrchestratorError::DuplicateDependency(dep.name.clone()));
            }
        }
        Ok(Self {
            dependencies,
            greeting: greeting.into(),
        })
    }

    /// Create an orchestrator with HTTP store bindings from configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, OrchestratorError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let dependencies = config
            .dependencies
            .iter()
            .map(|dc| {
                let binding = if !dc.enabled {
                    Binding::Disabled {
                        reason: "disabled in configuration".to_string(),
                    }
                } else {
                    match dc.kind {
                        StoreKind::KeyValue => Binding::KeyValue(Arc::new(
                            HttpKeyValueStore::new(&dc.endpoint, client.clone()),
                        )),
                        StoreKind::Relational => Binding::Relational(Arc::new(
                            HttpRelationalStore::new(&dc.endpoint, client.clone()),
                        )),
                        StoreKind::Object => Binding::Object(Arc::new(HttpObjectStore::new(
                            &dc.endpoint,
                            client.clone(),
                        ))),
                    }
                };
                let policy = TimeoutPolicy {
                    deadline: dc.deadline(),
                    on_exceeded: dc.on_exceeded,
                };
                Dependency::new(dc.name.clone(), policy, binding)
            })
            .collect();

        Self::new(dependencies, config.greeting.clone())
    }

    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| d.name.clone()).collect()
    }

    /// Run every dependency's probe concurrently and collect all outcomes.
    ///
    /// `scope` namespaces the store keys for this request (typically the
    /// request id). The returned result holds exactly one slot per
    /// configured dependency, in configuration order.
    pub async fn handle(&self, scope: &str) -> AggregatedResult {
        let branches = self
            .dependencies
            .iter()
            .map(|dep| self.run_dependency(dep, scope));

        let outcomes = join_all(branches).await;

        let entries = self
            .dependencies
            .iter()
            .map(|d| d.name.clone())
            .zip(outcomes)
            .collect();
        AggregatedResult::new(entries)
    }

    async fn run_dependency(&self, dep: &Dependency, scope: &str) -> DependencyOutcome {
        let started = Instant::now();
        let outcome = match &dep.binding {
            Binding::Disabled { reason } => DependencyOutcome::Skipped(reason.clone()),
            Binding::KeyValue(store) => {
                dep.guard
                    .run(probe_key_value(store.as_ref(), scope, &self.greeting))
                    .await
            }
            Binding::Relational(store) => dep.guard.run(probe_relational(store.as_ref())).await,
            Binding::Object(store) => {
                dep.guard
                    .run(probe_object(store.as_ref(), scope, &self.greeting))
                    .await
            }
        };

        match &outcome {
            DependencyOutcome::Failure { kind, detail } => {
                tracing::warn!(
                    dependency = %dep.name,
                    kind = %kind,
                    detail = %detail,
                    elapsed = ?started.elapsed(),
                    "Dependency failed"
                );
            }
            _ => {
                tracing::debug!(
                    dependency = %dep.name,
                    status = outcome.status(),
                    elapsed = ?started.elapsed(),
                    "Dependency settled"
                );
            }
        }
        metrics::record_dependency(&dep.name, outcome.status(), started.elapsed());

        outcome
    }
}

/// Key-value probe: write the greeting, then read it back.
async fn probe_key_value(
    store: &dyn KeyValueStore,
    scope: &str,
    greeting: &str,
) -> Result<serde_json::Value, StoreError> {
    let key = format!("{}/greeting", scope);
    store.put(&key, greeting).await?;
    match store.get(&key).await? {
        Some(value) => Ok(serde_json::Value::String(value)),
        None => Err(StoreError::invalid_response("value missing after write")),
    }
}

/// Relational probe: ensure the probe table exists, insert, then count.
async fn probe_relational(store: &dyn RelationalStore) -> Result<serde_json::Value, StoreError> {
    store
        .exec("CREATE TABLE IF NOT EXISTS gateway_probe (id INTEGER PRIMARY KEY, v TEXT)")
        .await?;
    store
        .exec("INSERT INTO gateway_probe (v) VALUES ('ok')")
        .await?;
    let rows = store
        .query("SELECT count(*) AS c FROM gateway_probe")
        .await?;

    let count = rows
        .first()
        .and_then(|row| row.get("c"))
        .and_then(|c| c.as_u64())
        .ok_or_else(|| StoreError::invalid_response("count query returned no usable row"))?;
    Ok(serde_json::json!({ "rows": count }))
}

/// Object probe: write the greeting, read it back, report a bounded preview.
async fn probe_object(
    store: &dyn ObjectStore,
    scope: &str,
    greeting: &str,
) -> Result<serde_json::Value, StoreError> {
    let key = format!("{}/probe.txt", scope);
    store.put(&key, greeting.as_bytes().to_vec()).await?;
    match store.get(&key).await? {
        Some(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let preview: String = text.chars().take(OBJECT_PREVIEW_CHARS).collect();
            Ok(serde_json::Value::String(preview))
        }
        None => Err(StoreError::invalid_response("object missing after write")),
    }
}
