//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the aggregation and health endpoints
//! - Wire up middleware (tracing, timeout, concurrency limit, request ID)
//! - Dispatch requests to the orchestrator
//! - Fold outcomes into per-dependency health and metrics
//!
//! # Design Decisions
//! - `/aggregate` answers 200 whenever the gateway itself functioned;
//!   per-dependency failure lives in the body, not the status line
//! - Non-200 is reserved for gateway-level faults (no route, timeout)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::aggregate::{serialize, Orchestrator, OrchestratorError};
use crate::config::GatewayConfig;
use crate::health::HealthRegistry;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub health: Arc<HealthRegistry>,
}

/// HTTP server for the aggregation gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    ///
    /// Fails only on misconfiguration (duplicate dependency names); that is
    /// a startup-fatal error, never a per-request one.
    pub fn new(config: GatewayConfig) -> Result<Self, OrchestratorError> {
        let orchestrator = Arc::new(Orchestrator::from_config(&config)?);
        let health = Arc::new(HealthRegistry::new(
            orchestrator.dependency_names(),
            config.health.clone(),
        ));

        let state = AppState {
            orchestrator,
            health,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/aggregate", get(aggregate_handler))
            .route("/healthz", get(healthz_handler))
            .with_state(state)
            .layer(GlobalConcurrencyLimitLayer::new(
                config.listener.max_connections,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Drains gracefully on Ctrl+C or the shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown broadcast received");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main aggregation handler.
///
/// Runs the fan-out under the request's key namespace and serializes the
/// assembled outcomes.
async fn aggregate_handler(State(state): State<AppState>, request: Request) -> impl IntoResponse {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        "Aggregating dependencies"
    );

    let result = state.orchestrator.handle(&request_id).await;
    state.health.observe(&result);
    for (name, health_state) in state.health.snapshot() {
        metrics::record_dependency_health(
            &name,
            health_state != crate::health::HealthState::Unhealthy,
        );
    }

    let body = serialize(&result);
    metrics::record_request(StatusCode::OK.as_u16(), start_time);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Body::from(body),
    )
}

/// Per-dependency health report.
async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.health.snapshot();

    let mut dependencies = Map::new();
    for (name, health_state) in &snapshot {
        dependencies.insert(name.clone(), json!(health_state.as_str()));
    }

    let status = if state.health.any_unhealthy() {
        "degraded"
    } else {
        "ok"
    };
    let body = json!({
        "status": status,
        "dependencies": Value::Object(dependencies),
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}
