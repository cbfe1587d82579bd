//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use edge_gateway::config::{DependencyConfig, GatewayConfig, StoreKind};
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::stores::DependencyErrorKind;
use edge_gateway::GatewayServer;

/// Behavior knobs for a mock store.
#[derive(Clone, Default)]
pub struct MockStoreOptions {
    /// When set, `/query` always reports this count instead of counting
    /// actual inserts.
    pub fixed_count: Option<u64>,
    /// When non-zero, every response is delayed by a random duration up
    /// to this many milliseconds.
    pub max_jitter_ms: u64,
}

#[derive(Clone, Default)]
struct MockStoreState {
    options: MockStoreOptions,
    kv: Arc<Mutex<HashMap<String, String>>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    inserted_rows: Arc<Mutex<u64>>,
}

/// Start an in-process store speaking all three store protocols.
///
/// Binds an ephemeral port and returns its address.
pub async fn start_mock_store() -> SocketAddr {
    start_mock_store_with(MockStoreOptions::default()).await
}

/// Mock store whose responses are fully deterministic across requests.
pub async fn start_fixed_store() -> SocketAddr {
    start_mock_store_with(MockStoreOptions {
        fixed_count: Some(1),
        max_jitter_ms: 0,
    })
    .await
}

/// Deterministic-value store with randomized response latency.
pub async fn start_jittery_store(max_jitter_ms: u64) -> SocketAddr {
    start_mock_store_with(MockStoreOptions {
        fixed_count: Some(1),
        max_jitter_ms,
    })
    .await
}

pub async fn start_mock_store_with(options: MockStoreOptions) -> SocketAddr {
    let state = MockStoreState {
        options,
        ..Default::default()
    };

    let router = Router::new()
        .route("/kv/{*key}", axum::routing::put(put_kv).get(get_kv))
        .route("/exec", post(exec_statement))
        .route("/query", post(query_statement))
        .route(
            "/objects/{*key}",
            axum::routing::put(put_object).get(get_object),
        )
        .with_state(state);

    serve_router(router).await
}

/// Start a store that answers every request with the given status.
pub async fn start_failing_store(status: u16) -> SocketAddr {
    let status = StatusCode::from_u16(status).unwrap();
    let router = Router::new().fallback(move || async move { status });
    serve_router(router).await
}

/// Start a store that accepts connections but never responds.
pub async fn start_hanging_store() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        let _hold = socket;
                        std::future::pending::<()>().await
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

async fn maybe_delay(state: &MockStoreState) {
    if state.options.max_jitter_ms > 0 {
        use rand::Rng;
        let ms = rand::thread_rng().gen_range(0..state.options.max_jitter_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

async fn put_kv(
    State(state): State<MockStoreState>,
    Path(key): Path<String>,
    body: String,
) -> impl IntoResponse {
    maybe_delay(&state).await;
    state.kv.lock().unwrap().insert(key, body);
    StatusCode::OK
}

async fn get_kv(
    State(state): State<MockStoreState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    maybe_delay(&state).await;
    match state.kv.lock().unwrap().get(&key) {
        Some(value) => (StatusCode::OK, value.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn exec_statement(
    State(state): State<MockStoreState>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    maybe_delay(&state).await;
    let statement = payload["statement"].as_str().unwrap_or_default();
    if statement.trim_start().to_uppercase().starts_with("INSERT") {
        *state.inserted_rows.lock().unwrap() += 1;
    }
    (StatusCode::OK, Json(serde_json::json!({ "ok": true })))
}

async fn query_statement(State(state): State<MockStoreState>) -> impl IntoResponse {
    maybe_delay(&state).await;
    let count = state
        .options
        .fixed_count
        .unwrap_or_else(|| *state.inserted_rows.lock().unwrap());
    (
        StatusCode::OK,
        Json(serde_json::json!({ "rows": [{ "c": count }] })),
    )
}

async fn put_object(
    State(state): State<MockStoreState>,
    Path(key): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    maybe_delay(&state).await;
    state.objects.lock().unwrap().insert(key, body.to_vec());
    StatusCode::OK
}

async fn get_object(
    State(state): State<MockStoreState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    maybe_delay(&state).await;
    match state.objects.lock().unwrap().get(&key) {
        Some(bytes) => (StatusCode::OK, bytes.clone()),
        None => (StatusCode::NOT_FOUND, Vec::new()),
    }
}

/// Build a dependency entry pointing at a mock store.
pub fn dependency(name: &str, kind: StoreKind, addr: SocketAddr, deadline_ms: u64) -> DependencyConfig {
    DependencyConfig {
        name: name.to_string(),
        kind,
        endpoint: format!("http://{}", addr),
        deadline_ms,
        on_exceeded: DependencyErrorKind::Timeout,
        enabled: true,
    }
}

/// Spawn a gateway server on an ephemeral port.
///
/// Returns the bound address and the shutdown handle keeping it alive.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config).unwrap();
    let server_shutdown: broadcast::Receiver<()> = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
