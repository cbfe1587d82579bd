//! Backing store clients.
//!
//! # Data Flow
//! ```text
//! orchestrator probe
//!     → trait call (KeyValueStore / RelationalStore / ObjectStore)
//!     → HTTP implementation builds request against configured endpoint
//!     → response triaged into value or typed StoreError
//! ```
//!
//! # Design Decisions
//! - Stores are external collaborators; only the calling contract lives here
//! - Trait seams so tests can substitute in-memory doubles
//! - Failures are typed (Unavailable / InvalidResponse); the guard layer
//!   adds Timeout

pub mod error;
pub mod kv;
pub mod object;
pub mod relational;

pub use error::{DependencyErrorKind, StoreError};
pub use kv::{HttpKeyValueStore, KeyValueStore};
pub use object::{HttpObjectStore, ObjectStore};
pub use relational::{HttpRelationalStore, RelationalStore};

use axum::body::Body;
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

/// HTTP client type shared by all store implementations.
pub type HttpClient = Client<HttpConnector, Body>;

/// Upper bound on store response bodies we are willing to buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Collect a response body, treating read failures as malformed data.
pub(crate) async fn read_body(body: Incoming) -> Result<axum::body::Bytes, StoreError> {
    axum::body::to_bytes(Body::new(body), MAX_BODY_BYTES)
        .await
        .map_err(|e| StoreError::invalid_response(format!("body read failed: {}", e)))
}

/// Classify an unexpected response status into a typed store error.
///
/// Server-side statuses mean the store is effectively down; anything else
/// unexpected means the store is not speaking our protocol.
pub(crate) fn classify_status(status: axum::http::StatusCode) -> StoreError {
    if status.is_server_error() {
        StoreError::unavailable(format!("status {}", status))
    } else {
        StoreError::invalid_response(format!("unexpected status {}", status))
    }
}

/// Normalize a configured endpoint so paths can be appended directly.
pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}
