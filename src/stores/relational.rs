//! Relational store client.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use serde::Deserialize;

use crate::stores::error::StoreError;
use crate::stores::{classify_status, normalize_endpoint, read_body, HttpClient};

/// Calling contract for a relational store.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Execute a statement with no result set (DDL, INSERT).
    async fn exec(&self, statement: &str) -> Result<(), StoreError>;

    /// Run a query and return its rows.
    async fn query(&self, statement: &str) -> Result<Vec<serde_json::Value>, StoreError>;
}

/// Shape of a query response from the store.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    rows: Vec<serde_json::Value>,
}

/// Relational store reached over HTTP.
///
/// Protocol: `POST {endpoint}/exec` and `POST {endpoint}/query`, both with
/// body `{"statement": "..."}`. Query responses carry `{"rows": [...]}`.
pub struct HttpRelationalStore {
    base: String,
    client: HttpClient,
}

impl HttpRelationalStore {
    pub fn new(endpoint: &str, client: HttpClient) -> Self {
        Self {
            base: normalize_endpoint(endpoint),
            client,
        }
    }

    async fn post(
        &self,
        path: &str,
        statement: &str,
    ) -> Result<axum::http::Response<hyper::body::Incoming>, StoreError> {
        let payload = serde_json::json!({ "statement": statement }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri(format!("{}{}", self.base, path))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .map_err(StoreError::unavailable)?;

        self.client
            .request(request)
            .await
            .map_err(StoreError::unavailable)
    }
}

#[async_trait]
impl RelationalStore for HttpRelationalStore {
    async fn exec(&self, statement: &str) -> Result<(), StoreError> {
        let response = self.post("/exec", statement).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(classify_status(response.status()))
        }
    }

    async fn query(&self, statement: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let response = self.post("/query", statement).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let bytes = read_body(response.into_body()).await?;
        let parsed: QueryResponse = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::invalid_response(format!("malformed query response: {}", e)))?;
        Ok(parsed.rows)
    }
}
