//! Key-value store client.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};

use crate::stores::error::StoreError;
use crate::stores::{classify_status, normalize_endpoint, read_body, HttpClient};

/// Calling contract for a key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Key-value store reached over HTTP.
///
/// Protocol: `PUT {endpoint}/kv/{key}` with the value as body,
/// `GET {endpoint}/kv/{key}` returning the value or 404 when absent.
pub struct HttpKeyValueStore {
    base: String,
    client: HttpClient,
}

impl HttpKeyValueStore {
    pub fn new(endpoint: &str, client: HttpClient) -> Self {
        Self {
            base: normalize_endpoint(endpoint),
            client,
        }
    }

    fn key_uri(&self, key: &str) -> String {
        format!("{}/kv/{}", self.base, key)
    }
}

#[async_trait]
impl KeyValueStore for HttpKeyValueStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let request = Request::builder()
            .method("PUT")
            .uri(self.key_uri(key))
            .body(Body::from(value.to_string()))
            .map_err(StoreError::unavailable)?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(StoreError::unavailable)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(classify_status(response.status()))
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.key_uri(key))
            .body(Body::empty())
            .map_err(StoreError::unavailable)?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(StoreError::unavailable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let bytes = read_body(response.into_body()).await?;
        let value = String::from_utf8(bytes.to_vec())
            .map_err(|_| StoreError::invalid_response("value is not valid UTF-8"))?;
        Ok(Some(value))
    }
}
