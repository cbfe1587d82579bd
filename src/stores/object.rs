//! Object store client.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};

use crate::stores::error::StoreError;
use crate::stores::{classify_status, normalize_endpoint, read_body, HttpClient};

/// Calling contract for an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Object store reached over HTTP.
///
/// Protocol: `PUT {endpoint}/objects/{key}` with raw bytes as body,
/// `GET {endpoint}/objects/{key}` returning the bytes or 404 when absent.
pub struct HttpObjectStore {
    base: String,
    client: HttpClient,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, client: HttpClient) -> Self {
        Self {
            base: normalize_endpoint(endpoint),
            client,
        }
    }

    fn object_uri(&self, key: &str) -> String {
        format!("{}/objects/{}", self.base, key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let request = Request::builder()
            .method("PUT")
            .uri(self.object_uri(key))
            .body(Body::from(bytes))
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

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.object_uri(key))
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
        Ok(Some(bytes.to_vec()))
    }
}
