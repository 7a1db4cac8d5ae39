use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};

use super::{BackendError, ObjectStorage, RecordStore};
use crate::config::BackendConfig;

/// Connect timeout only. Requests themselves are not time-limited.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the hosted storage and REST endpoints.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self::with_http_client(config, client))
    }

    /// Use a caller-built HTTP client (proxy or TLS settings).
    pub fn with_http_client(config: &BackendConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            client,
        }
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else {
            BackendError::HttpClient(e.to_string())
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<(), BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

impl ObjectStorage for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let response = self
            .authed(self.client.post(&url))
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        ensure_success(response).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}

impl RecordStore for SupabaseClient {
    async fn insert_row(&self, table: &str, row: serde_json::Value) -> Result<(), BackendError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let response = self
            .authed(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        ensure_success(response).await
    }
}
