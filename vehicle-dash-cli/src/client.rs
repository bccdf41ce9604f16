//! HTTP status client
//!
//! Thin fetch layer over the backend's four read-only status endpoints.
//! Failures are expected and cheap here: the pollers skip the cycle and try
//! again shortly, so every error maps into `SyncError` instead of aborting.

use async_trait::async_trait;
use std::time::Duration;
use vehicle_dash_sync::{
    ConnectionSnapshot, DoorSnapshot, RangingSnapshot, SyncError, UserSnapshot,
};

/// Where status snapshots come from. The HTTP client implements this; tests
/// substitute scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn connection(&self) -> Result<ConnectionSnapshot, SyncError>;
    async fn door(&self) -> Result<DoorSnapshot, SyncError>;
    async fn ranging(&self) -> Result<RangingSnapshot, SyncError>;
    async fn user(&self) -> Result<UserSnapshot, SyncError>;
}

/// reqwest-backed status source with a per-request timeout
pub struct HttpStatusClient {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpStatusClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SyncError::Timeout(self.timeout_ms)
            } else {
                SyncError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Http(status.as_u16()));
        }

        // Decode through serde_json so a malformed body is a Payload error
        let body = response
            .bytes()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn connection(&self) -> Result<ConnectionSnapshot, SyncError> {
        self.get_json("/api/connection").await
    }

    async fn door(&self) -> Result<DoorSnapshot, SyncError> {
        self.get_json("/api/door").await
    }

    async fn ranging(&self) -> Result<RangingSnapshot, SyncError> {
        self.get_json("/api/ranging").await
    }

    async fn user(&self) -> Result<UserSnapshot, SyncError> {
        self.get_json("/api/user").await
    }
}
