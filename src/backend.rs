//! Backend endpoint configuration and shared HTTP plumbing.
//!
//! The collector backend is an opaque external service; this module only
//! knows its base URL and the three endpoints the agent consumes. The
//! base URL is injected at construction so tests can redirect it per case.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Request timeout applied to every backend call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the proctoring backend (no trailing slash)
    pub base_url: String,
}

impl BackendConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Event ingestion endpoint (fire-and-forget POST).
    pub fn events_url(&self) -> String {
        format!("{}/api/proctor/events", self.base_url)
    }

    /// Remote frame-analysis endpoint.
    pub fn analyze_url(&self) -> String {
        format!("{}/api/ml/analyze-frame", self.base_url)
    }

    /// Suspicion summary endpoint for a given session.
    pub fn summary_url(&self, exam_id: &str, user_id: &str) -> String {
        format!(
            "{}/api/proctor/summary?exam_id={}&user_id={}",
            self.base_url, exam_id, user_id
        )
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Backend client error types.
#[derive(Debug)]
pub enum BackendError {
    /// Network/HTTP error
    Network(String),
    /// Server returned a non-success status
    Server { status: u16, message: String },
    /// JSON encode/decode error
    Serialization(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "Backend network error: {msg}"),
            BackendError::Server { status, message } => {
                write!(f, "Backend server error ({status}): {message}")
            }
            BackendError::Serialization(msg) => {
                write!(f, "Backend serialization error: {msg}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Build the HTTP client used for all backend calls.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}
