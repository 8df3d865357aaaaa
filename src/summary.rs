//! Periodic suspicion summary polling.
//!
//! The backend owns the suspicion-scoring algorithm; the agent only
//! mirrors its latest aggregate. Each successful poll fully replaces the
//! held snapshot; a failed poll retains the previous one, so hosts show
//! "loading" only before the first success and stale data silently after.

use crate::backend::{http_client, BackendConfig, BackendError};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Server-computed aggregate for one (exam, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspicionSummary {
    pub total_events: u64,
    pub suspicion_score: f64,
    /// Categorical level derived from the score; boundaries are owned by
    /// the backend, the client renders it verbatim.
    pub suspicion_level: String,
    /// Occurrence count per event-type string. Keyed by plain strings so
    /// backend-side event-type additions need no client change.
    #[serde(default)]
    pub counts: HashMap<String, u64>,
}

/// Polls the backend for the session's suspicion summary.
#[derive(Clone)]
pub struct SummaryPoller {
    client: reqwest::Client,
    summary_url: String,
    snapshot: Arc<RwLock<Option<SuspicionSummary>>>,
}

impl SummaryPoller {
    /// Create a poller bound to a session.
    pub fn new(backend: &BackendConfig, session: &Session) -> Self {
        Self {
            client: http_client(),
            summary_url: backend.summary_url(&session.exam_id, &session.user_id),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Fetch the latest aggregate and replace the held snapshot.
    ///
    /// On any failure the previous snapshot is left untouched and the
    /// error is returned for the caller to ignore or log.
    pub async fn refresh(&self) -> Result<SuspicionSummary, BackendError> {
        let response = self
            .client
            .get(&self.summary_url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let summary: SuspicionSummary = response
            .json()
            .await
            .map_err(|e| BackendError::Serialization(e.to_string()))?;

        // Full replacement, never a merge
        *self.snapshot.write().expect("summary lock poisoned") = Some(summary.clone());

        Ok(summary)
    }

    /// The most recently fetched summary, if any poll has succeeded.
    pub fn latest(&self) -> Option<SuspicionSummary> {
        self.snapshot.read().expect("summary lock poisoned").clone()
    }

    /// Poll loop: one immediate refresh, then one per interval.
    ///
    /// Runs until the owning task is aborted; failures are logged at
    /// debug level and the loop continues.
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            // First tick of a tokio interval fires immediately.
            ticker.tick().await;

            match self.refresh().await {
                Ok(summary) => {
                    tracing::debug!(
                        total_events = summary.total_events,
                        level = %summary.suspicion_level,
                        "summary refreshed"
                    );
                }
                Err(e) => {
                    tracing::debug!(error = %e, "summary refresh failed, keeping previous snapshot");
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn seed(&self, summary: SuspicionSummary) {
        *self.snapshot.write().expect("summary lock poisoned") = Some(summary);
    }
}
