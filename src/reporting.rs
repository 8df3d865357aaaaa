//! Fire-and-forget event delivery to the collector backend.
//!
//! Delivery is a named best-effort policy: `send` never blocks its
//! caller, never retries, and discards every failure. Proctoring must
//! not degrade the candidate's exam experience over transient
//! connectivity; the local event log is the only durable client-side
//! record. Events may arrive at the backend out of order or not at all.

use crate::backend::{http_client, BackendConfig};
use crate::events::{EventType, ProctorEvent, Severity};
use serde::Serialize;

/// Wire payload for `POST /api/proctor/events`.
///
/// The local emission timestamp is deliberately not part of the body;
/// the backend stamps arrival itself.
#[derive(Debug, Serialize)]
struct EventBody<'a> {
    exam_id: &'a str,
    user_id: &'a str,
    event_type: EventType,
    severity: Severity,
    data: &'a serde_json::Value,
}

/// Delivers events to the backend without blocking or retrying.
#[derive(Debug, Clone)]
pub struct ReportingChannel {
    client: reqwest::Client,
    events_url: String,
}

impl ReportingChannel {
    /// Create a channel bound to the given backend.
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            client: http_client(),
            events_url: backend.events_url(),
        }
    }

    /// Dispatch an event in the background.
    ///
    /// Returns immediately; the POST runs on a spawned task and any
    /// failure (network error, non-success status) is logged at debug
    /// level and dropped. Must be called from within a tokio runtime.
    pub fn send(&self, event: ProctorEvent) {
        let client = self.client.clone();
        let url = self.events_url.clone();

        tokio::spawn(async move {
            let body = EventBody {
                exam_id: &event.exam_id,
                user_id: &event.user_id,
                event_type: event.event_type,
                severity: event.severity,
                data: &event.data,
            };

            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(event_type = %event.event_type, "event delivered");
                }
                Ok(response) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        status = response.status().as_u16(),
                        "event delivery rejected, dropping"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        event_type = %event.event_type,
                        error = %e,
                        "event delivery failed, dropping"
                    );
                }
            }
        });
    }
}
