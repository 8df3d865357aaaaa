//! Manual and simulated signal triggers.
//!
//! Multi-face and screen-share detection are delegated to the same
//! remote analyzer contract and not implemented locally, so this
//! detector exists to exercise those emissions on demand: it immediately
//! emits a single event of a caller-chosen type and severity.

use crate::emitter::EventEmitter;
use crate::events::{EventType, Severity};
use serde_json::json;

/// Immediate, caller-driven event emission.
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    emitter: EventEmitter,
}

impl ManualTrigger {
    pub fn new(emitter: EventEmitter) -> Self {
        Self { emitter }
    }

    /// Emit a single event with empty data.
    pub fn fire(&self, event_type: EventType, severity: Severity) {
        self.fire_with_data(event_type, severity, json!({}));
    }

    /// Emit a single event with caller-supplied data.
    pub fn fire_with_data(
        &self,
        event_type: EventType,
        severity: Severity,
        data: serde_json::Value,
    ) {
        self.emitter.emit(event_type, severity, data);
    }
}
