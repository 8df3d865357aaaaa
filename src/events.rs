//! Canonical proctoring event types and the local event log.
//!
//! Every detected signal is normalized into a [`ProctorEvent`] before it
//! leaves the process. The local log keeps emission order (most recent
//! first) regardless of whether delivery to the backend succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recognized proctoring event kinds.
///
/// The wire format is an open set: the backend and client agree on these
/// values, and adding one requires no schema migration since `data` is an
/// open mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Candidate's tab/window lost focus
    TabBlur,
    /// Candidate's tab/window regained focus
    TabFocus,
    /// Remote analyzer flagged a phone in frame
    PhoneDetected,
    /// Remote analyzer flagged an off-screen gaze
    GazeAnomaly,
    /// More than one face in frame
    MultiFace,
    /// Screen sharing detected
    ScreenShare,
}

impl EventType {
    /// Wire representation, matching the backend's snake_case strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TabBlur => "tab_blur",
            EventType::TabFocus => "tab_focus",
            EventType::PhoneDetected => "phone_detected",
            EventType::GazeAnomaly => "gaze_anomaly",
            EventType::MultiFace => "multi_face",
            EventType::ScreenShare => "screen_share",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-assigned coarse priority, attached at emission time.
///
/// Independent of the backend's own suspicion scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical proctoring event record.
///
/// Immutable once created. The timestamp is assigned at emission and is
/// monotonic non-decreasing within the local log, but delivery to the
/// backend carries no ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctorEvent {
    pub exam_id: String,
    pub user_id: String,
    pub event_type: EventType,
    pub severity: Severity,
    /// Open mapping whose semantics depend on `event_type`
    pub data: serde_json::Value,
    /// Assigned when the event is emitted, not when the signal occurred
    pub timestamp: DateTime<Utc>,
}

impl ProctorEvent {
    /// Create a new event stamped with the current time.
    pub fn new(
        exam_id: impl Into<String>,
        user_id: impl Into<String>,
        event_type: EventType,
        severity: Severity,
        data: serde_json::Value,
    ) -> Self {
        Self {
            exam_id: exam_id.into(),
            user_id: user_id.into(),
            event_type,
            severity,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Rolling in-memory log of emitted events, most recent first.
///
/// This is the only client-side record of what was emitted; delivery
/// failures never remove or reorder entries. Growth is unbounded for the
/// lifetime of a session.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<VecDeque<ProctorEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Prepend an event, keeping most-recent-first order.
    pub fn record(&self, event: ProctorEvent) {
        let mut entries = self.entries.lock().expect("event log lock poisoned");
        entries.push_front(event);
    }

    /// Snapshot of the log, most recent first.
    pub fn snapshot(&self) -> Vec<ProctorEvent> {
        let entries = self.entries.lock().expect("event log lock poisoned");
        entries.iter().cloned().collect()
    }

    /// The most recently emitted event, if any.
    pub fn latest(&self) -> Option<ProctorEvent> {
        let entries = self.entries.lock().expect("event log lock poisoned");
        entries.front().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("event log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe shared event log.
pub type SharedEventLog = Arc<EventLog>;

/// Create a new shared event log.
pub fn create_shared_log() -> SharedEventLog {
    Arc::new(EventLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_wire_names() {
        assert_eq!(EventType::TabBlur.as_str(), "tab_blur");
        assert_eq!(
            serde_json::to_value(EventType::PhoneDetected).unwrap(),
            json!("phone_detected")
        );
        assert_eq!(
            serde_json::from_value::<EventType>(json!("screen_share")).unwrap(),
            EventType::ScreenShare
        );
    }

    #[test]
    fn test_severity_wire_names() {
        assert_eq!(serde_json::to_value(Severity::High).unwrap(), json!("high"));
        assert!(Severity::Low < Severity::High);
    }

    #[test]
    fn test_log_is_most_recent_first() {
        let log = EventLog::new();
        log.record(ProctorEvent::new(
            "exam",
            "user",
            EventType::TabBlur,
            Severity::Medium,
            json!({"hidden": true}),
        ));
        log.record(ProctorEvent::new(
            "exam",
            "user",
            EventType::TabFocus,
            Severity::Low,
            json!({"hidden": false}),
        ));

        let events = log.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::TabFocus);
        assert_eq!(events[1].event_type, EventType::TabBlur);
        assert!(events[0].timestamp >= events[1].timestamp);
    }

    #[test]
    fn test_latest_tracks_newest_entry() {
        let log = EventLog::new();
        assert!(log.latest().is_none());

        log.record(ProctorEvent::new(
            "exam",
            "user",
            EventType::MultiFace,
            Severity::High,
            json!({}),
        ));
        let latest = log.latest().unwrap();
        assert_eq!(latest.event_type, EventType::MultiFace);
        assert_eq!(latest.severity, Severity::High);
    }
}
