//! Tab focus/blur detection.
//!
//! The hosting shell observes page visibility and pushes the hidden flag
//! into a [`VisibilityFeed`]; the detector emits `tab_blur`/`tab_focus`
//! on genuine transitions only, never on subscription. Teardown is the
//! session controller aborting the detector task and dropping the feed.

use crate::emitter::EventEmitter;
use crate::events::{EventType, Severity};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

/// Host-side handle for reporting page visibility changes.
///
/// Cheap to clone; all clones feed the same detector.
#[derive(Clone)]
pub struct VisibilityFeed {
    sender: Arc<watch::Sender<bool>>,
}

impl VisibilityFeed {
    /// Create a feed whose page starts visible.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Report the current hidden state of the page.
    pub fn set_hidden(&self, hidden: bool) {
        self.sender.send_replace(hidden);
    }

    /// Current hidden state as last reported.
    pub fn is_hidden(&self) -> bool {
        *self.sender.borrow()
    }

    /// Subscribe a detector to this feed.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for VisibilityFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits `tab_blur`/`tab_focus` events for visibility transitions.
pub struct VisibilityDetector {
    emitter: EventEmitter,
    receiver: watch::Receiver<bool>,
}

impl VisibilityDetector {
    pub fn new(emitter: EventEmitter, feed: &VisibilityFeed) -> Self {
        Self {
            emitter,
            receiver: feed.subscribe(),
        }
    }

    /// Watch the feed until the feed is dropped or the task is aborted.
    pub async fn run(mut self) {
        // The state at subscription time is not a transition.
        let mut last_hidden = *self.receiver.borrow_and_update();

        while self.receiver.changed().await.is_ok() {
            let hidden = *self.receiver.borrow_and_update();
            if hidden == last_hidden {
                // Repeated reports of the same state are not transitions.
                continue;
            }
            last_hidden = hidden;

            if hidden {
                self.emitter
                    .emit(EventType::TabBlur, Severity::Medium, json!({"hidden": true}));
            } else {
                self.emitter
                    .emit(EventType::TabFocus, Severity::Low, json!({"hidden": false}));
            }
        }

        tracing::debug!("visibility feed closed, detector stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendConfig;
    use crate::events::create_shared_log;
    use crate::reporting::ReportingChannel;
    use crate::session::Session;
    use std::time::Duration;

    fn emitter() -> EventEmitter {
        let session = Session::new("exam-1", "user-1", None).unwrap();
        let channel = ReportingChannel::new(&BackendConfig::new("http://127.0.0.1:9"));
        EventEmitter::new(session, create_shared_log(), channel)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_no_emission_on_subscribe() {
        let emitter = emitter();
        let log = emitter.log().clone();
        let feed = VisibilityFeed::new();
        let handle = tokio::spawn(VisibilityDetector::new(emitter, &feed).run());

        settle().await;
        assert!(log.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_emissions_match_transitions() {
        let emitter = emitter();
        let log = emitter.log().clone();
        let feed = VisibilityFeed::new();
        let handle = tokio::spawn(VisibilityDetector::new(emitter, &feed).run());
        settle().await;

        feed.set_hidden(true);
        settle().await;
        feed.set_hidden(false);
        settle().await;
        feed.set_hidden(true);
        settle().await;

        let events = log.snapshot();
        assert_eq!(events.len(), 3);
        // Most recent first
        assert_eq!(events[0].event_type, EventType::TabBlur);
        assert_eq!(events[1].event_type, EventType::TabFocus);
        assert_eq!(events[2].event_type, EventType::TabBlur);
        assert_eq!(events[2].severity, Severity::Medium);
        assert_eq!(events[1].severity, Severity::Low);
        assert_eq!(events[2].data, json!({"hidden": true}));
        handle.abort();
    }

    #[tokio::test]
    async fn test_repeated_state_is_not_a_transition() {
        let emitter = emitter();
        let log = emitter.log().clone();
        let feed = VisibilityFeed::new();
        let handle = tokio::spawn(VisibilityDetector::new(emitter, &feed).run());
        settle().await;

        feed.set_hidden(true);
        settle().await;
        feed.set_hidden(true);
        settle().await;

        assert_eq!(log.len(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_detector_stops_when_feed_dropped() {
        let emitter = emitter();
        let feed = VisibilityFeed::new();
        let handle = tokio::spawn(VisibilityDetector::new(emitter, &feed).run());
        settle().await;

        drop(feed);
        // Detector exits on its own once the sender is gone.
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("detector should stop")
            .expect("detector task should not panic");
    }
}
