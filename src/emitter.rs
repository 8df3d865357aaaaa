//! Event construction and dispatch.
//!
//! The emitter is the single path every detected signal takes: stamp the
//! event, prepend it to the local log, hand it to the reporting channel.
//! The log update is synchronous and independent of network latency or
//! delivery outcome.

use crate::events::{EventType, ProctorEvent, Severity, SharedEventLog};
use crate::reporting::ReportingChannel;
use crate::session::Session;

/// Builds canonical events for one session and dispatches them.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    session: Session,
    log: SharedEventLog,
    channel: ReportingChannel,
}

impl EventEmitter {
    /// Create an emitter bound to a session.
    pub fn new(session: Session, log: SharedEventLog, channel: ReportingChannel) -> Self {
        Self {
            session,
            log,
            channel,
        }
    }

    /// Emit an event: stamp it, record it locally, send it best-effort.
    ///
    /// Never awaits delivery; the local log reflects the emission even
    /// if the backend never receives it.
    pub fn emit(&self, event_type: EventType, severity: Severity, data: serde_json::Value) {
        let event = ProctorEvent::new(
            self.session.exam_id.clone(),
            self.session.user_id.clone(),
            event_type,
            severity,
            data,
        );

        tracing::info!(event_type = %event_type, severity = %severity, "proctor event");

        self.log.record(event.clone());
        self.channel.send(event);
    }

    /// The session this emitter is bound to.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The shared log this emitter records into.
    pub fn log(&self) -> &SharedEventLog {
        &self.log
    }
}
