//! Session lifecycle and detector supervision.
//!
//! The controller owns the active session identity and every timer and
//! subscription bound to it. State machine: Idle --join(valid)--> Active,
//! Active --leave--> Idle. Leaving synchronously halts every detector
//! task; in-flight network calls finish in the background with their
//! results discarded.

use crate::analyzer::FrameAnalyzer;
use crate::config::Config;
use crate::detectors::{FrameSampler, ManualTrigger, VisibilityDetector, VisibilityFeed};
use crate::emitter::EventEmitter;
use crate::events::{create_shared_log, EventType, ProctorEvent, Severity, SharedEventLog};
use crate::reporting::ReportingChannel;
use crate::summary::{SummaryPoller, SuspicionSummary};
use crate::video::VideoSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Identity of a proctoring session, immutable for the life of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub exam_id: String,
    pub user_id: String,
    pub display_name: Option<String>,
}

impl Session {
    /// Create a session identity, rejecting empty exam or user ids.
    pub fn new(
        exam_id: impl Into<String>,
        user_id: impl Into<String>,
        display_name: Option<String>,
    ) -> Result<Self, SessionError> {
        let exam_id = exam_id.into();
        let user_id = user_id.into();

        if exam_id.is_empty() {
            return Err(SessionError::EmptyExamId);
        }
        if user_id.is_empty() {
            return Err(SessionError::EmptyUserId);
        }

        Ok(Self {
            exam_id,
            user_id,
            display_name,
        })
    }
}

/// Session lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Join was attempted with an empty exam id
    EmptyExamId,
    /// Join was attempted with an empty user id
    EmptyUserId,
    /// Join was attempted while a session is already active
    AlreadyActive,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyExamId => write!(f, "exam id must not be empty"),
            SessionError::EmptyUserId => write!(f, "user id must not be empty"),
            SessionError::AlreadyActive => write!(f, "a session is already active"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Everything alive only while a session is active.
struct ActiveSession {
    session: Session,
    instance_id: Uuid,
    joined_at: DateTime<Utc>,
    log: SharedEventLog,
    trigger: ManualTrigger,
    poller: SummaryPoller,
    visibility: VisibilityFeed,
    tasks: Vec<JoinHandle<()>>,
}

/// Owns the session state machine and wires detectors, emitter, and
/// poller together for the session's duration.
pub struct SessionController {
    config: Config,
    video: Arc<dyn VideoSource>,
    analyzer: Arc<dyn FrameAnalyzer>,
    active: Option<ActiveSession>,
}

impl SessionController {
    /// Create an idle controller.
    ///
    /// The video source and analyzer are injected so hosts and tests can
    /// substitute them; the backend base URL comes from `config`.
    pub fn new(config: Config, video: Arc<dyn VideoSource>, analyzer: Arc<dyn FrameAnalyzer>) -> Self {
        Self {
            config,
            video,
            analyzer,
            active: None,
        }
    }

    /// Join an exam: validate identity, go Active, start every detector.
    ///
    /// Invalid identities and re-entrant joins are rejected without
    /// side effects. Must be called from within a tokio runtime.
    pub fn join(
        &mut self,
        exam_id: impl Into<String>,
        user_id: impl Into<String>,
        display_name: Option<String>,
    ) -> Result<&Session, SessionError> {
        if self.active.is_some() {
            tracing::debug!("join rejected: session already active");
            return Err(SessionError::AlreadyActive);
        }

        let session = Session::new(exam_id, user_id, display_name).map_err(|e| {
            tracing::debug!(error = %e, "join rejected");
            e
        })?;

        let instance_id = Uuid::new_v4();
        let log = create_shared_log();
        let channel = ReportingChannel::new(&self.config.backend);
        let emitter = EventEmitter::new(session.clone(), log.clone(), channel);
        let poller = SummaryPoller::new(&self.config.backend, &session);
        let visibility = VisibilityFeed::new();

        if let Some(message) = self.video.error() {
            // Camera is a soft dependency: report it, keep monitoring.
            tracing::warn!(%message, "camera unavailable, frame sampling will skip");
        }

        let tasks = vec![
            tokio::spawn(VisibilityDetector::new(emitter.clone(), &visibility).run()),
            tokio::spawn(
                FrameSampler::new(
                    emitter.clone(),
                    self.video.clone(),
                    self.analyzer.clone(),
                    self.config.frame_interval,
                )
                .run(),
            ),
            tokio::spawn(poller.clone().run(self.config.poll_interval)),
        ];

        tracing::info!(
            exam_id = %session.exam_id,
            user_id = %session.user_id,
            %instance_id,
            "joined exam session"
        );

        let active = self.active.insert(ActiveSession {
            session,
            instance_id,
            joined_at: Utc::now(),
            log,
            trigger: ManualTrigger::new(emitter),
            poller,
            visibility,
            tasks,
        });

        Ok(&active.session)
    }

    /// Leave the session, halting every detector and timer. Idempotent.
    pub fn leave(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        // Abort is synchronous: no task survives this call. Dropping the
        // visibility feed with the ActiveSession closes the watch channel.
        for task in &active.tasks {
            task.abort();
        }

        tracing::info!(
            exam_id = %active.session.exam_id,
            instance_id = %active.instance_id,
            events_logged = active.log.len(),
            "left exam session"
        );
    }

    /// Whether a session is currently active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active session identity, if any.
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// When the active session was joined.
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.joined_at)
    }

    /// Snapshot of the local event log, most recent first.
    pub fn events(&self) -> Vec<ProctorEvent> {
        self.active
            .as_ref()
            .map(|a| a.log.snapshot())
            .unwrap_or_default()
    }

    /// Latest suspicion summary, if any poll has succeeded.
    pub fn summary(&self) -> Option<SuspicionSummary> {
        self.active.as_ref().and_then(|a| a.poller.latest())
    }

    /// Poller handle for the active session (host-driven refresh).
    pub fn poller(&self) -> Option<&SummaryPoller> {
        self.active.as_ref().map(|a| &a.poller)
    }

    /// Host-side visibility feed for the active session.
    pub fn visibility(&self) -> Option<VisibilityFeed> {
        self.active.as_ref().map(|a| a.visibility.clone())
    }

    /// Fire a manual/simulated emission on the active session.
    ///
    /// No-op while idle.
    pub fn simulate(&self, event_type: EventType, severity: Severity) {
        if let Some(active) = &self.active {
            active.trigger.fire(event_type, severity);
        }
    }

    /// Camera acquisition error to surface to the candidate, if any.
    pub fn camera_error(&self) -> Option<String> {
        self.video.error()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // A discarded controller must not leave detectors running.
        self.leave();
    }
}
