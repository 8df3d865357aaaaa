//! Periodic frame sampling for remote analysis.
//!
//! Every interval tick: capture one still frame if the video source is
//! playable, send it to the analyzer, and emit events for whatever the
//! analyzer flagged. Skips silently when the source has no frame data
//! yet, and swallows every analysis failure. Monitoring continuity wins
//! over precision here: this detector must never let an error escape
//! its boundary.

use crate::analyzer::FrameAnalyzer;
use crate::emitter::EventEmitter;
use crate::events::{EventType, Severity};
use crate::video::VideoSource;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Samples frames from the session's video source on a fixed interval.
pub struct FrameSampler {
    emitter: EventEmitter,
    source: Arc<dyn VideoSource>,
    analyzer: Arc<dyn FrameAnalyzer>,
    interval: Duration,
}

impl FrameSampler {
    pub fn new(
        emitter: EventEmitter,
        source: Arc<dyn VideoSource>,
        analyzer: Arc<dyn FrameAnalyzer>,
        interval: Duration,
    ) -> Self {
        Self {
            emitter,
            source,
            analyzer,
            interval,
        }
    }

    /// Capture and analyze a single frame.
    ///
    /// Returns whether a frame was actually submitted for analysis.
    pub async fn sample_once(&self) -> bool {
        if !self.source.is_ready() {
            tracing::trace!("video source not ready, skipping frame sample");
            return false;
        }

        let Some(frame) = self.source.capture_frame() else {
            tracing::trace!("no frame available, skipping");
            return false;
        };

        let image_b64 = BASE64.encode(&frame);
        let session = self.emitter.session();

        match self
            .analyzer
            .analyze(&session.exam_id, &session.user_id, &image_b64)
            .await
        {
            Ok(analysis) => {
                if analysis.phone_detected {
                    self.emitter
                        .emit(EventType::PhoneDetected, Severity::Medium, json!({}));
                }
                if analysis.gaze_anomaly {
                    self.emitter
                        .emit(EventType::GazeAnomaly, Severity::Low, json!({}));
                }
            }
            Err(e) => {
                // Analysis failure is not itself a signal; no event is synthesized.
                tracing::debug!(error = %e, "frame analysis failed, skipping");
            }
        }

        true
    }

    /// Sampling loop. Runs until the owning task is aborted.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // A tokio interval yields immediately on its first tick; consume
        // it so the first sample happens one full interval after start.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sample_once().await;
        }
    }
}
