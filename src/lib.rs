//! Proctor Agent - client-side exam-proctoring monitor.
//!
//! This library watches a candidate's exam session for integrity
//! signals (tab switching, remote frame analysis verdicts, simulated
//! detections), normalizes them into canonical events, delivers them
//! best-effort to a collector backend, and mirrors the backend's
//! aggregated suspicion summary.
//!
//! # Delivery Guarantees
//!
//! - **Non-blocking**: no detector or emitter ever waits on the network
//! - **Best-effort**: delivery failures are discarded, never retried
//! - **Local record**: the in-memory event log keeps emission order even
//!   when the backend receives nothing
//! - **Bounded lifetime**: every timer and subscription dies with its
//!   session
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Proctor Agent                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐             │
//! │  │ Visibility │  │   Frame    │  │   Manual   │  detectors  │
//! │  │  detector  │  │  sampler   │  │  trigger   │             │
//! │  └─────┬──────┘  └─────┬──────┘  └─────┬──────┘             │
//! │        └───────────────┼───────────────┘                    │
//! │                        ▼                                    │
//! │                 ┌─────────────┐      ┌─────────────┐        │
//! │                 │   Emitter   │─────▶│  Reporting  │──▶ POST│
//! │                 │ (local log) │      │  (no retry) │        │
//! │                 └─────────────┘      └─────────────┘        │
//! │                                                             │
//! │                 ┌─────────────┐                             │
//! │                 │   Summary   │◀──────────────────── GET    │
//! │                 │   poller    │                             │
//! │                 └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use proctor_agent::{
//!     Config, EventType, HttpFrameAnalyzer, SessionController, Severity, SimulatedCamera,
//! };
//!
//! # async fn demo() {
//! let config = Config::default();
//! let analyzer = Arc::new(HttpFrameAnalyzer::new(&config.backend));
//! let mut controller =
//!     SessionController::new(config, Arc::new(SimulatedCamera::ready()), analyzer);
//!
//! controller
//!     .join("demo-exam-1", "student-001", Some("Alex Student".to_string()))
//!     .expect("valid identity");
//!
//! controller.simulate(EventType::MultiFace, Severity::High);
//!
//! controller.leave();
//! # }
//! ```

pub mod analyzer;
pub mod backend;
pub mod config;
pub mod detectors;
pub mod emitter;
pub mod events;
pub mod reporting;
pub mod session;
pub mod summary;
pub mod video;

// Re-export key types at crate root for convenience
pub use analyzer::{FrameAnalysis, FrameAnalyzer, HttpFrameAnalyzer};
pub use backend::{BackendConfig, BackendError};
pub use config::{Config, ConfigError};
pub use detectors::{FrameSampler, ManualTrigger, VisibilityDetector, VisibilityFeed};
pub use emitter::EventEmitter;
pub use events::{create_shared_log, EventLog, EventType, ProctorEvent, Severity, SharedEventLog};
pub use reporting::ReportingChannel;
pub use session::{Session, SessionController, SessionError};
pub use summary::{SummaryPoller, SuspicionSummary};
pub use video::{SimulatedCamera, VideoSource, READY_STATE_HAVE_CURRENT_DATA};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
