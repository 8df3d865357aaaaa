//! Signal detectors for the proctoring agent.
//!
//! Three independent observers feed the event emitter:
//! - visibility: tab focus/blur transitions from the hosting shell
//! - frame: periodic still-frame capture sent for remote analysis
//! - manual: immediate caller-chosen emissions for simulated signals
//!
//! Detectors never block one another, and none outlives its session:
//! every detector runs as a task owned and torn down by the
//! session controller.

pub mod frame;
pub mod manual;
pub mod visibility;

// Re-export commonly used types
pub use frame::FrameSampler;
pub use manual::ManualTrigger;
pub use visibility::{VisibilityDetector, VisibilityFeed};
