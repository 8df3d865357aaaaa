//! Video source abstraction for frame sampling.
//!
//! The hosting shell owns the actual camera; the agent only needs a way
//! to ask "is the stream playable yet?" and to grab a single still
//! frame. Camera acquisition failure is a soft dependency: the rest of
//! the monitoring keeps running without it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Minimum ready-state at which a source is considered playable.
///
/// Mirrors media-element semantics: below this the stream has no current
/// frame data and sampling must skip silently.
pub const READY_STATE_HAVE_CURRENT_DATA: u8 = 2;

/// A live video/media source supplied by the hosting shell.
pub trait VideoSource: Send + Sync {
    /// Current readiness of the stream (0 = nothing, 2+ = playable).
    fn ready_state(&self) -> u8;

    /// Capture a single still frame as encoded image bytes.
    ///
    /// Returns `None` when no frame is available; implementations must
    /// not block on camera negotiation.
    fn capture_frame(&self) -> Option<Vec<u8>>;

    /// User-visible acquisition error, if the camera could not start.
    fn error(&self) -> Option<String> {
        None
    }

    /// Whether the source currently has frame data to sample.
    fn is_ready(&self) -> bool {
        self.ready_state() >= READY_STATE_HAVE_CURRENT_DATA
    }
}

/// A stand-in camera for demos and tests.
///
/// Serves a fixed frame once marked ready; starts not-yet-playable like
/// a real camera mid-negotiation.
pub struct SimulatedCamera {
    ready_state: AtomicU8,
    frame: Vec<u8>,
    error: Mutex<Option<String>>,
}

impl SimulatedCamera {
    /// Create a camera that is still negotiating (not yet playable).
    pub fn new() -> Self {
        Self {
            ready_state: AtomicU8::new(0),
            // Tiny valid JPEG header stand-in; the analyzer is remote and opaque.
            frame: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46],
            error: Mutex::new(None),
        }
    }

    /// Create a camera that is immediately playable.
    pub fn ready() -> Self {
        let camera = Self::new();
        camera.set_ready_state(READY_STATE_HAVE_CURRENT_DATA);
        camera
    }

    /// Create a camera that failed to acquire (permission denied etc.).
    pub fn unavailable(message: impl Into<String>) -> Self {
        let camera = Self::new();
        *camera.error.lock().expect("camera error lock poisoned") = Some(message.into());
        camera
    }

    /// Simulate negotiation progress.
    pub fn set_ready_state(&self, state: u8) {
        self.ready_state.store(state, Ordering::SeqCst);
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for SimulatedCamera {
    fn ready_state(&self) -> u8 {
        self.ready_state.load(Ordering::SeqCst)
    }

    fn capture_frame(&self) -> Option<Vec<u8>> {
        if self.is_ready() {
            Some(self.frame.clone())
        } else {
            None
        }
    }

    fn error(&self) -> Option<String> {
        self.error.lock().expect("camera error lock poisoned").clone()
    }
}
