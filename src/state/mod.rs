/// Capture driver state.
pub mod capture;
/// Rate gate and single-flight handle.
pub mod gate;
/// Metrics recorder.
pub mod metrics;
/// Stale fallback cache.
pub mod stale_cache;

use std::sync::Arc;

use crate::{services::coordinator::Coordinator, services::hand_state::HandStateOverrides};

pub use self::capture::CaptureState;

/// Shared handle passed to routes and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state handed to the HTTP surface and the capture driver.
pub struct AppState {
    coordinator: Coordinator,
    capture: CaptureState,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Capture starts stopped; call [`CaptureState::start`] to begin sampling.
    pub fn new(coordinator: Coordinator, overrides: HandStateOverrides) -> SharedState {
        Arc::new(Self {
            coordinator,
            capture: CaptureState::new(overrides),
        })
    }

    /// Coordinator shared by every consumer.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Frame-tick driver state.
    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }
}
