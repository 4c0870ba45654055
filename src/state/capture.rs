use std::time::Duration;

use tokio::{
    sync::{Mutex, RwLock, watch},
    time::Instant,
};

use crate::{
    dto::{capture::CaptureStatus, envelope::StatusEnvelope, query::Query},
    services::hand_state::{HandStateExtractor, HandStateOverrides},
};

const FPS_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct FrameCounters {
    frames: u64,
    window_frames: u32,
    window_started: Option<Instant>,
    fps: u32,
    last_envelope: Option<StatusEnvelope>,
}

/// Capture driver sub-state carved out from [`super::AppState`].
pub struct CaptureState {
    running: watch::Sender<bool>,
    counters: RwLock<FrameCounters>,
    extractor: Mutex<HandStateExtractor>,
    overrides: HandStateOverrides,
}

impl CaptureState {
    /// Build a stopped capture state extracting with `overrides`.
    pub fn new(overrides: HandStateOverrides) -> Self {
        let (running, _rx) = watch::channel(false);
        Self {
            running,
            counters: RwLock::new(FrameCounters::default()),
            extractor: Mutex::new(HandStateExtractor::new()),
            overrides,
        }
    }

    /// Begin capturing, opening a new hand. Returns false when already running.
    pub async fn start(&self) -> bool {
        if self.is_capturing() {
            return false;
        }
        self.extractor.lock().await.start_new_hand();
        *self.counters.write().await = FrameCounters::default();
        self.running.send_replace(true);
        true
    }

    /// Stop capturing, close the open hand and clear the frame counters.
    /// Returns false when not running.
    pub async fn stop(&self) -> bool {
        if !self.is_capturing() {
            return false;
        }
        self.running.send_replace(false);
        self.extractor.lock().await.reset();
        let mut counters = self.counters.write().await;
        counters.frames = 0;
        counters.window_frames = 0;
        counters.window_started = None;
        counters.fps = 0;
        true
    }

    /// Whether the driver is currently ticking.
    pub fn is_capturing(&self) -> bool {
        *self.running.borrow()
    }

    /// Subscribe to start/stop transitions.
    pub fn running_watcher(&self) -> watch::Receiver<bool> {
        self.running.subscribe()
    }

    /// Count a frame tick at `now` and extract the query for it.
    pub async fn next_frame(&self, now: Instant) -> Query {
        {
            let mut counters = self.counters.write().await;
            counters.frames += 1;
            counters.window_frames += 1;
            let started = *counters.window_started.get_or_insert(now);
            let elapsed = now.saturating_duration_since(started);
            if elapsed >= FPS_WINDOW {
                counters.fps = (counters.window_frames as f64 * 1000.0 / elapsed.as_millis() as f64)
                    .round() as u32;
                counters.window_frames = 0;
                counters.window_started = Some(now);
            }
        }

        let state = self.extractor.lock().await.extract(&self.overrides);
        Query::from(state)
    }

    /// Keep the envelope most recently returned for a frame.
    pub async fn record_envelope(&self, envelope: StatusEnvelope) {
        self.counters.write().await.last_envelope = Some(envelope);
    }

    /// Counters, current hand and last envelope.
    pub async fn status(&self) -> CaptureStatus {
        let hand_id = self
            .extractor
            .lock()
            .await
            .current_hand_id()
            .map(str::to_owned);
        let counters = self.counters.read().await;
        CaptureStatus {
            capturing: self.is_capturing(),
            frames: counters.frames,
            fps: counters.fps,
            hand_id,
            last_envelope: counters.last_envelope.clone(),
        }
    }
}
