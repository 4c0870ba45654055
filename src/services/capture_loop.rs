use std::time::Duration;

use futures::StreamExt;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info};

use crate::{dto::envelope::best_action, state::SharedState};

/// Frame tick cadence of the capture provider.
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(200);

/// Drive frame ticks while capture is running, handing each frame to the coordinator.
///
/// Each tick's query runs in its own task so a slow call never delays the next tick.
/// Returns once the capture state is dropped.
pub async fn run(state: SharedState, tick: Duration) {
    let mut running = state.capture().running_watcher();

    loop {
        let started = running.wait_for(|capturing| *capturing).await.is_ok();
        if !started {
            return;
        }
        info!(interval_ms = tick.as_millis() as u64, "capture started");

        let mut timer = interval(tick);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(timer);

        loop {
            tokio::select! {
                changed = running.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let capturing = *running.borrow_and_update();
                    if !capturing {
                        info!("capture stopped");
                        break;
                    }
                }
                Some(_) = ticks.next() => handle_tick(&state).await,
            }
        }
    }
}

async fn handle_tick(state: &SharedState) {
    let query = state.capture().next_frame(Instant::now()).await;
    let state = state.clone();

    tokio::spawn(async move {
        match state.coordinator().query(query).await {
            Ok(envelope) => {
                match envelope.display_data().and_then(best_action) {
                    Some(action) => debug!(
                        status = envelope.status.as_str(),
                        action = %action.action,
                        ev = action.ev.unwrap_or_default(),
                        stale_age_s = envelope.stale_age_seconds,
                        "strategy advice"
                    ),
                    None => debug!(status = envelope.status.as_str(), "no strategy available"),
                }
                state.capture().record_envelope(envelope).await;
            }
            Err(err) => error!(error = %err, "hand state contract violation"),
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::sleep;

    use super::*;
    use crate::{
        dao::strategy_api::fake::{Reply, ScriptedTransport},
        dto::envelope::QueryStatus,
        services::{
            coordinator::{Coordinator, CoordinatorConfig},
            hand_state::HandStateOverrides,
        },
        state::AppState,
    };

    #[tokio::test(start_paused = true)]
    async fn ticks_are_gated_to_one_call_per_interval() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then(Duration::from_millis(50), Reply::strategy("raise_2.5x", "hit"))
                .then(Duration::from_millis(50), Reply::strategy("fold", "miss")),
        );
        let coordinator = Coordinator::new(transport.clone(), CoordinatorConfig::default());
        let state = AppState::new(coordinator, HandStateOverrides::default());

        tokio::spawn(run(state.clone(), DEFAULT_CAPTURE_INTERVAL));
        state.capture().start().await;
        sleep(Duration::from_millis(1_500)).await;
        state.capture().stop().await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(transport.calls(), 2);
        let snapshot = state.coordinator().snapshot().await;
        assert_eq!(snapshot.requests.total, 2);
        assert!(snapshot.requests.skipped > 0);

        let status = state.capture().status().await;
        assert!(!status.capturing);
        let last = status.last_envelope.unwrap();
        assert_eq!(last.status, QueryStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_capture_issues_no_queries() {
        let transport = Arc::new(ScriptedTransport::new());
        let coordinator = Coordinator::new(transport.clone(), CoordinatorConfig::default());
        let state = AppState::new(coordinator, HandStateOverrides::default());

        tokio::spawn(run(state.clone(), DEFAULT_CAPTURE_INTERVAL));
        sleep(Duration::from_secs(2)).await;

        assert_eq!(transport.calls(), 0);
    }
}
