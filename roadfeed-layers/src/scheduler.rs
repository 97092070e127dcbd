//! Background task driving timed and lifecycle-triggered refreshes.
//!
//! The task:
//! 1. Refreshes once on start
//! 2. Refreshes every TTL when auto refresh is on (ticks are suppressed
//!    while backgrounded)
//! 3. Refreshes immediately on return to the foreground and restarts the TTL
//!    timer from that moment
//! 4. Exits when the shutdown token is cancelled

use std::future;
use std::sync::Arc;

use log::{debug, info};
use roadfeed_core::FeedSource;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controller::Shared;
use crate::lifecycle::{AppState, LifecycleListener};

pub(crate) async fn run<S: FeedSource>(
    shared: Arc<Shared<S>>,
    mut listener: LifecycleListener,
    auto_refresh: bool,
    shutdown: CancellationToken,
) {
    let ttl = shared.ttl();
    // A zero period would make the interval panic.
    let mut timer = (auto_refresh && !ttl.is_zero()).then(|| {
        let mut interval = time::interval_at(Instant::now() + ttl, ttl);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    let mut host_attached = true;

    info!(
        "layer scheduler starting (auto refresh: {auto_refresh}, ttl: {} ms)",
        ttl.as_millis()
    );
    refresh_unless_shutdown(&shared, &shutdown).await;

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => {
                info!("layer scheduler shutting down");
                break;
            }

            change = listener.changed(), if host_attached => match change {
                Some(AppState::Foreground) => {
                    debug!("host foregrounded; refreshing");
                    if let Some(interval) = timer.as_mut() {
                        interval.reset();
                    }
                    refresh_unless_shutdown(&shared, &shutdown).await;
                }
                Some(AppState::Background) => debug!("host backgrounded; pausing refreshes"),
                None => {
                    debug!("host lifecycle dropped; treating host as foregrounded");
                    host_attached = false;
                }
            },

            () = next_tick(&mut timer) => {
                refresh_unless_shutdown(&shared, &shutdown).await;
            }
        }
    }
}

/// Refresh, abandoning the fetch if shutdown is requested meanwhile.
async fn refresh_unless_shutdown<S: FeedSource>(shared: &Shared<S>, shutdown: &CancellationToken) {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => debug!("refresh abandoned for shutdown"),
        outcome = shared.refresh() => debug!("scheduled refresh finished: {outcome:?}"),
    }
}

/// Next TTL tick; never resolves in manual mode.
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}
