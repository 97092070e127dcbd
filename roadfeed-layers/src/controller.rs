//! The layer cache and refresh controller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use log::{debug, info, warn};
use roadfeed_core::{EnabledLayers, FeedSource, LayerCache, LayerKey, MapMarker, MapOverlay};
use roadfeed_data::{RawLayerData, fetch_all_layer_data, normalize_all};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::{AppLifecycle, LifecycleListener};
use crate::scheduler;
use crate::snapshot::{LayerSnapshot, RefreshError, RefreshOutcome, RefreshReport};

/// Default time between automatic refreshes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Refresh timing and initial visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Time between automatic refreshes while foregrounded.
    pub ttl: Duration,
    /// Layer toggles at construction.
    pub default_enabled: EnabledLayers,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            default_enabled: EnabledLayers::default(),
        }
    }
}

impl ControllerConfig {
    /// Set the refresh interval.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the initial layer toggles.
    #[must_use]
    pub fn with_enabled(mut self, enabled: EnabledLayers) -> Self {
        self.default_enabled = enabled;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    cache: LayerCache,
    enabled: EnabledLayers,
    in_flight: usize,
    last_updated: Option<SystemTime>,
    error: Option<String>,
    next_generation: u64,
    applied_generation: u64,
}

impl State {
    fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot {
            overlays: self.cache.visible_overlays(&self.enabled),
            markers: self.cache.visible_markers(&self.enabled),
            enabled_layers: self.enabled.clone(),
            is_loading: self.in_flight > 0,
            last_updated: self.last_updated,
            error: self.error.clone(),
        }
    }
}

/// Shared between the controller handle and its scheduler task.
pub(crate) struct Shared<S> {
    source: S,
    config: ControllerConfig,
    state: Mutex<State>,
    snapshots: watch::Sender<LayerSnapshot>,
    lifecycle: Mutex<Option<LifecycleListener>>,
}

impl<S: FeedSource> Shared<S> {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lifecycle(&self) -> MutexGuard<'_, Option<LifecycleListener>> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Foregrounded and still registered with the host.
    fn is_foreground(&self) -> bool {
        self.lifecycle()
            .as_ref()
            .is_some_and(LifecycleListener::is_foreground)
    }

    /// Mutate the state and publish the resulting snapshot under one lock.
    fn update<R>(&self, change: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state();
        let result = change(&mut state);
        self.snapshots.send_replace(state.snapshot());
        result
    }

    pub(crate) async fn refresh(&self) -> RefreshOutcome {
        if !self.is_foreground() {
            debug!("refresh suppressed: host backgrounded or controller stopped");
            return RefreshOutcome::Suppressed;
        }

        let generation = self.update(|state| {
            state.in_flight += 1;
            state.next_generation += 1;
            state.next_generation
        });
        let guard = InFlight { shared: self };

        let data = fetch_all_layer_data(&self.source).await;
        let cache = (!data.is_aborted() && !data.all_failed()).then(|| normalize_all(&data));
        let outcome = self.apply(generation, &data, cache);
        drop(guard);
        outcome
    }

    fn apply(&self, generation: u64, data: &RawLayerData, cache: Option<LayerCache>) -> RefreshOutcome {
        let mut state = self.state();
        if generation <= state.applied_generation {
            debug!("discarding refresh {generation}; refresh {} already applied", state.applied_generation);
            return RefreshOutcome::Superseded;
        }

        let Some(cache) = cache else {
            let error = if data.is_aborted() {
                RefreshError::FanInAborted
            } else {
                RefreshError::AllFeedsFailed {
                    count: LayerKey::ALL.len(),
                }
            };
            warn!("refresh failed, keeping previous layers: {error}");
            state.error = Some(error.to_string());
            return RefreshOutcome::Failed(error);
        };

        let report = RefreshReport {
            failed_layers: data.failed_layers(),
            entity_count: LayerKey::ALL
                .into_iter()
                .map(|key| cache.layer_len(key))
                .sum(),
        };
        state.cache = cache;
        state.last_updated = Some(SystemTime::now());
        state.error = None;
        state.applied_generation = generation;
        info!(
            "refresh applied: {} entities, {} failed feeds",
            report.entity_count,
            report.failed_layers.len()
        );
        RefreshOutcome::Applied(report)
    }
}

/// Marks a refresh in flight until dropped, even if the refresh future is
/// cancelled part way.
struct InFlight<'a, S: FeedSource> {
    shared: &'a Shared<S>,
}

impl<S: FeedSource> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.shared.update(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
        });
    }
}

struct Scheduler {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the layer cache, the enabled flags and the refresh schedule.
///
/// Lifecycle is `new` → [`start`](Self::start) → [`stop`](Self::stop).
/// Toggling a layer only changes which cached entities are exposed; it
/// never fetches.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use roadfeed_core::LayerKey;
/// use roadfeed_core::test_support::StubFeedSource;
/// use roadfeed_layers::{AppLifecycle, ControllerConfig, LayerController};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lifecycle = AppLifecycle::default();
/// let controller = LayerController::new(
///     StubFeedSource::default(),
///     &lifecycle,
///     ControllerConfig::default(),
/// );
///
/// assert!(controller.refresh().await.is_applied());
/// assert!(!controller.toggle_layer(LayerKey::Incidents));
/// assert!(controller.snapshot().last_updated.is_some());
/// # }
/// ```
pub struct LayerController<S: FeedSource + 'static> {
    shared: Arc<Shared<S>>,
    scheduler: Mutex<Option<Scheduler>>,
}

impl<S: FeedSource + 'static> LayerController<S> {
    /// Create an idle controller and register it with the host lifecycle.
    #[must_use]
    pub fn new(source: S, lifecycle: &AppLifecycle, config: ControllerConfig) -> Self {
        let state = State {
            enabled: config.default_enabled.clone(),
            ..State::default()
        };
        let (snapshots, _rx) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                state: Mutex::new(state),
                snapshots,
                lifecycle: Mutex::new(Some(lifecycle.listener())),
            }),
            scheduler: Mutex::new(None),
        }
    }

    fn scheduler(&self) -> MutexGuard<'_, Option<Scheduler>> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the scheduler task onto the current Tokio runtime.
    ///
    /// The task refreshes immediately, then every TTL while foregrounded
    /// when `auto_refresh` is set, and on every return to the foreground.
    /// Calling `start` on a running or stopped controller does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self, auto_refresh: bool) {
        let mut scheduler = self.scheduler();
        if scheduler.is_some() {
            debug!("layer controller already started");
            return;
        }
        let Some(listener) = self.shared.lifecycle().clone() else {
            debug!("layer controller already stopped");
            return;
        };
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(scheduler::run(
            Arc::clone(&self.shared),
            listener,
            auto_refresh,
            shutdown.clone(),
        ));
        *scheduler = Some(Scheduler { shutdown, task });
    }

    /// Stop the scheduler and deregister from the host lifecycle.
    ///
    /// The cache and toggles stay usable; later refreshes are suppressed
    /// since the host state can no longer be observed.
    pub async fn stop(&self) {
        let scheduler = self.scheduler().take();
        if let Some(Scheduler { shutdown, task }) = scheduler {
            shutdown.cancel();
            if let Err(err) = task.await {
                warn!("layer scheduler task ended abnormally: {err}");
            }
        }
        self.shared.lifecycle().take();
    }

    /// Fetch all feeds and replace the cache.
    ///
    /// Suppressed while the host is backgrounded. On failure the previous
    /// cache is kept and the snapshot's `error` is set.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.shared.refresh().await
    }

    /// Flip one layer's visibility, returning the new value.
    pub fn toggle_layer(&self, key: LayerKey) -> bool {
        self.shared.update(|state| state.enabled.toggle(key))
    }

    /// Set one layer's visibility.
    pub fn set_layer_enabled(&self, key: LayerKey, enabled: bool) {
        self.shared.update(|state| state.enabled.set(key, enabled));
    }

    /// Overlays of enabled layers in fixed layer order.
    #[must_use]
    pub fn overlays(&self) -> Vec<MapOverlay> {
        let state = self.shared.state();
        state.cache.visible_overlays(&state.enabled)
    }

    /// Markers of enabled layers in fixed layer order.
    #[must_use]
    pub fn markers(&self) -> Vec<MapMarker> {
        let state = self.shared.state();
        state.cache.visible_markers(&state.enabled)
    }

    /// Current layer toggles.
    #[must_use]
    pub fn enabled_layers(&self) -> EnabledLayers {
        self.shared.state().enabled.clone()
    }

    /// Whether any refresh is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.state().in_flight > 0
    }

    /// When a refresh last applied.
    #[must_use]
    pub fn last_updated(&self) -> Option<SystemTime> {
        self.shared.state().last_updated
    }

    /// Message of the last failed refresh, if not yet cleared.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.shared.state().error.clone()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LayerSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receive every snapshot published from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LayerSnapshot> {
        self.shared.snapshots.subscribe()
    }
}

impl<S: FeedSource + 'static> Drop for LayerController<S> {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler().take() {
            scheduler.shutdown.cancel();
        }
    }
}
