//! Host application foreground/background state.
//!
//! The host owns an [`AppLifecycle`] and reports state changes through it.
//! Controllers observe those changes through a [`LifecycleListener`]. When
//! the host side is dropped, listeners treat the application as permanently
//! foregrounded so that refreshes are never blocked by a vanished host.

use serde::Serialize;
use tokio::sync::watch;

/// Whether the host application is visible to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AppState {
    /// Visible; refreshes run.
    #[default]
    Foreground,
    /// Hidden; every refresh trigger is suppressed.
    Background,
}

/// Host-side publisher of [`AppState`] changes.
///
/// # Examples
/// ```
/// use roadfeed_layers::{AppLifecycle, AppState};
///
/// let lifecycle = AppLifecycle::default();
/// let listener = lifecycle.listener();
/// lifecycle.set_state(AppState::Background);
///
/// assert_eq!(listener.current(), AppState::Background);
/// drop(lifecycle);
/// assert_eq!(listener.current(), AppState::Foreground);
/// ```
#[derive(Debug)]
pub struct AppLifecycle {
    tx: watch::Sender<AppState>,
}

impl Default for AppLifecycle {
    fn default() -> Self {
        Self::new(AppState::Foreground)
    }
}

impl AppLifecycle {
    /// Create a publisher starting in `initial`.
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Report a state change. Repeating the current state notifies no one.
    pub fn set_state(&self, state: AppState) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    /// The last reported state.
    #[must_use]
    pub fn state(&self) -> AppState {
        *self.tx.borrow()
    }

    /// Register a new listener.
    #[must_use]
    pub fn listener(&self) -> LifecycleListener {
        LifecycleListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Controller-side view of the host state.
///
/// Dropping the listener deregisters it.
#[derive(Debug, Clone)]
pub struct LifecycleListener {
    rx: watch::Receiver<AppState>,
}

impl LifecycleListener {
    /// The current state; [`AppState::Foreground`] once the host is gone.
    #[must_use]
    pub fn current(&self) -> AppState {
        if self.rx.has_changed().is_err() {
            return AppState::Foreground;
        }
        *self.rx.borrow()
    }

    /// Whether refreshes may run.
    #[must_use]
    pub fn is_foreground(&self) -> bool {
        self.current() == AppState::Foreground
    }

    /// Wait for the next state change.
    ///
    /// Returns `None` once the host side has been dropped; later calls
    /// return `None` immediately.
    pub async fn changed(&mut self) -> Option<AppState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn listener_sees_changes_in_order() {
        let lifecycle = AppLifecycle::default();
        let mut listener = lifecycle.listener();

        lifecycle.set_state(AppState::Background);
        assert_eq!(listener.changed().await, Some(AppState::Background));

        lifecycle.set_state(AppState::Foreground);
        assert_eq!(listener.changed().await, Some(AppState::Foreground));
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_state_does_not_notify() {
        let lifecycle = AppLifecycle::new(AppState::Background);
        let listener = lifecycle.listener();

        lifecycle.set_state(AppState::Background);

        assert!(!listener.rx.has_changed().expect("host alive"));
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_host_reads_as_foreground() {
        let lifecycle = AppLifecycle::new(AppState::Background);
        let mut listener = lifecycle.listener();
        assert!(!listener.is_foreground());

        drop(lifecycle);

        assert!(listener.is_foreground());
        assert_eq!(listener.changed().await, None);
    }

    #[rstest]
    fn dropping_listeners_deregisters_them() {
        let lifecycle = AppLifecycle::default();
        let first = lifecycle.listener();
        let second = first.clone();
        assert_eq!(lifecycle.listener_count(), 2);

        drop(first);
        drop(second);

        assert_eq!(lifecycle.listener_count(), 0);
    }
}
