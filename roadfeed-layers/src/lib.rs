//! Layer cache, refresh scheduling and host lifecycle gating.
//!
//! [`LayerController`] owns the normalized cache and the per-layer toggles.
//! It refreshes on start, on a TTL timer and whenever the host returns to
//! the foreground, and publishes a [`LayerSnapshot`] after every change.
//!
//! Invariants:
//! - The cache is replaced wholesale or not at all; readers never observe a
//!   mix of two refresh cycles.
//! - Toggling a layer never triggers a fetch.
//! - No refresh runs while the host is backgrounded.

#![forbid(unsafe_code)]

mod controller;
pub mod lifecycle;
mod scheduler;
mod snapshot;

pub use controller::{ControllerConfig, DEFAULT_TTL, LayerController};
pub use lifecycle::{AppLifecycle, AppState, LifecycleListener};
pub use snapshot::{LayerSnapshot, RefreshError, RefreshOutcome, RefreshReport};
