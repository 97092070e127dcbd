//! Facade crate for the roadfeed live map-layer pipeline.
//!
//! This crate re-exports the core domain types and exposes the HTTP feed
//! source and the layer controller behind feature flags.

#![forbid(unsafe_code)]

pub use roadfeed_core::{
    EnabledLayers, FeedSource, FetchError, LayerCache, LayerKey, MapMarker, MapOverlay,
    MarkerCoordinate, MarkerKind, OverlayKind, is_valid_position, position_from_value,
    validate_lon_lat,
};

#[cfg(feature = "http")]
pub use roadfeed_data::{
    FeedConfig, FeedOutcome, HttpFeedSource, RawLayerData, SourceBuildError, fetch_all_layer_data,
    fetch_feed, normalize::normalize_all,
};

#[cfg(feature = "layers")]
pub use roadfeed_layers::{
    AppLifecycle, AppState, ControllerConfig, LayerController, LayerSnapshot, RefreshError,
    RefreshOutcome, RefreshReport,
};
