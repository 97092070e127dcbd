//! Core domain types for the roadfeed map-layer pipeline.
//!
//! These models keep downstream components honest: entity constructors
//! return `Result` so that an invalid coordinate or a degenerate line never
//! reaches the layer cache.

#![forbid(unsafe_code)]

pub mod cache;
pub mod coordinate;
pub mod entity;
pub mod feed;
pub mod layer;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cache::LayerCache;
pub use coordinate::{is_valid_position, position_from_value, validate_lon_lat};
pub use entity::{EntityError, MapMarker, MapOverlay, MarkerCoordinate, MarkerKind, OverlayKind};
pub use feed::{FeedSource, FetchError};
pub use layer::{EnabledLayers, LayerKey, ParseLayerKeyError};
