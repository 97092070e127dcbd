//! Feed access and normalization for the roadfeed pipeline.
//!
//! Responsibilities:
//! - Fetch each upstream feed over HTTP with a bounded timeout.
//! - Fan the seven feeds out concurrently and collect fail-soft outcomes.
//! - Normalize each feed's raw records into map entities.
//!
//! Boundaries:
//! - Do not encode refresh or visibility rules (live in `roadfeed-layers`).
//! - Do not retry; one request per feed per cycle.
//!
//! Invariants:
//! - Nothing in this crate propagates a fetch or record error past
//!   [`fetch_feed`] or the normalizers; failures are logged and degraded.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod fetch;
pub mod http;
pub mod normalize;

pub use fetch::{FeedOutcome, RawLayerData, fetch_all_layer_data, fetch_feed};
pub use http::{FeedConfig, HttpFeedSource, SourceBuildError};
pub use normalize::{RecordError, normalize_all};
