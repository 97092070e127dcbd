//! HTTP-backed feed source for the upstream traffic data API.
//!
//! This module provides [`HttpFeedSource`], an implementation of
//! [`roadfeed_core::FeedSource`] that issues one time-bounded `GET` per
//! layer and decodes the JSON envelope into raw records.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use roadfeed_core::{FeedSource, LayerKey};
//! use roadfeed_data::{FeedConfig, HttpFeedSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FeedConfig::new("https://data.cotrip.org/api/v1", "secret")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_endpoint(LayerKey::DmsSigns, "/signs");
//! let source = HttpFeedSource::with_config(config)?;
//!
//! let signs = source.fetch_records(LayerKey::DmsSigns).await?;
//! println!("{} signs", signs.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod envelope;
mod source;

pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FeedConfig};
pub use source::{HttpFeedSource, SourceBuildError};
