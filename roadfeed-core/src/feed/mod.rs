//! Retrieve raw records for one layer from an upstream feed.
//!
//! The [`FeedSource`] trait abstracts the transport so the fetch and refresh
//! logic can run against a stub in tests. Implementations return
//! [`FetchError`] for every transport or decode failure; turning those
//! failures into empty results is the caller's job.

mod error;
mod source;

pub use error::FetchError;
pub use source::FeedSource;
