//! Feed-source trait for per-layer record retrieval.

use async_trait::async_trait;
use serde_json::Value;

use crate::LayerKey;

use super::error::FetchError;

/// Fetch the raw record array backing one layer.
///
/// Implementers return the records exactly as received (GeoJSON features,
/// or vehicle records for [`LayerKey::SnowPlows`]). A response without a
/// record array is an empty `Ok`, not an error.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use roadfeed_core::{FeedSource, FetchError, LayerKey};
/// use serde_json::{Value, json};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl FeedSource for Fixed {
///     async fn fetch_records(&self, layer: LayerKey) -> Result<Vec<Value>, FetchError> {
///         Ok(vec![json!({ "layer": layer.as_str() })])
///     }
/// }
/// ```
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Return the raw records for `layer`.
    async fn fetch_records(&self, layer: LayerKey) -> Result<Vec<Value>, FetchError>;
}

#[async_trait]
impl<S> FeedSource for std::sync::Arc<S>
where
    S: FeedSource + ?Sized,
{
    async fn fetch_records(&self, layer: LayerKey) -> Result<Vec<Value>, FetchError> {
        (**self).fetch_records(layer).await
    }
}
