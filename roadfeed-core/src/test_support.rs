//! Test-only [`FeedSource`] implementation backed by in-memory records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::{FeedSource, FetchError, LayerKey};

#[derive(Debug, Clone)]
enum StubResponse {
    Records(Vec<Value>),
    Error(FetchError),
}

/// Stub `FeedSource` returning pre-configured responses per layer.
///
/// Layers without a configured response return an empty record array.
/// Responses can be replaced between refreshes through the `&self` setters,
/// and every call is counted so tests can assert that nothing refetched.
///
/// # Example
///
/// ```
/// use roadfeed_core::test_support::StubFeedSource;
/// use roadfeed_core::{FeedSource, LayerKey};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = StubFeedSource::default()
///     .with_records(LayerKey::Incidents, vec![json!({"id": 1})]);
/// let records = source.fetch_records(LayerKey::Incidents).await.expect("records");
/// assert_eq!(records.len(), 1);
/// assert_eq!(source.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StubFeedSource {
    responses: Mutex<HashMap<LayerKey, StubResponse>>,
    calls: AtomicUsize,
}

impl StubFeedSource {
    /// Configure `layer` to return `records`.
    #[must_use]
    pub fn with_records(self, layer: LayerKey, records: Vec<Value>) -> Self {
        self.set_records(layer, records);
        self
    }

    /// Configure `layer` to fail with `error`.
    #[must_use]
    pub fn with_error(self, layer: LayerKey, error: FetchError) -> Self {
        self.set_error(layer, error);
        self
    }

    /// Replace the response for `layer` with `records`.
    pub fn set_records(&self, layer: LayerKey, records: Vec<Value>) {
        self.responses()
            .insert(layer, StubResponse::Records(records));
    }

    /// Replace the response for `layer` with `error`.
    pub fn set_error(&self, layer: LayerKey, error: FetchError) {
        self.responses().insert(layer, StubResponse::Error(error));
    }

    /// Make every layer fail with a network error.
    pub fn fail_all(&self) {
        for layer in LayerKey::ALL {
            self.set_error(layer, unreachable_error(layer));
        }
    }

    /// Number of `fetch_records` calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn responses(&self) -> std::sync::MutexGuard<'_, HashMap<LayerKey, StubResponse>> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Network error used by [`StubFeedSource::fail_all`].
#[must_use]
pub fn unreachable_error(layer: LayerKey) -> FetchError {
    FetchError::Network {
        url: format!("https://feeds.example.org/{layer}"),
        message: "connection refused".to_owned(),
    }
}

#[async_trait]
impl FeedSource for StubFeedSource {
    async fn fetch_records(&self, layer: LayerKey) -> Result<Vec<Value>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses().get(&layer) {
            Some(StubResponse::Records(records)) => Ok(records.clone()),
            Some(StubResponse::Error(error)) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }
}
