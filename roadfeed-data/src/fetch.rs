//! Fail-soft feed fetching and the all-layers fan-out.
//!
//! [`fetch_feed`] is the boundary where a [`FetchError`] stops propagating:
//! it always returns a [`FeedOutcome`], logging failures instead of raising
//! them. [`fetch_all_layer_data`] polls all seven feeds concurrently and
//! collects their outcomes into a [`RawLayerData`].

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use futures_util::future::join_all;
use log::{error, warn};
use roadfeed_core::{FeedSource, FetchError, LayerKey};
use serde_json::Value;

/// Result of fetching one feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// The feed answered with these raw records.
    Fetched(Vec<Value>),
    /// The feed failed; its layer contributes no records this cycle.
    Failed(FetchError),
}

impl FeedOutcome {
    /// Raw records, or an empty slice for a failed feed.
    #[must_use]
    pub fn records(&self) -> &[Value] {
        match self {
            Self::Fetched(records) => records,
            Self::Failed(_) => &[],
        }
    }

    /// Consume the outcome, degrading a failure to an empty array.
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Fetched(records) => records,
            Self::Failed(_) => Vec::new(),
        }
    }

    /// The failure, if the feed failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FetchError> {
        match self {
            Self::Fetched(_) => None,
            Self::Failed(err) => Some(err),
        }
    }

    /// Whether the feed failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failure().is_some()
    }
}

/// Fetch one feed, converting any failure into [`FeedOutcome::Failed`].
///
/// Never returns an error: a failure is logged at `warn` level and reported
/// through the outcome.
pub async fn fetch_feed<S>(source: &S, layer: LayerKey) -> FeedOutcome
where
    S: FeedSource + ?Sized,
{
    match source.fetch_records(layer).await {
        Ok(records) => FeedOutcome::Fetched(records),
        Err(err) => {
            warn!("{layer} feed failed: {err}");
            FeedOutcome::Failed(err)
        }
    }
}

/// Raw records for every layer from one fetch cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLayerData {
    feeds: BTreeMap<LayerKey, FeedOutcome>,
    aborted: bool,
}

impl RawLayerData {
    /// Build from per-layer outcomes. Layers without an outcome read as
    /// fetched-but-empty.
    #[must_use]
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = (LayerKey, FeedOutcome)>) -> Self {
        Self {
            feeds: outcomes.into_iter().collect(),
            aborted: false,
        }
    }

    /// Record for a fan-in that did not complete: every layer is empty and
    /// marked failed.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            feeds: BTreeMap::new(),
            aborted: true,
        }
    }

    /// Raw records for `layer`; empty for failed or missing feeds.
    #[must_use]
    pub fn records(&self, layer: LayerKey) -> &[Value] {
        self.feeds
            .get(&layer)
            .map(FeedOutcome::records)
            .unwrap_or_default()
    }

    /// Outcome for `layer`, if one was recorded.
    #[must_use]
    pub fn outcome(&self, layer: LayerKey) -> Option<&FeedOutcome> {
        self.feeds.get(&layer)
    }

    /// Layers whose feed failed, in fixed layer order.
    #[must_use]
    pub fn failed_layers(&self) -> Vec<LayerKey> {
        if self.aborted {
            return LayerKey::ALL.to_vec();
        }
        LayerKey::ALL
            .into_iter()
            .filter(|layer| self.feeds.get(layer).is_some_and(FeedOutcome::is_failed))
            .collect()
    }

    /// Whether every feed failed.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.failed_layers().len() == LayerKey::ALL.len()
    }

    /// Whether the fan-in was aborted by a panic.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

/// Fetch all seven feeds concurrently.
///
/// The futures are polled together inside the calling task, so the latency
/// is that of the slowest feed. A panic raised while joining is caught and
/// reported as [`RawLayerData::aborted`].
pub async fn fetch_all_layer_data<S>(source: &S) -> RawLayerData
where
    S: FeedSource + ?Sized,
{
    let fan_out = join_all(LayerKey::ALL.map(|layer| async move {
        let outcome = fetch_feed(source, layer).await;
        (layer, outcome)
    }));

    match AssertUnwindSafe(fan_out).catch_unwind().await {
        Ok(outcomes) => RawLayerData::from_outcomes(outcomes),
        Err(_) => {
            error!("feed fan-in panicked; treating every feed as failed");
            RawLayerData::aborted()
        }
    }
}
