//! Published view of the controller state.

use std::time::{SystemTime, UNIX_EPOCH};

use roadfeed_core::{EnabledLayers, LayerKey, MapMarker, MapOverlay};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a refresh left the cache untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Every feed failed; treated as an upstream outage.
    #[error("all {count} feeds failed")]
    AllFeedsFailed {
        /// Number of feeds attempted.
        count: usize,
    },
    /// The concurrent fetch did not complete.
    #[error("feed fan-in aborted before completion")]
    FanInAborted,
}

/// Summary of an applied refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    /// Feeds that failed this cycle; their layers are now empty.
    pub failed_layers: Vec<LayerKey>,
    /// Entities cached across all layers, enabled or not.
    pub entity_count: usize,
}

/// Result of one refresh trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new cache replaced the old one.
    Applied(RefreshReport),
    /// The refresh failed; the previous cache is kept.
    Failed(RefreshError),
    /// The host was backgrounded, so nothing was fetched.
    Suppressed,
    /// A later-started refresh had already applied; the result was dropped.
    Superseded,
}

impl RefreshOutcome {
    /// Whether the cache was replaced.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Everything a renderer needs, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSnapshot {
    /// Overlays of enabled layers in fixed layer order.
    pub overlays: Vec<MapOverlay>,
    /// Markers of enabled layers in fixed layer order.
    pub markers: Vec<MapMarker>,
    /// Current layer toggles.
    pub enabled_layers: EnabledLayers,
    /// Whether any refresh is in flight.
    pub is_loading: bool,
    /// When a refresh last applied, as milliseconds since the Unix epoch.
    #[serde(serialize_with = "epoch_millis")]
    pub last_updated: Option<SystemTime>,
    /// Message of the last failed refresh, cleared by the next applied one.
    pub error: Option<String>,
}

fn epoch_millis<S: Serializer>(value: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error> {
    let millis = value
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    millis.serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Duration;

    #[rstest]
    fn snapshot_serializes_for_renderers() {
        let snapshot = LayerSnapshot {
            last_updated: Some(UNIX_EPOCH + Duration::from_millis(1_234)),
            error: Some(RefreshError::AllFeedsFailed { count: 7 }.to_string()),
            ..LayerSnapshot::default()
        };

        let value = serde_json::to_value(&snapshot).expect("serialize snapshot");

        assert_eq!(value["lastUpdated"], json!(1_234));
        assert_eq!(value["isLoading"], json!(false));
        assert_eq!(value["error"], json!("all 7 feeds failed"));
        assert_eq!(value["enabledLayers"]["incidents"], json!(true));
    }

    #[rstest]
    fn never_updated_serializes_as_null() {
        let value = serde_json::to_value(LayerSnapshot::default()).expect("serialize snapshot");
        assert!(value["lastUpdated"].is_null());
    }
}
