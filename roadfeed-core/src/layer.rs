//! Layer identifiers and the per-layer enabled flags.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One named category of map data, backed by exactly one upstream feed.
///
/// The declaration order is the fixed display order used when the visible
/// marker and overlay arrays are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKey {
    /// Road condition polylines.
    RoadConditions,
    /// Traffic incidents (multipoint, decomposed).
    Incidents,
    /// Roadside weather stations.
    WeatherStations,
    /// Snow plow vehicle positions.
    SnowPlows,
    /// Planned events such as closures and races.
    PlannedEvents,
    /// Dynamic message signs.
    DmsSigns,
    /// WZDx work zones.
    WorkZones,
}

impl LayerKey {
    /// Every layer in fixed display order.
    pub const ALL: [Self; 7] = [
        Self::RoadConditions,
        Self::Incidents,
        Self::WeatherStations,
        Self::SnowPlows,
        Self::PlannedEvents,
        Self::DmsSigns,
        Self::WorkZones,
    ];

    /// The camelCase key used in configuration and serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoadConditions => "roadConditions",
            Self::Incidents => "incidents",
            Self::WeatherStations => "weatherStations",
            Self::SnowPlows => "snowPlows",
            Self::PlannedEvents => "plannedEvents",
            Self::DmsSigns => "dmsSigns",
            Self::WorkZones => "workZones",
        }
    }

    /// Whether the layer renders as polylines rather than point markers.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::RoadConditions | Self::WorkZones)
    }

    /// Default visibility before the user toggles anything.
    #[must_use]
    pub const fn enabled_by_default(self) -> bool {
        matches!(self, Self::RoadConditions | Self::Incidents)
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer {0:?}")]
pub struct ParseLayerKeyError(pub String);

impl FromStr for LayerKey {
    type Err = ParseLayerKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseLayerKeyError(value.to_owned()))
    }
}

/// Visibility flag for every layer.
///
/// Independent of the cached data: flipping a flag only changes which cached
/// entities are exposed, it never implies a refetch.
///
/// # Examples
/// ```
/// use roadfeed_core::{EnabledLayers, LayerKey};
///
/// let mut layers = EnabledLayers::default();
/// assert!(layers.is_enabled(LayerKey::Incidents));
/// assert!(!layers.toggle(LayerKey::Incidents));
/// assert!(!layers.is_enabled(LayerKey::Incidents));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledLayers(BTreeMap<LayerKey, bool>);

impl Default for EnabledLayers {
    fn default() -> Self {
        Self(
            LayerKey::ALL
                .into_iter()
                .map(|key| (key, key.enabled_by_default()))
                .collect(),
        )
    }
}

impl EnabledLayers {
    /// Enable exactly the given layers and disable the rest.
    pub fn only<I>(enabled: I) -> Self
    where
        I: IntoIterator<Item = LayerKey>,
    {
        let mut layers = Self(LayerKey::ALL.into_iter().map(|key| (key, false)).collect());
        for key in enabled {
            layers.set(key, true);
        }
        layers
    }

    /// Whether `key` is currently visible.
    #[must_use]
    pub fn is_enabled(&self, key: LayerKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// Flip the flag for `key`, returning the new value.
    pub fn toggle(&mut self, key: LayerKey) -> bool {
        let flag = self.0.entry(key).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Set the flag for `key` explicitly.
    pub fn set(&mut self, key: LayerKey, enabled: bool) {
        self.0.insert(key, enabled);
    }

    /// Enabled layers in fixed display order.
    pub fn enabled(&self) -> impl Iterator<Item = LayerKey> + '_ {
        LayerKey::ALL
            .into_iter()
            .filter(|key| self.is_enabled(*key))
    }

    /// All flags in fixed display order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKey, bool)> + '_ {
        LayerKey::ALL
            .into_iter()
            .map(|key| (key, self.is_enabled(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_enable_two_layers() {
        let layers = EnabledLayers::default();
        let enabled: Vec<_> = layers.enabled().collect();
        assert_eq!(enabled, vec![LayerKey::RoadConditions, LayerKey::Incidents]);
    }

    #[rstest]
    fn toggle_twice_restores_flag() {
        let mut layers = EnabledLayers::default();
        layers.toggle(LayerKey::SnowPlows);
        layers.toggle(LayerKey::SnowPlows);
        assert_eq!(layers, EnabledLayers::default());
    }

    #[rstest]
    fn only_disables_unlisted_layers() {
        let layers = EnabledLayers::only([LayerKey::WorkZones, LayerKey::DmsSigns]);
        let enabled: Vec<_> = layers.enabled().collect();
        assert_eq!(enabled, vec![LayerKey::DmsSigns, LayerKey::WorkZones]);
    }

    #[rstest]
    #[case("roadConditions", LayerKey::RoadConditions)]
    #[case("dmssigns", LayerKey::DmsSigns)]
    #[case("workZones", LayerKey::WorkZones)]
    fn parses_layer_names(#[case] raw: &str, #[case] expected: LayerKey) {
        assert_eq!(raw.parse::<LayerKey>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_layer_names() {
        let err = "ferries".parse::<LayerKey>().expect_err("unknown layer");
        assert_eq!(err, ParseLayerKeyError("ferries".to_owned()));
    }

    #[rstest]
    fn serializes_as_camel_case_map() {
        let json = serde_json::to_value(EnabledLayers::only([LayerKey::SnowPlows]))
            .expect("serialize flags");
        assert_eq!(json["snowPlows"], serde_json::json!(true));
        assert_eq!(json["roadConditions"], serde_json::json!(false));
    }

    #[rstest]
    fn display_matches_serde_name() {
        for key in LayerKey::ALL {
            let json = serde_json::to_value(key).expect("serialize key");
            assert_eq!(json, serde_json::json!(key.to_string()));
        }
    }
}
