//! Normalized entities held per layer.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{EnabledLayers, LayerKey, MapMarker, MapOverlay, MarkerKind, OverlayKind};

/// One normalized entity array per layer.
///
/// A cache is built in full by the normalizers and swapped in as a whole;
/// there is no per-layer merge. Layers that were never filled read as empty.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use roadfeed_core::{EnabledLayers, LayerCache, MapMarker, MarkerKind};
///
/// let marker = MapMarker::new("1", MarkerKind::Incidents, Coord { x: 0.0, y: 0.0 }, "Crash")
///     .expect("valid marker");
/// let mut cache = LayerCache::default();
/// cache.insert_markers(MarkerKind::Incidents, vec![marker]);
///
/// assert_eq!(cache.visible_markers(&EnabledLayers::default()).len(), 1);
/// assert!(cache.visible_markers(&EnabledLayers::only([])).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerCache {
    overlays: BTreeMap<LayerKey, Vec<MapOverlay>>,
    markers: BTreeMap<LayerKey, Vec<MapMarker>>,
}

impl LayerCache {
    /// Store the overlays for one overlay layer, replacing any previous slice.
    pub fn insert_overlays(&mut self, kind: OverlayKind, overlays: Vec<MapOverlay>) {
        self.overlays.insert(kind.layer(), overlays);
    }

    /// Store the markers for one marker layer, replacing any previous slice.
    pub fn insert_markers(&mut self, kind: MarkerKind, markers: Vec<MapMarker>) {
        self.markers.insert(kind.layer(), markers);
    }

    /// Cached overlays for `key`; empty for marker layers.
    #[must_use]
    pub fn overlays(&self, key: LayerKey) -> &[MapOverlay] {
        self.overlays.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cached markers for `key`; empty for overlay layers.
    #[must_use]
    pub fn markers(&self, key: LayerKey) -> &[MapMarker] {
        self.markers.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of cached entities for `key`.
    #[must_use]
    pub fn layer_len(&self, key: LayerKey) -> usize {
        self.overlays(key).len() + self.markers(key).len()
    }

    /// Whether no layer holds any entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        LayerKey::ALL.into_iter().all(|key| self.layer_len(key) == 0)
    }

    /// Overlays of every enabled layer, concatenated in fixed layer order.
    #[must_use]
    pub fn visible_overlays(&self, enabled: &EnabledLayers) -> Vec<MapOverlay> {
        enabled
            .enabled()
            .flat_map(|key| self.overlays(key).iter().cloned())
            .collect()
    }

    /// Markers of every enabled layer, concatenated in fixed layer order.
    #[must_use]
    pub fn visible_markers(&self, enabled: &EnabledLayers) -> Vec<MapMarker> {
        enabled
            .enabled()
            .flat_map(|key| self.markers(key).iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn marker(id: &str, kind: MarkerKind) -> MapMarker {
        MapMarker::new(id, kind, Coord { x: 1.0, y: 1.0 }, id).expect("valid marker")
    }

    fn overlay(id: &str, kind: OverlayKind) -> MapOverlay {
        MapOverlay::new(
            id,
            kind,
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }],
            "Route",
            "#000000",
        )
        .expect("valid overlay")
    }

    #[fixture]
    fn cache() -> LayerCache {
        let mut cache = LayerCache::default();
        cache.insert_markers(MarkerKind::DmsSigns, vec![marker("sign", MarkerKind::DmsSigns)]);
        cache.insert_markers(
            MarkerKind::Incidents,
            vec![
                marker("crash#0", MarkerKind::Incidents),
                marker("crash#1", MarkerKind::Incidents),
            ],
        );
        cache.insert_overlays(OverlayKind::WorkZone, vec![overlay("wz", OverlayKind::WorkZone)]);
        cache.insert_overlays(
            OverlayKind::RoadCondition,
            vec![overlay("rc", OverlayKind::RoadCondition)],
        );
        cache
    }

    #[rstest]
    fn visible_markers_follow_layer_order(cache: LayerCache) {
        let enabled = EnabledLayers::only([LayerKey::DmsSigns, LayerKey::Incidents]);
        let ids: Vec<_> = cache
            .visible_markers(&enabled)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["crash#0", "crash#1", "sign"]);
    }

    #[rstest]
    fn visible_overlays_skip_disabled_layers(cache: LayerCache) {
        let ids: Vec<_> = cache
            .visible_overlays(&EnabledLayers::default())
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["rc"]);
    }

    #[rstest]
    fn unknown_layers_read_empty() {
        let cache = LayerCache::default();
        assert!(cache.is_empty());
        assert!(cache.markers(LayerKey::SnowPlows).is_empty());
        assert!(cache.overlays(LayerKey::Incidents).is_empty());
    }

    #[rstest]
    fn layer_len_counts_either_shape(cache: LayerCache) {
        assert_eq!(cache.layer_len(LayerKey::Incidents), 2);
        assert_eq!(cache.layer_len(LayerKey::WorkZones), 1);
        assert_eq!(cache.layer_len(LayerKey::SnowPlows), 0);
    }
}
