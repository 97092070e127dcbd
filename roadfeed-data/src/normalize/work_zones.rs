//! Work zone feed: WZDx features with LineString or MultiPoint geometry.

use roadfeed_core::{LayerKey, MapOverlay, OverlayKind};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Scalar, line_vertices, text};
use super::{RecordError, UNKNOWN_ROUTE, normalize_each};

const WORK_ZONE_COLOR: &str = "#f97316";

#[derive(Debug, Clone, Default, Deserialize)]
struct WorkZoneProperties {
    #[serde(default)]
    core_details: Option<CoreDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CoreDetails {
    #[serde(default)]
    data_source_id: Option<Scalar>,
    #[serde(default)]
    event_type: Option<Scalar>,
    #[serde(default)]
    road_names: Option<Vec<Scalar>>,
    #[serde(default)]
    direction: Option<Scalar>,
    #[serde(default)]
    description: Option<Scalar>,
}

/// Normalize work zone records.
///
/// Both geometry kinds produce a `workZone` overlay from their valid
/// vertices. The id is the feature id, else `{data_source_id}-{index}`,
/// else `workZones-{index}`.
#[must_use]
pub fn normalize_work_zones(records: &[Value]) -> Vec<MapOverlay> {
    normalize_each(LayerKey::WorkZones, records, normalize_record)
}

fn normalize_record(index: usize, record: &Value) -> Result<Vec<MapOverlay>, RecordError> {
    let feature = Feature::<WorkZoneProperties>::from_record(record)?;
    let details = feature.properties().core_details.unwrap_or_default();
    let vertices = line_vertices(feature.geometry()?.positions()?)?;

    let id = feature
        .feature_id()
        .or_else(|| text(details.data_source_id.as_ref()).map(|source| format!("{source}-{index}")))
        .unwrap_or_else(|| format!("{}-{index}", LayerKey::WorkZones));
    let road_names: Vec<String> = details
        .road_names
        .iter()
        .flatten()
        .filter_map(Scalar::text)
        .collect();
    let route_name = if road_names.is_empty() {
        UNKNOWN_ROUTE.to_owned()
    } else {
        road_names.join(" / ")
    };

    let overlay = MapOverlay::new(id, OverlayKind::WorkZone, vertices, route_name, WORK_ZONE_COLOR)?
        .with_description(text(details.description.as_ref()))
        .with_direction(text(details.direction.as_ref()))
        .with_event_type(text(details.event_type.as_ref()))
        .with_raw_data(record.clone());
    Ok(vec![overlay])
}
