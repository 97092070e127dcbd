//! Road condition feed: LineString segments coloured by current conditions.

use roadfeed_core::{LayerKey, MapOverlay, OverlayKind};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Geometry, Scalar, line_vertices, text};
use super::{RecordError, UNKNOWN_ROUTE, normalize_each};

const CLOSED_COLOR: &str = "#dc2626";
const WINTRY_COLOR: &str = "#7c3aed";
const WET_COLOR: &str = "#f59e0b";
const CLEAR_COLOR: &str = "#22c55e";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadProperties {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    route_name: Option<Scalar>,
    #[serde(default)]
    name: Option<Scalar>,
    #[serde(default)]
    current_conditions: Option<Vec<Condition>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Condition {
    #[serde(default)]
    condition_description: Option<Scalar>,
}

/// Stroke colour for a conditions summary, worst condition first.
fn condition_color(conditions: Option<&str>) -> &'static str {
    let Some(summary) = conditions.map(str::to_lowercase) else {
        return CLEAR_COLOR;
    };
    let mentions = |words: &[&str]| words.iter().any(|word| summary.contains(word));
    if mentions(&["closed", "closure"]) {
        CLOSED_COLOR
    } else if mentions(&["ice", "icy", "snow"]) {
        WINTRY_COLOR
    } else if mentions(&["wet", "slush"]) {
        WET_COLOR
    } else {
        CLEAR_COLOR
    }
}

/// Normalize road condition records.
///
/// Invalid vertices are dropped; a segment left with fewer than two is
/// skipped. Segments without an identifier get `roadConditions-{index}`.
#[must_use]
pub fn normalize_road_conditions(records: &[Value]) -> Vec<MapOverlay> {
    normalize_each(LayerKey::RoadConditions, records, normalize_record)
}

fn normalize_record(index: usize, record: &Value) -> Result<Vec<MapOverlay>, RecordError> {
    let feature = Feature::<RoadProperties>::from_record(record)?;
    let props = feature.properties();
    let geometry = feature.geometry()?;
    if !matches!(geometry, Geometry::LineString { .. }) {
        return Err(RecordError::UnsupportedGeometry);
    }
    let vertices = line_vertices(geometry.positions()?)?;

    let id = text(props.id.as_ref())
        .or_else(|| feature.feature_id())
        .unwrap_or_else(|| format!("{}-{index}", LayerKey::RoadConditions));
    let route_name = text(props.route_name.as_ref())
        .or_else(|| text(props.name.as_ref()))
        .unwrap_or_else(|| UNKNOWN_ROUTE.to_owned());
    let descriptions: Vec<String> = props
        .current_conditions
        .iter()
        .flatten()
        .filter_map(|condition| text(condition.condition_description.as_ref()))
        .collect();
    let conditions = (!descriptions.is_empty()).then(|| descriptions.join(", "));
    let color = condition_color(conditions.as_deref());

    let overlay = MapOverlay::new(id, OverlayKind::RoadCondition, vertices, route_name, color)?
        .with_conditions(conditions)
        .with_raw_data(record.clone());
    Ok(vec![overlay])
}
