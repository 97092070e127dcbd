//! Incident feed: MultiPoint features decomposed into one marker per point.

use roadfeed_core::{LayerKey, MapMarker, MarkerKind, position_from_value};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Scalar, text};
use super::{RecordError, normalize_each};

const FALLBACK_TITLE: &str = "Incident";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentProperties {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default, rename = "type")]
    kind: Option<Scalar>,
    #[serde(default)]
    route_name: Option<Scalar>,
    #[serde(default)]
    traveler_information_message: Option<Scalar>,
}

/// Normalize incident records.
///
/// Each valid point of a record's `MultiPoint` becomes a marker with id
/// `{sourceId}#{index}`, where `index` is the point's position in the source
/// set. Invalid points are skipped individually, so ids may have gaps.
#[must_use]
pub fn normalize_incidents(records: &[Value]) -> Vec<MapMarker> {
    normalize_each(LayerKey::Incidents, records, normalize_record)
}

fn normalize_record(_: usize, record: &Value) -> Result<Vec<MapMarker>, RecordError> {
    let feature = Feature::<IncidentProperties>::from_record(record)?;
    let props = feature.properties();
    let source_id = text(props.id.as_ref())
        .or_else(|| feature.feature_id())
        .ok_or(RecordError::MissingIdentifier)?;
    let positions = feature.geometry()?.positions()?;

    let title = text(props.kind.as_ref()).unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let subtitle = text(props.route_name.as_ref())
        .or_else(|| text(props.traveler_information_message.as_ref()));

    let markers = positions
        .iter()
        .enumerate()
        .filter_map(|(index, position)| {
            position_from_value(position).map(|coord| (index, coord))
        })
        .map(|(index, coord)| {
            MapMarker::new(
                format!("{source_id}#{index}"),
                MarkerKind::Incidents,
                coord,
                title.clone(),
            )
            .map(|marker| {
                marker
                    .with_subtitle(subtitle.clone())
                    .with_raw_data(record.clone())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if markers.is_empty() {
        return Err(RecordError::InvalidCoordinate);
    }
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn incident(coordinates: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "MultiPoint", "coordinates": coordinates},
            "properties": {"id": "inc-9", "type": "Crash", "routeName": "I-70"}
        })
    }

    #[rstest]
    fn decomposes_points_with_positional_ids() {
        let markers = normalize_incidents(&[incident(json!([
            [-105.0, 39.7],
            [-105.1, 39.8],
            [-105.2, 39.9]
        ]))]);

        let ids: Vec<_> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["inc-9#0", "inc-9#1", "inc-9#2"]);
        assert!(markers.iter().all(|m| m.title == "Crash"));
        assert_eq!(markers[0].subtitle.as_deref(), Some("I-70"));
    }

    #[rstest]
    fn invalid_points_leave_gaps_in_ids() {
        let markers = normalize_incidents(&[incident(json!([
            [-105.0, 39.7],
            [-105.1, 139.8],
            [-105.2, 39.9]
        ]))]);

        let ids: Vec<_> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["inc-9#0", "inc-9#2"]);
    }

    #[rstest]
    fn feature_id_is_the_fallback_identifier() {
        let record = json!({
            "id": 88,
            "geometry": {"type": "MultiPoint", "coordinates": [[-104.9, 39.7]]},
            "properties": {}
        });

        let markers = normalize_incidents(&[record]);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "88#0");
        assert_eq!(markers[0].title, FALLBACK_TITLE);
    }

    #[rstest]
    #[case(json!({"geometry": {"type": "MultiPoint", "coordinates": [[0.0, 0.0]]}}))]
    #[case(json!({"properties": {"id": "x"}}))]
    #[case(json!({"properties": {"id": "x"}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}))]
    #[case(json!("not a feature"))]
    fn unusable_records_are_skipped(#[case] record: Value) {
        assert!(normalize_incidents(&[record]).is_empty());
    }
}
