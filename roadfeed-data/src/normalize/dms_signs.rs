//! Dynamic message sign feed: Point features with a display status.

use roadfeed_core::{LayerKey, MapMarker, MarkerKind};
use serde::Deserialize;
use serde_json::Value;

use super::geojson::{Feature, Scalar, text};
use super::{RecordError, normalize_each};

const FALLBACK_TITLE: &str = "DMS Sign";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignProperties {
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default)]
    name: Option<Scalar>,
    #[serde(default)]
    status: Option<Scalar>,
    #[serde(default)]
    route_name: Option<Scalar>,
}

fn display_status(raw: &str) -> String {
    match raw {
        "on" => "Active".to_owned(),
        "off" => "Off".to_owned(),
        other => other.to_owned(),
    }
}

/// Normalize DMS sign records.
///
/// The subtitle joins the mapped display status and the route name with
/// `" • "`, omitting whichever is absent.
#[must_use]
pub fn normalize_dms_signs(records: &[Value]) -> Vec<MapMarker> {
    normalize_each(LayerKey::DmsSigns, records, normalize_record)
}

fn normalize_record(_: usize, record: &Value) -> Result<Vec<MapMarker>, RecordError> {
    let feature = Feature::<SignProperties>::from_record(record)?;
    let props = feature.properties();
    let id = text(props.id.as_ref())
        .or_else(|| feature.feature_id())
        .ok_or(RecordError::MissingIdentifier)?;
    let coord = feature.point()?;

    let parts: Vec<String> = [
        text(props.status.as_ref()).map(|status| display_status(&status)),
        text(props.route_name.as_ref()),
    ]
    .into_iter()
    .flatten()
    .collect();
    let subtitle = (!parts.is_empty()).then(|| parts.join(" • "));

    let title = text(props.name.as_ref()).unwrap_or_else(|| FALLBACK_TITLE.to_owned());
    let marker = MapMarker::new(id, MarkerKind::DmsSigns, coord, title)?
        .with_subtitle(subtitle)
        .with_raw_data(record.clone());
    Ok(vec![marker])
}
