//! The two entity shapes handed to the rendering collaborator.
//!
//! [`MapMarker`] is a single point and [`MapOverlay`] is a polyline. Both
//! are built through validating constructors, so a cached entity always has
//! a non-empty id and in-range geometry.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{LayerKey, validate_lon_lat};

/// Errors returned by [`MapMarker::new`] and [`MapOverlay::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// The identifier was empty.
    #[error("entity id must not be empty")]
    EmptyId,
    /// A coordinate was non-finite or out of range.
    #[error("coordinate is outside the valid longitude/latitude range")]
    InvalidCoordinate,
    /// A polyline had fewer than two vertices.
    #[error("overlay needs at least two vertices, found {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },
}

/// Point layers that produce [`MapMarker`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// Traffic incidents.
    Incidents,
    /// Weather stations.
    WeatherStations,
    /// Snow plows.
    SnowPlows,
    /// Planned events.
    PlannedEvents,
    /// Dynamic message signs.
    DmsSigns,
}

impl MarkerKind {
    /// The cache slot this kind is stored under.
    #[must_use]
    pub const fn layer(self) -> LayerKey {
        match self {
            Self::Incidents => LayerKey::Incidents,
            Self::WeatherStations => LayerKey::WeatherStations,
            Self::SnowPlows => LayerKey::SnowPlows,
            Self::PlannedEvents => LayerKey::PlannedEvents,
            Self::DmsSigns => LayerKey::DmsSigns,
        }
    }
}

/// Line layers that produce [`MapOverlay`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayKind {
    /// Road condition segments.
    RoadCondition,
    /// Work zones.
    WorkZone,
}

impl OverlayKind {
    /// The cache slot this kind is stored under.
    #[must_use]
    pub const fn layer(self) -> LayerKey {
        match self {
            Self::RoadCondition => LayerKey::RoadConditions,
            Self::WorkZone => LayerKey::WorkZones,
        }
    }
}

/// Marker position in the order map SDKs expect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerCoordinate {
    /// Degrees north, within `[-90, 90]`.
    pub latitude: f64,
    /// Degrees east, within `[-180, 180]`.
    pub longitude: f64,
}

impl From<Coord<f64>> for MarkerCoordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            latitude: coord.y,
            longitude: coord.x,
        }
    }
}

/// A point entity on a marker layer.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use roadfeed_core::{MapMarker, MarkerKind};
///
/// # fn main() -> Result<(), roadfeed_core::EntityError> {
/// let marker = MapMarker::new("123#0", MarkerKind::Incidents, Coord { x: -105.0, y: 39.7 }, "Crash")?
///     .with_subtitle(Some("I-70".to_owned()));
/// assert_eq!(marker.coordinate.latitude, 39.7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Unique within its layer.
    pub id: String,
    /// Validated position.
    pub coordinate: MarkerCoordinate,
    /// Owning layer.
    pub layer_type: MarkerKind,
    /// Primary display text.
    pub title: String,
    /// Secondary display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// The originating source record, kept for detail views.
    pub raw_data: Value,
}

impl MapMarker {
    /// Validates and constructs a [`MapMarker`].
    pub fn new(
        id: impl Into<String>,
        layer_type: MarkerKind,
        coordinate: Coord<f64>,
        title: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EntityError::EmptyId);
        }
        let validated =
            validate_lon_lat(coordinate.x, coordinate.y).ok_or(EntityError::InvalidCoordinate)?;
        Ok(Self {
            id,
            coordinate: validated.into(),
            layer_type,
            title: title.into(),
            subtitle: None,
            raw_data: Value::Null,
        })
    }

    /// Attach secondary display text.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Attach the originating source record.
    #[must_use]
    pub fn with_raw_data(mut self, raw_data: Value) -> Self {
        self.raw_data = raw_data;
        self
    }
}

/// A polyline entity on an overlay layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOverlay {
    /// Unique within its layer.
    pub id: String,
    /// At least two validated vertices, `x = longitude`.
    pub coordinates: LineString<f64>,
    /// Owning layer.
    pub layer_type: OverlayKind,
    /// Road or route label.
    pub route_name: String,
    /// Stroke colour as a CSS hex string.
    pub color: String,
    /// Current driving conditions summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Direction of travel affected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Event classification, e.g. `work-zone`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// The originating source record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
}

impl MapOverlay {
    /// Validates and constructs a [`MapOverlay`].
    ///
    /// Every vertex must already be in range; callers drop invalid vertices
    /// before calling so that a partially broken line can still render.
    pub fn new(
        id: impl Into<String>,
        layer_type: OverlayKind,
        coordinates: Vec<Coord<f64>>,
        route_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EntityError::EmptyId);
        }
        if coordinates.len() < 2 {
            return Err(EntityError::TooFewVertices {
                count: coordinates.len(),
            });
        }
        if coordinates
            .iter()
            .any(|coord| validate_lon_lat(coord.x, coord.y).is_none())
        {
            return Err(EntityError::InvalidCoordinate);
        }
        Ok(Self {
            id,
            coordinates: LineString::new(coordinates),
            layer_type,
            route_name: route_name.into(),
            color: color.into(),
            conditions: None,
            description: None,
            direction: None,
            event_type: None,
            raw_data: None,
        })
    }

    /// Attach a conditions summary.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Option<String>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Attach the affected direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Option<String>) -> Self {
        self.direction = direction;
        self
    }

    /// Attach the event classification.
    #[must_use]
    pub fn with_event_type(mut self, event_type: Option<String>) -> Self {
        self.event_type = event_type;
        self
    }

    /// Attach the originating source record.
    #[must_use]
    pub fn with_raw_data(mut self, raw_data: Value) -> Self {
        self.raw_data = Some(raw_data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[rstest]
    fn marker_rejects_empty_id() {
        let err = MapMarker::new("", MarkerKind::DmsSigns, coord(0.0, 0.0), "Sign")
            .expect_err("empty id");
        assert_eq!(err, EntityError::EmptyId);
    }

    #[rstest]
    fn marker_rejects_out_of_range_coordinate() {
        let err = MapMarker::new("1", MarkerKind::SnowPlows, coord(10.0, 200.0), "Plow")
            .expect_err("latitude out of range");
        assert_eq!(err, EntityError::InvalidCoordinate);
    }

    #[rstest]
    fn marker_serializes_camel_case() {
        let marker = MapMarker::new("7", MarkerKind::WeatherStations, coord(-105.0, 39.7), "Vail")
            .expect("valid marker")
            .with_raw_data(json!({"id": 7}));
        let value = serde_json::to_value(&marker).expect("serialize marker");
        assert_eq!(value["layerType"], json!("weatherStations"));
        assert_eq!(value["coordinate"], json!({"latitude": 39.7, "longitude": -105.0}));
        assert_eq!(value["rawData"], json!({"id": 7}));
        assert!(value.get("subtitle").is_none());
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![coord(0.0, 0.0)])]
    fn overlay_requires_two_vertices(#[case] vertices: Vec<Coord<f64>>) {
        let count = vertices.len();
        let err = MapOverlay::new("r", OverlayKind::RoadCondition, vertices, "I-70", "#000")
            .expect_err("degenerate line");
        assert_eq!(err, EntityError::TooFewVertices { count });
    }

    #[rstest]
    fn overlay_rejects_invalid_vertex() {
        let err = MapOverlay::new(
            "w",
            OverlayKind::WorkZone,
            vec![coord(0.0, 0.0), coord(181.0, 0.0)],
            "US-6",
            "#000",
        )
        .expect_err("invalid vertex");
        assert_eq!(err, EntityError::InvalidCoordinate);
    }

    #[rstest]
    fn overlay_kind_maps_to_layer() {
        assert_eq!(OverlayKind::WorkZone.layer(), LayerKey::WorkZones);
        assert_eq!(MarkerKind::DmsSigns.layer(), LayerKey::DmsSigns);
    }
}
