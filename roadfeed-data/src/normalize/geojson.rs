//! Lenient GeoJSON DTOs shared by the feature-based normalizers.
//!
//! Only the parts the normalizers read are modelled. Display fields use
//! [`Scalar`] so that a number where a string was expected does not reject
//! the whole record.

use geo::Coord;
use roadfeed_core::position_from_value;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use super::RecordError;

/// A JSON scalar used as an identifier or display text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Other(Value),
}

impl Scalar {
    /// Trimmed, non-empty text form; `None` for blanks and non-scalars.
    pub fn text(&self) -> Option<String> {
        let rendered = match self {
            Self::Text(text) => text.trim().to_owned(),
            Self::Number(number) => number.to_string(),
            Self::Other(_) => return None,
        };
        (!rendered.is_empty()).then_some(rendered)
    }
}

/// Text of an optional scalar field.
pub fn text(field: Option<&Scalar>) -> Option<String> {
    field.and_then(Scalar::text)
}

/// Geometry member of a feature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        #[serde(default)]
        coordinates: Value,
    },
    MultiPoint {
        #[serde(default)]
        coordinates: Value,
    },
    LineString {
        #[serde(default)]
        coordinates: Value,
    },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Positions of a `MultiPoint` or `LineString`, in source order.
    ///
    /// Non-array coordinates read as no positions.
    pub fn positions(&self) -> Result<&[Value], RecordError> {
        match self {
            Self::MultiPoint { coordinates } | Self::LineString { coordinates } => Ok(coordinates
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or_default()),
            Self::Point { .. } | Self::Unsupported => Err(RecordError::UnsupportedGeometry),
        }
    }
}

/// A GeoJSON feature with feed-specific properties `P`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "P: DeserializeOwned + Default")]
pub struct Feature<P> {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<P>,
}

impl<P: DeserializeOwned + Default> Feature<P> {
    /// Decode a raw record.
    pub fn from_record(record: &Value) -> Result<Self, RecordError> {
        Ok(Self::deserialize(record)?)
    }

    /// Properties, defaulted when absent or `null`.
    pub fn properties(&self) -> P
    where
        P: Clone,
    {
        self.properties.clone().unwrap_or_default()
    }

    /// The geometry, or [`RecordError::MissingGeometry`].
    pub fn geometry(&self) -> Result<&Geometry, RecordError> {
        self.geometry.as_ref().ok_or(RecordError::MissingGeometry)
    }

    /// Text form of the feature-level `id`.
    pub fn feature_id(&self) -> Option<String> {
        text(self.id.as_ref())
    }

    /// The single validated position of a `Point` geometry.
    pub fn point(&self) -> Result<Coord<f64>, RecordError> {
        match self.geometry()? {
            Geometry::Point { coordinates } => {
                position_from_value(coordinates).ok_or(RecordError::InvalidCoordinate)
            }
            _ => Err(RecordError::UnsupportedGeometry),
        }
    }
}

/// Keep the valid positions, dropping the rest.
pub fn valid_vertices(positions: &[Value]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(position_from_value).collect()
}

/// Valid vertices of a line, or an error when fewer than two remain.
pub fn line_vertices(positions: &[Value]) -> Result<Vec<Coord<f64>>, RecordError> {
    let vertices = valid_vertices(positions);
    if vertices.len() < 2 {
        return Err(RecordError::TooFewVertices {
            count: vertices.len(),
        });
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Clone, Default, Deserialize)]
    struct Props {
        #[serde(default)]
        name: Option<Scalar>,
    }

    #[rstest]
    #[case(json!("  Vail  "), Some("Vail"))]
    #[case(json!(42), Some("42"))]
    #[case(json!(""), None)]
    #[case(json!({"nested": true}), None)]
    fn scalar_text(#[case] raw: Value, #[case] expected: Option<&str>) {
        let scalar: Scalar = serde_json::from_value(raw).expect("any JSON decodes");
        assert_eq!(scalar.text().as_deref(), expected);
    }

    #[rstest]
    fn null_properties_default() {
        let feature = Feature::<Props>::from_record(&json!({
            "type": "Feature",
            "properties": null,
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
        }))
        .expect("decodes");

        assert!(feature.properties().name.is_none());
        assert_eq!(feature.point().expect("valid point"), Coord { x: 1.0, y: 2.0 });
    }

    #[rstest]
    fn unknown_geometry_is_unsupported() {
        let feature = Feature::<Props>::from_record(&json!({
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 1], [0, 1], [0, 0]]]}
        }))
        .expect("decodes");

        assert_eq!(
            feature.geometry().expect("present").positions(),
            Err(RecordError::UnsupportedGeometry)
        );
    }

    #[rstest]
    fn missing_geometry_is_reported() {
        let feature = Feature::<Props>::from_record(&json!({"id": 3})).expect("decodes");
        assert_eq!(feature.point(), Err(RecordError::MissingGeometry));
        assert_eq!(feature.feature_id().as_deref(), Some("3"));
    }

    #[rstest]
    fn line_vertices_drops_invalid_and_checks_count() {
        let positions = [json!([0.0, 0.0]), json!([500.0, 0.0]), json!("x")];
        assert_eq!(
            line_vertices(&positions),
            Err(RecordError::TooFewVertices { count: 1 })
        );

        let positions = [json!([0.0, 0.0]), json!([0.0, 95.0]), json!([1.0, 1.0])];
        assert_eq!(
            line_vertices(&positions).expect("two remain"),
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }]
        );
    }
}
