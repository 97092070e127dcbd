//! Response envelope decoding for the feed API.
//!
//! Every GeoJSON feed answers with a `FeatureCollection` whose `features`
//! array holds the records. The vehicle-tracking feed may instead answer
//! with a bare array of vehicle records.

use roadfeed_core::LayerKey;
use serde::Deserialize;
use serde_json::Value;

/// Feature collection envelope.
///
/// Only the record array is read; other members such as `type` or paging
/// metadata are ignored.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    /// Raw feature records. Absent or `null` means no records.
    #[serde(default)]
    pub features: Option<Vec<Value>>,
}

/// Decode a response body into the record array for `layer`.
///
/// A missing `features` member yields an empty array rather than an error.
pub fn decode_records(layer: LayerKey, body: &[u8]) -> Result<Vec<Value>, String> {
    let value: Value = serde_json::from_slice(body).map_err(|err| err.to_string())?;
    match value {
        Value::Array(records) if layer == LayerKey::SnowPlows => Ok(records),
        Value::Object(_) => {
            let envelope =
                FeatureCollection::deserialize(value).map_err(|err| err.to_string())?;
            Ok(envelope.features.unwrap_or_default())
        }
        other => Err(format!(
            "expected a JSON object with a features array, found {}",
            json_kind(&other)
        )),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
