//! Per-feed normalizers turning raw records into map entities.
//!
//! Each normalizer decodes a record through a serde DTO, validates its
//! geometry and builds [`roadfeed_core::MapMarker`] or
//! [`roadfeed_core::MapOverlay`] values. A record that cannot be turned into
//! an entity yields a [`RecordError`], which is logged and the record is
//! skipped. Normalizers never fail as a whole.

mod dms_signs;
mod geojson;
mod incidents;
mod planned_events;
mod road_conditions;
mod snow_plows;
mod weather_stations;
mod work_zones;

use log::{debug, warn};
use roadfeed_core::{EntityError, LayerCache, LayerKey, MarkerKind, OverlayKind};
use serde_json::Value;
use thiserror::Error;

use crate::fetch::RawLayerData;

pub use dms_signs::normalize_dms_signs;
pub use incidents::normalize_incidents;
pub use planned_events::normalize_planned_events;
pub use road_conditions::normalize_road_conditions;
pub use snow_plows::normalize_snow_plows;
pub use weather_stations::normalize_weather_stations;
pub use work_zones::normalize_work_zones;

/// Fallback label for overlays without a route name.
pub const UNKNOWN_ROUTE: &str = "Unknown Route";

/// Why a single raw record produced no entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record does not have the feed's shape.
    #[error("record does not match the feed shape: {0}")]
    Decode(String),
    /// No usable identifier was present.
    #[error("record has no identifier")]
    MissingIdentifier,
    /// No geometry was present.
    #[error("record has no geometry")]
    MissingGeometry,
    /// The geometry kind is not one this feed accepts.
    #[error("geometry type is not supported by this feed")]
    UnsupportedGeometry,
    /// The position was not a valid longitude/latitude pair.
    #[error("record has no valid coordinate")]
    InvalidCoordinate,
    /// Fewer than two valid vertices remained after filtering.
    #[error("line has {count} valid vertices, needs at least two")]
    TooFewVertices {
        /// Valid vertices that remained.
        count: usize,
    },
    /// The entity constructor rejected the normalized values.
    #[error(transparent)]
    Entity(#[from] EntityError),
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Apply `normalize` to each record, logging and skipping failures.
///
/// `normalize` receives the record's position in the source array and may
/// return several entities for one record.
pub(crate) fn normalize_each<T, F>(layer: LayerKey, records: &[Value], mut normalize: F) -> Vec<T>
where
    F: FnMut(usize, &Value) -> Result<Vec<T>, RecordError>,
{
    let mut entities = Vec::with_capacity(records.len());
    let mut skipped = 0_usize;
    for (index, record) in records.iter().enumerate() {
        match normalize(index, record) {
            Ok(batch) => entities.extend(batch),
            Err(err) => {
                skipped += 1;
                warn!("skipping {layer} record {index}: {err}");
            }
        }
    }
    debug!(
        "normalized {} {layer} entities from {} records ({skipped} skipped)",
        entities.len(),
        records.len()
    );
    entities
}

/// Normalize every layer of one fetch cycle into a fresh cache.
///
/// Failed feeds contribute empty layers.
#[must_use]
pub fn normalize_all(data: &RawLayerData) -> LayerCache {
    let mut cache = LayerCache::default();
    cache.insert_overlays(
        OverlayKind::RoadCondition,
        normalize_road_conditions(data.records(LayerKey::RoadConditions)),
    );
    cache.insert_markers(
        MarkerKind::Incidents,
        normalize_incidents(data.records(LayerKey::Incidents)),
    );
    cache.insert_markers(
        MarkerKind::WeatherStations,
        normalize_weather_stations(data.records(LayerKey::WeatherStations)),
    );
    cache.insert_markers(
        MarkerKind::SnowPlows,
        normalize_snow_plows(data.records(LayerKey::SnowPlows)),
    );
    cache.insert_markers(
        MarkerKind::PlannedEvents,
        normalize_planned_events(data.records(LayerKey::PlannedEvents)),
    );
    cache.insert_markers(
        MarkerKind::DmsSigns,
        normalize_dms_signs(data.records(LayerKey::DmsSigns)),
    );
    cache.insert_overlays(
        OverlayKind::WorkZone,
        normalize_work_zones(data.records(LayerKey::WorkZones)),
    );
    cache
}
