//! Behavioural tests for fail-soft fetching and normalization.
//!
//! These tests use [`StubFeedSource`] so that no upstream service is
//! required.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use roadfeed_core::test_support::{StubFeedSource, unreachable_error};
use roadfeed_core::{LayerCache, LayerKey};
use roadfeed_data::{RawLayerData, fetch_all_layer_data, normalize_all};
use serde_json::{Value, json};
use std::cell::RefCell;

/// Outcome of one fetch-and-normalize cycle.
type CycleCell = RefCell<Option<(RawLayerData, LayerCache)>>;

#[fixture]
fn source() -> StubFeedSource {
    StubFeedSource::default()
}

#[fixture]
fn cycle() -> CycleCell {
    RefCell::new(None)
}

fn point(id: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [-105.0, 39.7]},
        "properties": {"id": id}
    })
}

fn multipoint(id: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "MultiPoint", "coordinates": [[-105.0, 39.7]]},
        "properties": {"id": id}
    })
}

fn line(id: &str) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": {"type": "LineString", "coordinates": [[-105.0, 39.7], [-105.1, 39.8]]},
        "properties": {}
    })
}

fn sample_records(layer: LayerKey) -> Vec<Value> {
    match layer {
        LayerKey::RoadConditions => vec![line("rc-1")],
        LayerKey::Incidents => vec![multipoint("inc-1")],
        LayerKey::WeatherStations => vec![point("ws-1")],
        LayerKey::SnowPlows => vec![json!({
            "avl_location": {
                "vehicle": {"id": "plow-1"},
                "position": {"latitude": 39.7, "longitude": -105.0}
            }
        })],
        LayerKey::PlannedEvents => vec![multipoint("ev-1")],
        LayerKey::DmsSigns => vec![point("dms-1")],
        LayerKey::WorkZones => vec![line("wz-1")],
    }
}

fn run_cycle(source: &StubFeedSource) -> (RawLayerData, LayerCache) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime should build");
    let data = runtime.block_on(fetch_all_layer_data(source));
    let cache = normalize_all(&data);
    (data, cache)
}

fn with_cycle<R>(cycle: &CycleCell, check: impl FnOnce(&RawLayerData, &LayerCache) -> R) -> R {
    let guard = cycle.borrow();
    let (data, cache) = guard.as_ref().expect("cycle should have run");
    check(data, cache)
}

// --- Given steps ---

#[given("a source with records for every feed")]
fn source_with_records(#[from(source)] source: &StubFeedSource) {
    for layer in LayerKey::ALL {
        source.set_records(layer, sample_records(layer));
    }
}

#[given("the incidents feed fails")]
fn incidents_fail(#[from(source)] source: &StubFeedSource) {
    source.set_error(LayerKey::Incidents, unreachable_error(LayerKey::Incidents));
}

#[given("the weather station feed also returns a record without geometry")]
fn weather_with_bad_record(#[from(source)] source: &StubFeedSource) {
    let mut records = sample_records(LayerKey::WeatherStations);
    records.push(json!({"type": "Feature", "properties": {"id": "ws-broken"}}));
    source.set_records(LayerKey::WeatherStations, records);
}

#[given("a source where every feed fails")]
fn every_feed_fails(#[from(source)] source: &StubFeedSource) {
    source.fail_all();
}

// --- When steps ---

#[when("all feeds are fetched and normalized")]
fn fetch_and_normalize(
    #[from(source)] source: &StubFeedSource,
    #[from(cycle)] cycle: &CycleCell,
) {
    *cycle.borrow_mut() = Some(run_cycle(source));
}

// --- Then steps ---

#[then("the incidents layer is empty")]
fn incidents_empty(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |data, cache| {
        assert!(data.records(LayerKey::Incidents).is_empty());
        assert_eq!(cache.layer_len(LayerKey::Incidents), 0);
    });
}

#[then("the other six layers hold entities")]
fn others_hold_entities(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |_, cache| {
        for layer in LayerKey::ALL
            .into_iter()
            .filter(|layer| *layer != LayerKey::Incidents)
        {
            assert_eq!(cache.layer_len(layer), 1, "{layer} should hold one entity");
        }
    });
}

#[then("only the incidents feed is reported as failed")]
fn only_incidents_failed(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |data, _| {
        assert_eq!(data.failed_layers(), vec![LayerKey::Incidents]);
        assert!(!data.all_failed());
    });
}

#[then("the weather stations layer holds 1 entity")]
fn weather_holds_one(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |data, cache| {
        assert_eq!(data.records(LayerKey::WeatherStations).len(), 2);
        assert_eq!(cache.markers(LayerKey::WeatherStations)[0].id, "ws-1");
        assert_eq!(cache.layer_len(LayerKey::WeatherStations), 1);
    });
}

#[then("no feed is reported as failed")]
fn none_failed(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |data, _| assert!(data.failed_layers().is_empty()));
}

#[then("every layer is empty")]
fn every_layer_empty(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |_, cache| assert!(cache.is_empty()));
}

#[then("every feed is reported as failed")]
fn every_feed_failed(#[from(cycle)] cycle: &CycleCell) {
    with_cycle(cycle, |data, _| {
        assert!(data.all_failed());
        assert!(!data.is_aborted());
    });
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/fail_soft_fetch.feature", name = $title)]
        fn $fn_name(source: StubFeedSource, cycle: CycleCell) {
            let _ = (source, cycle);
        }
    };
}

register_scenario!(
    one_failing_feed,
    "one failing feed leaves the other layers intact"
);
register_scenario!(
    malformed_record_isolated,
    "a malformed record does not affect its neighbours"
);
register_scenario!(total_outage, "every feed failing is a total outage");
