//! Behavioural tests for [`PoiFetcher`].
//!
//! These tests use [`StubQueryExecutor`] and the core geocoding doubles so no
//! Overpass or geocoding service is needed.

use geo::{Point, polygon};
use osmpoi_core::test_support::StubPlaceResolver;
use osmpoi_core::{
    BoundingBox, ElementKind, PlaceBoundary, PoiGeometry, PoiTable, SearchArea, TagFilter,
};
use osmpoi_data::overpass::QueryError;
use osmpoi_data::overpass::test_support::StubQueryExecutor;
use osmpoi_data::{PoiError, PoiFetcher};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::{cell::RefCell, fs, path::PathBuf};

/// Where the fetch is aimed.
enum Target {
    Area(SearchArea),
    Place(StubPlaceResolver),
}

type ExecutorCell = RefCell<Option<StubQueryExecutor>>;
type TargetCell = RefCell<Option<Target>>;
type OutcomeCell = RefCell<Option<Result<PoiTable, PoiError>>>;

#[fixture]
fn executor() -> ExecutorCell {
    RefCell::new(None)
}

#[fixture]
fn target() -> TargetCell {
    RefCell::new(None)
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn respond_with(cell: &ExecutorCell, response: serde_json::Value) {
    *cell.borrow_mut() = Some(StubQueryExecutor::with_response(response));
}

fn expect_table(outcome: &OutcomeCell) -> PoiTable {
    match outcome.borrow().as_ref().expect("fetch was attempted") {
        Ok(table) => table.clone(),
        Err(err) => panic!("expected a table, got {err:?}"),
    }
}

fn assert_counts(outcome: &OutcomeCell, nodes: usize, ways: usize, relations: usize) {
    let table = expect_table(outcome);
    assert_eq!(table.count_kind(ElementKind::Node), nodes, "node rows");
    assert_eq!(table.count_kind(ElementKind::Way), ways, "way rows");
    assert_eq!(
        table.count_kind(ElementKind::Relation),
        relations,
        "relation rows"
    );
}

// --- Given steps ---

#[given("an Overpass response with one tagged cafe node")]
fn cafe_response(#[from(executor)] executor: &ExecutorCell) {
    respond_with(
        executor,
        json!({"elements": [
            {"type": "node", "id": 42, "lat": 0.5, "lon": 0.25, "tags": {"amenity": "cafe", "name": "Corner"}}
        ]}),
    );
}

#[given("an Overpass response with a two-way multipolygon relation")]
fn relation_response(#[from(executor)] executor: &ExecutorCell) {
    respond_with(
        executor,
        json!({"elements": [
            {"type": "node", "id": 1, "lat": 0.1, "lon": 0.1},
            {"type": "node", "id": 2, "lat": 0.1, "lon": 0.3},
            {"type": "node", "id": 3, "lat": 0.3, "lon": 0.3},
            {"type": "node", "id": 4, "lat": 0.6, "lon": 0.6},
            {"type": "node", "id": 5, "lat": 0.6, "lon": 0.8},
            {"type": "node", "id": 6, "lat": 0.8, "lon": 0.8},
            {"type": "way", "id": 11, "nodes": [1, 2, 3]},
            {"type": "way", "id": 12, "nodes": [4, 5, 6]},
            {"type": "relation", "id": 7, "tags": {"type": "multipolygon", "landuse": "meadow"},
             "members": [
                {"type": "way", "ref": 11, "role": "outer"},
                {"type": "way", "ref": 12, "role": "outer"}
             ]}
        ]}),
    );
}

#[given("an Overpass response with a way referencing a missing node")]
fn broken_way_response(#[from(executor)] executor: &ExecutorCell) {
    respond_with(
        executor,
        json!({"elements": [
            {"type": "node", "id": 1, "lat": 0.2, "lon": 0.2, "tags": {"amenity": "bench"}},
            {"type": "node", "id": 2, "lat": 0.2, "lon": 0.4},
            {"type": "way", "id": 20, "nodes": [1, 2, 999], "tags": {"amenity": "parking"}}
        ]}),
    );
}

#[given("an Overpass response with a cafe and a relation member without a ref")]
fn malformed_relation_response(#[from(executor)] executor: &ExecutorCell) {
    respond_with(
        executor,
        json!({"elements": [
            {"type": "node", "id": 42, "lat": 0.5, "lon": 0.25, "tags": {"amenity": "cafe", "name": "Corner"}},
            {"type": "relation", "id": 7, "tags": {"type": "multipolygon", "landuse": "meadow"},
             "members": [{"type": "way", "role": "outer"}]}
        ]}),
    );
}

#[given("an Overpass response with cafes inside and outside a triangle")]
fn triangle_response(#[from(executor)] executor: &ExecutorCell) {
    respond_with(
        executor,
        json!({"elements": [
            {"type": "node", "id": 1, "lat": 0.2, "lon": 0.2, "tags": {"amenity": "cafe"}},
            {"type": "node", "id": 2, "lat": 0.8, "lon": 0.8, "tags": {"amenity": "cafe"}}
        ]}),
    );
}

#[given("an Overpass executor that times out")]
fn timing_out_executor(#[from(executor)] executor: &ExecutorCell) {
    *executor.borrow_mut() = Some(StubQueryExecutor::with_error(QueryError::Timeout {
        endpoint: "https://overpass.example/api/interpreter".to_owned(),
        timeout_secs: 180,
    }));
}

#[given("the unit bounding box as the search area")]
fn unit_box(#[from(target)] target: &TargetCell) {
    let bounds = BoundingBox::new(1.0, 0.0, 1.0, 0.0).expect("valid bounds");
    *target.borrow_mut() = Some(Target::Area(SearchArea::from_bounds(bounds)));
}

#[given("the lower-left triangle of the unit square as the search area")]
fn triangle_area(#[from(target)] target: &TargetCell) {
    let triangle = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
    let area = SearchArea::from_polygon(triangle).expect("valid polygon");
    *target.borrow_mut() = Some(Target::Area(area));
}

#[given("a place that resolves to a point")]
fn point_place(#[from(target)] target: &TargetCell) {
    let resolver = StubPlaceResolver::with_boundaries([PlaceBoundary::new(
        "Village green",
        Point::new(0.5, 0.5),
    )]);
    *target.borrow_mut() = Some(Target::Place(resolver));
}

// --- When steps ---

#[when("I fetch amenity and landuse POIs")]
fn fetch_pois(
    #[from(executor)] executor: &ExecutorCell,
    #[from(target)] target: &TargetCell,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    let tags = TagFilter::new()
        .with_any("amenity")
        .and_then(|filter| filter.with_any("landuse"))
        .expect("valid filter");
    let executor_guard = executor.borrow();
    let stub = executor_guard.as_ref().expect("executor prepared");
    let fetcher = PoiFetcher::new(stub);
    let result = match target.borrow().as_ref().expect("target prepared") {
        Target::Area(area) => fetcher.fetch(&tags, area),
        Target::Place(resolver) => fetcher.from_place(&tags, resolver, "Village green", 1),
    };
    *outcome.borrow_mut() = Some(result);
}

// --- Then steps ---

#[then("the table holds 1 node, 0 ways and 0 relations")]
fn one_node(#[from(outcome)] outcome: &OutcomeCell) {
    assert_counts(outcome, 1, 0, 0);
}

#[then("the table holds 0 nodes, 0 ways and 1 relation")]
fn one_relation(#[from(outcome)] outcome: &OutcomeCell) {
    assert_counts(outcome, 0, 0, 1);
}

#[then("the cafe row carries its point geometry and tags")]
fn cafe_row(#[from(outcome)] outcome: &OutcomeCell) {
    let table = expect_table(outcome);
    let cafe = table.find(ElementKind::Node, 42).expect("cafe row present");
    assert_eq!(cafe.geometry, PoiGeometry::Point(Point::new(0.25, 0.5)));
    assert_eq!(cafe.tag("amenity"), Some("cafe"));
    assert_eq!(cafe.tag("name"), Some("Corner"));
    assert_eq!(table.crs(), "EPSG:4326");
}

#[then("the relation row has a two-polygon multipolygon")]
fn relation_row(#[from(outcome)] outcome: &OutcomeCell) {
    let table = expect_table(outcome);
    let relation = table
        .find(ElementKind::Relation, 7)
        .expect("relation row present");
    match &relation.geometry {
        PoiGeometry::MultiPolygon(shape) => assert_eq!(shape.0.len(), 2, "polygon count"),
        other => panic!("expected a multipolygon, got {other:?}"),
    }
    assert_eq!(relation.tag("landuse"), Some("meadow"));
    assert_eq!(relation.ways, vec![11, 12]);
}

#[then("only the cafe inside the triangle is returned")]
fn inside_triangle(#[from(outcome)] outcome: &OutcomeCell) {
    let table = expect_table(outcome);
    let ids: Vec<i64> = table.iter().map(|record| record.osm_id).collect();
    assert_eq!(ids, vec![1]);
}

#[then("a missing area error is returned")]
fn missing_area(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let result = borrowed.as_ref().expect("fetch was attempted");
    assert!(
        matches!(result, Err(PoiError::MissingArea(_))),
        "expected MissingArea, got {result:?}"
    );
}

#[then("no query is sent")]
fn no_query(#[from(executor)] executor: &ExecutorCell) {
    let guard = executor.borrow();
    let stub = guard.as_ref().expect("executor prepared");
    assert_eq!(stub.calls(), 0, "expected no executor calls");
}

#[then("a query timeout error is returned")]
fn query_timeout(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let result = borrowed.as_ref().expect("fetch was attempted");
    assert!(
        matches!(result, Err(PoiError::Query(QueryError::Timeout { .. }))),
        "expected a query timeout, got {result:?}"
    );
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/poi_fetch.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "fetching a cafe inside a bounding box",
            "absorbing member ways into a multipolygon relation",
            "dropping a way with a missing node reference",
            "filtering results by polygon centroid",
            "reporting a missing area for a point-only place",
            "propagating an executor timeout",
            "keeping valid rows beside a malformed relation",
        ],
        "scenario order changed in feature file"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $index:literal) => {
        #[scenario(path = "tests/features/poi_fetch.feature", index = $index)]
        fn $fn_name(executor: ExecutorCell, target: TargetCell, outcome: OutcomeCell) {
            let _ = (executor, target, outcome);
        }
    };
}

register_scenario!(fetching_cafe_in_bounding_box, 0);
register_scenario!(absorbing_relation_member_ways, 1);
register_scenario!(dropping_way_with_missing_node, 2);
register_scenario!(filtering_by_polygon_centroid, 3);
register_scenario!(reporting_missing_area_for_point_place, 4);
register_scenario!(propagating_executor_timeout, 5);
register_scenario!(keeping_rows_beside_malformed_relation, 6);
