//! Point and polygon reconstruction for single nodes and ways.
//!
//! Both builders are failure tolerant: a record that cannot be built is
//! logged and `None` is returned.

use geo::{Coord, LineString, Point, Polygon};
use log::warn;
use osmpoi_core::PoiRecord;

use super::nodes::NodeIndex;
use crate::overpass::{NodeElement, WayElement};

/// Minimum distinct vertices of a usable ring.
const MIN_RING_VERTICES: usize = 3;

/// Build a point record from a node's own coordinates.
///
/// Returns `None` and logs when `lat` or `lon` is missing or not finite.
#[must_use]
pub fn node_to_point(node: &NodeElement) -> Option<PoiRecord> {
    let (Some(lon), Some(lat)) = (node.lon, node.lat) else {
        warn!("Point has invalid geometry: node {} lacks coordinates", node.id);
        return None;
    };
    if !(lon.is_finite() && lat.is_finite()) {
        warn!(
            "Point has invalid geometry: node {} at lon={lon}, lat={lat}",
            node.id
        );
        return None;
    }
    Some(PoiRecord::node(
        node.id,
        Point::new(lon, lat),
        node.tags.clone().unwrap_or_default(),
    ))
}

/// Build a polygon record by projecting a way's node ids through `nodes`.
///
/// The ring follows the listed order. Open rings are accepted: `geo` closes
/// a polygon's exterior ring on construction.
///
/// Returns `None` and logs the way's node ids when a referenced node is
/// missing or when fewer than three vertices remain.
#[must_use]
pub fn way_to_polygon(way: &WayElement, nodes: &NodeIndex) -> Option<PoiRecord> {
    let Some(coords) = way
        .nodes
        .iter()
        .map(|id| nodes.get(*id))
        .collect::<Option<Vec<Coord<f64>>>>()
    else {
        let missing: Vec<i64> = way
            .nodes
            .iter()
            .copied()
            .filter(|id| nodes.get(*id).is_none())
            .collect();
        warn!(
            "Polygon has invalid geometry: way {} references missing nodes {missing:?}; nodes: {:?}",
            way.id, way.nodes
        );
        return None;
    };
    if ring_vertex_count(&coords) < MIN_RING_VERTICES {
        warn!(
            "Polygon has invalid geometry: way {} has too few vertices; nodes: {:?}",
            way.id, way.nodes
        );
        return None;
    }
    let polygon = Polygon::new(LineString::from(coords), Vec::new());
    Some(PoiRecord::way(
        way.id,
        polygon,
        way.nodes.clone(),
        way.tags.clone().unwrap_or_default(),
    ))
}

/// Vertices of a ring, not counting an explicit closing repeat.
fn ring_vertex_count(coords: &[Coord<f64>]) -> usize {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => coords.len() - 1,
        _ => coords.len(),
    }
}
