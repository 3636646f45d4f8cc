//! Final table assembly: row union and the polygon containment filter.

use geo::{Contains, MultiPolygon};
use log::debug;
use osmpoi_core::PoiTable;

use crate::parse::ParsedPois;

/// Union the parsed records into one table, nodes first.
///
/// When `shape` is given, rows whose centroid is not strictly inside it are
/// dropped (see [`retain_centroids_within`]).
#[must_use]
pub fn assemble(parsed: ParsedPois, shape: Option<&MultiPolygon<f64>>) -> PoiTable {
    let ParsedPois { nodes, areas, .. } = parsed;
    let mut table: PoiTable = nodes.into_iter().chain(areas).collect();
    if let Some(shape) = shape {
        retain_centroids_within(&mut table, shape);
    }
    table
}

/// Keep the rows whose geometry centroid lies strictly inside `shape`.
///
/// Centroids on the boundary are excluded, as are rows without a centroid.
pub fn retain_centroids_within(table: &mut PoiTable, shape: &MultiPolygon<f64>) {
    let before = table.len();
    table.retain(|record| {
        record
            .geometry
            .centroid()
            .is_some_and(|centroid| shape.contains(&centroid))
    });
    debug!(
        "Polygon filter kept {} of {before} records",
        table.len()
    );
}
