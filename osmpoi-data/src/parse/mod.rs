//! Geometry reconstruction from a flat Overpass element list.
//!
//! Nodes carry coordinates, ways reference nodes and relations reference
//! ways. [`parse_response`] resolves those references in three steps:
//!
//! 1. index every node's coordinates ([`index_nodes`]);
//! 2. turn tagged nodes into points and ways into polygons
//!    ([`node_to_point`], [`way_to_polygon`]);
//! 3. fold multipolygon relations over the way polygons
//!    ([`resolve_relations`]).
//!
//! Per-record failures are logged and skipped; the parse itself never fails.

use std::collections::HashSet;

use log::{debug, warn};
use osmpoi_core::PoiRecord;

mod geometry;
mod nodes;
mod relations;

pub use geometry::{node_to_point, way_to_polygon};
pub use nodes::{NodeIndex, index_nodes};
pub use relations::{
    RelationAssembly, RelationOutcome, RelationResolution, SkipReason, resolve_relations,
};

use crate::overpass::{OsmElement, OverpassResponse};

/// Records reconstructed from one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPois {
    /// Tagged standalone nodes as points, in response order.
    pub nodes: Vec<PoiRecord>,
    /// Unabsorbed way polygons followed by relation multipolygons.
    pub areas: Vec<PoiRecord>,
    /// One outcome per relation element. Relations that could not be
    /// decoded follow the resolved ones as [`SkipReason::Malformed`].
    pub relations: Vec<RelationOutcome>,
}

/// Reconstruct point, polygon and multipolygon records from `response`.
///
/// Only nodes with a `tags` object become point records; untagged nodes
/// serve as way vertices. Repeated elements of the same kind and id are
/// parsed once. Elements that failed to decode are logged and skipped.
///
/// # Examples
///
/// ```
/// use osmpoi_data::overpass::OverpassResponse;
/// use osmpoi_data::parse::{RelationAssembly, parse_response};
///
/// let response: OverpassResponse = serde_json::from_value(serde_json::json!({
///     "elements": [
///         {"type": "node", "id": 1, "lat": 0.5, "lon": 0.5, "tags": {"amenity": "cafe"}}
///     ]
/// }))?;
/// let parsed = parse_response(&response, RelationAssembly::Union);
/// assert_eq!(parsed.nodes.len(), 1);
/// assert!(parsed.areas.is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[must_use]
pub fn parse_response(response: &OverpassResponse, assembly: RelationAssembly) -> ParsedPois {
    let index = index_nodes(response);
    let mut seen_nodes = HashSet::new();
    let mut seen_ways = HashSet::new();
    let mut seen_relations = HashSet::new();
    let mut nodes = Vec::new();
    let mut ways = Vec::new();
    let mut relations = Vec::new();
    let mut malformed_relations = Vec::new();

    for element in &response.elements {
        match element {
            OsmElement::Node(node) if node.tags.is_some() && seen_nodes.insert(node.id) => {
                nodes.extend(node_to_point(node));
            }
            OsmElement::Way(way) if seen_ways.insert(way.id) => {
                ways.extend(way_to_polygon(way, &index));
            }
            OsmElement::Relation(relation) if seen_relations.insert(relation.id) => {
                relations.push(relation);
            }
            OsmElement::Malformed(bad) => {
                let kind = bad.kind.as_deref().unwrap_or("element");
                match bad.id {
                    Some(id) => warn!("Skipped malformed OSM {kind} {id}: {}", bad.message),
                    None => warn!("Skipped malformed OSM {kind}: {}", bad.message),
                }
                if let (Some("relation"), Some(id)) = (bad.kind.as_deref(), bad.id)
                    && seen_relations.insert(id)
                {
                    malformed_relations.push(RelationOutcome::Skipped {
                        relation: id,
                        reason: SkipReason::Malformed,
                    });
                }
            }
            _ => {}
        }
    }

    let way_count = ways.len();
    let resolution = resolve_relations(&relations, ways, assembly);
    debug!(
        "Parsed {} indexed nodes into {} point, {way_count} way and {} relation candidates",
        index.len(),
        nodes.len(),
        relations.len()
    );

    let mut outcomes = resolution.outcomes;
    outcomes.extend(malformed_relations);
    ParsedPois {
        nodes,
        areas: resolution.areas,
        relations: outcomes,
    }
}
