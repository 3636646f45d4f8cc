//! Coordinate lookup for every node in a response.

use std::collections::HashMap;

use geo::Coord;

use crate::overpass::{OsmElement, OverpassResponse};

/// Node id to coordinate (`x = longitude`, `y = latitude`) lookup table.
///
/// Holds every node in the response, tagged or not: untagged nodes are the
/// vertices of ways. Coordinate ranges are not validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIndex {
    coords: HashMap<i64, Coord<f64>>,
}

impl NodeIndex {
    /// Coordinate of node `id`.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<Coord<f64>> {
        self.coords.get(&id).copied()
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether no nodes were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Index the coordinates of every node element in `response`.
///
/// Nodes without both coordinates are left out.
#[must_use]
pub fn index_nodes(response: &OverpassResponse) -> NodeIndex {
    let coords = response
        .elements
        .iter()
        .filter_map(|element| match element {
            OsmElement::Node(node) => Some(node),
            _ => None,
        })
        .filter_map(|node| {
            let (lon, lat) = (node.lon?, node.lat?);
            Some((node.id, Coord { x: lon, y: lat }))
        })
        .collect();
    NodeIndex { coords }
}
