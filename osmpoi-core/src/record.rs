//! Output records: one row per node, way or relation point of interest.

use std::collections::{HashMap, HashSet};
use std::fmt;

use geo::{Centroid, Geometry, MultiPolygon, Point, Polygon};

/// Coordinate reference system of every [`PoiTable`].
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// OpenStreetMap-style free-form key/value tags.
pub type Tags = HashMap<String, String>;

/// OSM element kind a record was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// A single point.
    Node,
    /// An ordered list of node references.
    Way,
    /// A grouping of member elements.
    Relation,
}

impl ElementKind {
    /// Lowercase OSM name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of a point of interest.
#[derive(Debug, Clone, PartialEq)]
pub enum PoiGeometry {
    /// Standalone node.
    Point(Point<f64>),
    /// Closed way.
    Polygon(Polygon<f64>),
    /// Multipolygon relation.
    MultiPolygon(MultiPolygon<f64>),
}

impl PoiGeometry {
    /// Centroid of the geometry; `None` for empty areal geometries.
    #[must_use]
    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Self::Point(point) => Some(*point),
            Self::Polygon(polygon) => polygon.centroid(),
            Self::MultiPolygon(polygons) => polygons.centroid(),
        }
    }

    /// Whether the geometry covers an area rather than a point.
    #[must_use]
    pub const fn is_areal(&self) -> bool {
        !matches!(self, Self::Point(_))
    }

    /// Convert into a generic `geo` geometry.
    #[must_use]
    pub fn into_geometry(self) -> Geometry<f64> {
        match self {
            Self::Point(point) => Geometry::Point(point),
            Self::Polygon(polygon) => Geometry::Polygon(polygon),
            Self::MultiPolygon(polygons) => Geometry::MultiPolygon(polygons),
        }
    }
}

/// One output row.
///
/// `nodes` lists the node ids of a way (or the concatenated node ids of a
/// relation's member ways); `ways` lists a relation's member way ids. Both
/// are empty for node records.
///
/// # Examples
/// ```
/// use geo::Point;
/// use osmpoi_core::{ElementKind, PoiRecord, Tags};
///
/// let record = PoiRecord::node(
///     42,
///     Point::new(0.5, 0.25),
///     Tags::from([("amenity".into(), "cafe".into())]),
/// );
/// assert_eq!(record.kind, ElementKind::Node);
/// assert_eq!(record.tag("amenity"), Some("cafe"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    /// OSM identifier, unique within its [`ElementKind`].
    pub osm_id: i64,
    /// Kind of element the record came from.
    pub kind: ElementKind,
    /// Reconstructed geometry.
    pub geometry: PoiGeometry,
    /// Tags carried by the element.
    pub tags: Tags,
    /// Node ids composing the geometry.
    pub nodes: Vec<i64>,
    /// Member way ids for relation records.
    pub ways: Vec<i64>,
}

impl PoiRecord {
    /// Record for a tagged standalone node.
    #[must_use]
    pub fn node(osm_id: i64, point: Point<f64>, tags: Tags) -> Self {
        Self {
            osm_id,
            kind: ElementKind::Node,
            geometry: PoiGeometry::Point(point),
            tags,
            nodes: Vec::new(),
            ways: Vec::new(),
        }
    }

    /// Record for a way resolved into a polygon.
    #[must_use]
    pub fn way(osm_id: i64, polygon: Polygon<f64>, nodes: Vec<i64>, tags: Tags) -> Self {
        Self {
            osm_id,
            kind: ElementKind::Way,
            geometry: PoiGeometry::Polygon(polygon),
            tags,
            nodes,
            ways: Vec::new(),
        }
    }

    /// Record for a multipolygon relation assembled from member ways.
    #[must_use]
    pub fn relation(
        osm_id: i64,
        polygons: MultiPolygon<f64>,
        ways: Vec<i64>,
        nodes: Vec<i64>,
        tags: Tags,
    ) -> Self {
        Self {
            osm_id,
            kind: ElementKind::Relation,
            geometry: PoiGeometry::MultiPolygon(polygons),
            tags,
            nodes,
            ways,
        }
    }

    /// Value of tag `key`, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Row-union of node, way and relation records in a fixed CRS.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoiTable {
    records: Vec<PoiRecord>,
}

impl PoiTable {
    /// Wrap `records` in a table.
    #[must_use]
    pub const fn new(records: Vec<PoiRecord>) -> Self {
        Self { records }
    }

    /// Coordinate reference system identifier.
    #[must_use]
    pub const fn crs(&self) -> &'static str {
        DEFAULT_CRS
    }

    /// All rows in output order.
    #[must_use]
    pub fn records(&self) -> &[PoiRecord] {
        &self.records
    }

    /// Consume the table and return its rows.
    #[must_use]
    pub fn into_records(self) -> Vec<PoiRecord> {
        self.records
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, PoiRecord> {
        self.records.iter()
    }

    /// Keep only rows matching `predicate`.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&PoiRecord) -> bool,
    {
        self.records.retain(predicate);
    }

    /// Number of rows of `kind`.
    #[must_use]
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// Row with the given kind and id.
    #[must_use]
    pub fn find(&self, kind: ElementKind, osm_id: i64) -> Option<&PoiRecord> {
        self.records
            .iter()
            .find(|r| r.kind == kind && r.osm_id == osm_id)
    }

    /// Dynamic tag columns in order of first appearance.
    #[must_use]
    pub fn tag_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for record in &self.records {
            let mut keys: Vec<&str> = record.tags.keys().map(String::as_str).collect();
            // HashMap order is unstable; sort within a row for determinism.
            keys.sort_unstable();
            for key in keys {
                if seen.insert(key) {
                    columns.push(key);
                }
            }
        }
        columns
    }

    /// Value of tag column `column` in row `row`.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.records.get(row).and_then(|record| record.tag(column))
    }
}

impl<'a> IntoIterator for &'a PoiTable {
    type Item = &'a PoiRecord;
    type IntoIter = std::slice::Iter<'a, PoiRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<PoiRecord> for PoiTable {
    fn from_iter<I: IntoIterator<Item = PoiRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
