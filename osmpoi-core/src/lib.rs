//! Core domain types for OpenStreetMap point-of-interest extraction.
//!
//! These models provide basic validation to keep downstream
//! components honest. Constructors return `Result` to surface
//! invalid input early.
//!
//! Coordinates are WGS84 throughout with `x = longitude`, `y = latitude`.

pub mod area;
pub mod collaborators;
pub mod filter;
pub mod record;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use area::{
    AreaError, BoundingBox, BoundsError, BoundsFromPoint, MissingAreaError, SearchArea,
    SphericalBounds,
};
pub use collaborators::{GeocodeError, Geocoder, PlaceBoundary, PlaceResolver};
pub use filter::{InvalidFilterError, TagFilter, TagPair, TagValue};
pub use record::{DEFAULT_CRS, ElementKind, PoiGeometry, PoiRecord, PoiTable, Tags};
