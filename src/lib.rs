//! Facade crate for OpenStreetMap point-of-interest extraction.
//!
//! This crate re-exports the core domain types and, behind the `overpass`
//! feature, the Overpass-backed fetcher and its executors.

#![forbid(unsafe_code)]

pub use osmpoi_core::{
    AreaError, BoundingBox, BoundsError, BoundsFromPoint, DEFAULT_CRS, ElementKind, GeocodeError,
    Geocoder, InvalidFilterError, MissingAreaError, PlaceBoundary, PlaceResolver, PoiGeometry,
    PoiRecord, PoiTable, SearchArea, SphericalBounds, TagFilter, TagPair, TagValue, Tags,
};

#[cfg(feature = "overpass")]
pub use osmpoi_data::overpass::{
    HttpQueryExecutor, HttpQueryExecutorConfig, QueryError, QueryExecutor,
};

#[cfg(feature = "overpass")]
pub use osmpoi_data::{PoiError, PoiFetcher, PoiQueryOptions, RelationAssembly};
