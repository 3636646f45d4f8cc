//! Overpass access and geometry reconstruction for OSM points of interest.
//!
//! Responsibilities:
//! - Render tag filters and bounding boxes into Overpass QL.
//! - Decode Overpass JSON and rebuild point, polygon and multipolygon
//!   geometries from nodes, ways and relations.
//! - Assemble the unified POI table and apply the polygon centroid filter.
//!
//! Boundaries:
//! - Do not encode domain validation (lives in `osmpoi-core`).
//! - Geocoding is a caller-supplied collaborator; no service is bundled.
//!
//! Invariants:
//! - One executor call per fetch; parsing is pure in-memory work.
//! - A malformed record is logged and dropped, never fatal to the response.
//! - No global mutable state.

pub mod assemble;
mod fetch;
pub mod overpass;
pub mod parse;

pub use fetch::{PoiError, PoiFetcher, PoiQueryOptions};
pub use parse::{ParsedPois, RelationAssembly};
