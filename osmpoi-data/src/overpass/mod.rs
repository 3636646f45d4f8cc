//! Overpass API plumbing: query construction, response schema and executors.
//!
//! [`build_query`] renders a [`TagFilter`](osmpoi_core::TagFilter) and
//! [`BoundingBox`](osmpoi_core::BoundingBox) into Overpass QL.
//! [`QueryExecutor`] abstracts the single blocking request per fetch;
//! [`HttpQueryExecutor`] implements it over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use osmpoi_core::{BoundingBox, TagFilter};
//! use osmpoi_data::overpass::{HttpQueryExecutor, QueryExecutor, build_query};
//!
//! let bbox = BoundingBox::new(52.53, 52.50, 13.42, 13.37)?;
//! let tags = TagFilter::new().with_value("amenity", "cafe")?;
//! let query = build_query(&bbox, &tags, Duration::from_secs(180), None, None);
//!
//! let executor = HttpQueryExecutor::new("https://overpass-api.de/api/interpreter")?;
//! let json = executor.execute(&query, Duration::from_secs(180))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod executor;
mod http;
mod query;
mod response;

#[doc(hidden)]
pub mod test_support;

pub use executor::{QueryError, QueryExecutor};
pub use http::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, ExecutorBuildError, HttpQueryExecutor,
    HttpQueryExecutorConfig,
};
pub use query::{DEFAULT_TIMEOUT, build_query, format_bbox};
pub use response::{MalformedElement, NodeElement, OsmElement, OverpassResponse, RelationElement, RelationMember, WayElement};
