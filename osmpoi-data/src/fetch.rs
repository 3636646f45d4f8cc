//! Entry points that run one Overpass query and return a POI table.
//!
//! Every entry point reduces to [`PoiFetcher::fetch`] with a resolved
//! [`SearchArea`]: the query is scoped to the area's bounding box and, when
//! the area carries a polygon, the result is narrowed to rows whose centroid
//! lies strictly inside it.

use std::time::Duration;

use geo::{Coord, MultiPolygon};
use log::{debug, info, warn};
use osmpoi_core::{
    AreaError, BoundsError, BoundsFromPoint, ElementKind, GeocodeError, Geocoder,
    InvalidFilterError, MissingAreaError, PlaceResolver, PoiTable, SearchArea, SphericalBounds,
    TagFilter,
};
use thiserror::Error;

use crate::assemble::assemble;
use crate::overpass::{
    DEFAULT_TIMEOUT, OverpassResponse, QueryError, QueryExecutor, build_query, format_bbox,
};
use crate::parse::{RelationAssembly, parse_response};

/// Errors raised by [`PoiFetcher`] entry points.
#[derive(Debug, Error)]
pub enum PoiError {
    /// The tag filter is malformed. Fetch entry points take a built
    /// [`TagFilter`] and never raise this themselves; it lets callers apply
    /// `?` to [`TagFilter::from_json`] in functions returning [`PoiError`].
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterError),
    /// Neither a polygon nor a complete bounding box could be determined.
    #[error(transparent)]
    MissingArea(#[from] MissingAreaError),
    /// The bounding box coordinates are invalid.
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    /// The query executor failed.
    #[error("Overpass query failed: {0}")]
    Query(#[from] QueryError),
    /// A geocoding collaborator failed.
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    /// The response does not follow the Overpass element schema.
    #[error("failed to decode Overpass response: {source}")]
    Decode {
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<AreaError> for PoiError {
    fn from(error: AreaError) -> Self {
        match error {
            AreaError::Missing(missing) => Self::MissingArea(missing),
            AreaError::Bounds(bounds) => Self::Bounds(bounds),
        }
    }
}

/// Query envelope and parsing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiQueryOptions {
    timeout: Duration,
    memory: Option<u64>,
    custom_settings: Option<String>,
    relation_assembly: RelationAssembly,
}

impl Default for PoiQueryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            memory: None,
            custom_settings: None,
            relation_assembly: RelationAssembly::default(),
        }
    }
}

impl PoiQueryOptions {
    /// Set the server-side timeout, also forwarded to the executor.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the server-side memory ceiling in bytes.
    #[must_use]
    pub const fn with_memory(mut self, bytes: u64) -> Self {
        self.memory = Some(bytes);
        self
    }

    /// Replace the whole query envelope. An empty string restores the default.
    #[must_use]
    pub fn with_custom_settings(mut self, settings: impl Into<String>) -> Self {
        let settings = settings.into();
        self.custom_settings = (!settings.is_empty()).then_some(settings);
        self
    }

    /// Select how multipolygon relations combine their member ways.
    #[must_use]
    pub const fn with_relation_assembly(mut self, assembly: RelationAssembly) -> Self {
        self.relation_assembly = assembly;
        self
    }

    /// Server-side timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Memory ceiling in bytes, if set.
    #[must_use]
    pub const fn memory(&self) -> Option<u64> {
        self.memory
    }

    /// Envelope override, if set.
    #[must_use]
    pub fn custom_settings(&self) -> Option<&str> {
        self.custom_settings.as_deref()
    }

    /// Relation assembly mode.
    #[must_use]
    pub const fn relation_assembly(&self) -> RelationAssembly {
        self.relation_assembly
    }
}

/// Fetch points of interest through a [`QueryExecutor`].
///
/// # Examples
///
/// ```
/// use osmpoi_core::{BoundingBox, SearchArea, TagFilter};
/// use osmpoi_data::PoiFetcher;
/// use osmpoi_data::overpass::test_support::StubQueryExecutor;
///
/// let executor = StubQueryExecutor::with_response(serde_json::json!({
///     "elements": [
///         {"type": "node", "id": 1, "lat": 0.5, "lon": 0.5, "tags": {"amenity": "cafe"}}
///     ]
/// }));
/// let fetcher = PoiFetcher::new(&executor);
/// let tags = TagFilter::from_json(&serde_json::json!({"amenity": true}))?;
/// let area = SearchArea::from_bounds(BoundingBox::new(1.0, 0.0, 1.0, 0.0)?);
///
/// let table = fetcher.fetch(&tags, &area)?;
/// assert_eq!(table.len(), 1);
/// # Ok::<(), osmpoi_data::PoiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PoiFetcher<E, B = SphericalBounds> {
    executor: E,
    bounds: B,
    options: PoiQueryOptions,
}

impl<E: QueryExecutor> PoiFetcher<E> {
    /// Fetcher with default options and spherical point bounds.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            bounds: SphericalBounds,
            options: PoiQueryOptions::default(),
        }
    }
}

impl<E: QueryExecutor, B: BoundsFromPoint> PoiFetcher<E, B> {
    /// Replace the query options.
    #[must_use]
    pub fn with_options(mut self, options: PoiQueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the point-to-bounding-box strategy.
    pub fn with_bounds_from_point<C: BoundsFromPoint>(self, bounds: C) -> PoiFetcher<E, C> {
        PoiFetcher {
            executor: self.executor,
            bounds,
            options: self.options,
        }
    }

    /// Underlying executor.
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Active options.
    pub const fn options(&self) -> &PoiQueryOptions {
        &self.options
    }

    /// Run one query over `area` and assemble the matching records.
    ///
    /// # Errors
    ///
    /// Returns [`PoiError::Query`] when the executor fails and
    /// [`PoiError::Decode`] when the response does not follow the element
    /// schema. Bad individual records are logged and dropped.
    pub fn fetch(&self, tags: &TagFilter, area: &SearchArea) -> Result<PoiTable, PoiError> {
        let query = build_query(
            area.bounds(),
            tags,
            self.options.timeout,
            self.options.memory,
            self.options.custom_settings(),
        );
        debug!("Overpass query: {query}");

        let json = self.executor.execute(&query, self.options.timeout)?;
        let response: OverpassResponse =
            serde_json::from_value(json).map_err(|source| PoiError::Decode { source })?;
        if let Some(remark) = &response.remark {
            warn!("Overpass remark: {remark}");
        }

        let parsed = parse_response(&response, self.options.relation_assembly);
        let table = assemble(parsed, area.shape());
        info!(
            "Fetched {} POIs within {} ({} nodes, {} ways, {} relations)",
            table.len(),
            format_bbox(area.bounds()),
            table.count_kind(ElementKind::Node),
            table.count_kind(ElementKind::Way),
            table.count_kind(ElementKind::Relation)
        );
        Ok(table)
    }

    /// Fetch within `distance_m` metres of `point` (`x = longitude`).
    ///
    /// # Errors
    ///
    /// Returns [`PoiError::Bounds`] when the derived box is invalid, otherwise
    /// as [`fetch`](Self::fetch).
    pub fn from_point(
        &self,
        tags: &TagFilter,
        point: Coord<f64>,
        distance_m: f64,
    ) -> Result<PoiTable, PoiError> {
        let bounds = self.bounds.bbox_from_point(point, distance_m)?;
        self.fetch(tags, &SearchArea::from_bounds(bounds))
    }

    /// Geocode `address` and fetch within `distance_m` metres of it.
    ///
    /// # Errors
    ///
    /// Returns [`PoiError::Geocode`] when geocoding fails, otherwise as
    /// [`from_point`](Self::from_point).
    pub fn from_address<G: Geocoder + ?Sized>(
        &self,
        tags: &TagFilter,
        geocoder: &G,
        address: &str,
        distance_m: f64,
    ) -> Result<PoiTable, PoiError> {
        let point = geocoder.geocode(address)?;
        debug!("Geocoded {address:?} to lon={}, lat={}", point.x, point.y);
        self.from_point(tags, point, distance_m)
    }

    /// Fetch within `polygon`'s bounding box and keep rows whose centroid is
    /// strictly inside it.
    ///
    /// # Errors
    ///
    /// Returns [`PoiError::MissingArea`] for an empty polygon, otherwise as
    /// [`fetch`](Self::fetch).
    pub fn from_polygon(
        &self,
        tags: &TagFilter,
        polygon: impl Into<MultiPolygon<f64>>,
    ) -> Result<PoiTable, PoiError> {
        let area = SearchArea::from_polygon(polygon)?;
        self.fetch(tags, &area)
    }

    /// Resolve `place` to its boundary and fetch as
    /// [`from_polygon`](Self::from_polygon).
    ///
    /// `which_result` is the 1-based index among the resolver's matches.
    ///
    /// # Errors
    ///
    /// Returns [`PoiError::Geocode`] when resolution fails and
    /// [`PoiError::MissingArea`] when the boundary has no polygon.
    pub fn from_place<P: PlaceResolver + ?Sized>(
        &self,
        tags: &TagFilter,
        resolver: &P,
        place: &str,
        which_result: usize,
    ) -> Result<PoiTable, PoiError> {
        let boundary = resolver.resolve_place(place, which_result)?;
        let Some(shape) = boundary.polygon() else {
            warn!(
                "Place {place:?} resolved to {} without a polygon boundary",
                boundary.display_name
            );
            return Err(MissingAreaError.into());
        };
        self.from_polygon(tags, shape)
    }
}
