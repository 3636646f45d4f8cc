//! Deterministic geocoding doubles used by unit and behaviour tests.

use std::cell::Cell;

use geo::Coord;

use crate::{GeocodeError, Geocoder, PlaceBoundary, PlaceResolver};

/// `Geocoder` returning a fixed coordinate for every query.
#[derive(Debug, Clone)]
pub struct StubGeocoder {
    response: Result<Coord<f64>, GeocodeError>,
}

impl StubGeocoder {
    /// Resolve every query to `point` (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn at(point: Coord<f64>) -> Self {
        Self {
            response: Ok(point),
        }
    }

    /// Fail every query with `error`.
    #[must_use]
    pub fn failing(error: GeocodeError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, _query: &str) -> Result<Coord<f64>, GeocodeError> {
        self.response.clone()
    }
}

/// `PlaceResolver` serving a fixed, ordered list of boundaries.
///
/// `which_result` is 1-based; out-of-range requests return
/// [`GeocodeError::NoResults`]. The last requested index is recorded.
#[derive(Debug, Default)]
pub struct StubPlaceResolver {
    boundaries: Vec<PlaceBoundary>,
    last_requested: Cell<Option<usize>>,
}

impl StubPlaceResolver {
    /// Serve `boundaries` in order.
    #[must_use]
    pub fn with_boundaries<I>(boundaries: I) -> Self
    where
        I: IntoIterator<Item = PlaceBoundary>,
    {
        Self {
            boundaries: boundaries.into_iter().collect(),
            last_requested: Cell::new(None),
        }
    }

    /// The `which_result` of the most recent call.
    #[must_use]
    pub fn last_requested(&self) -> Option<usize> {
        self.last_requested.get()
    }
}

impl PlaceResolver for StubPlaceResolver {
    fn resolve_place(
        &self,
        place: &str,
        which_result: usize,
    ) -> Result<PlaceBoundary, GeocodeError> {
        self.last_requested.set(Some(which_result));
        which_result
            .checked_sub(1)
            .and_then(|index| self.boundaries.get(index))
            .cloned()
            .ok_or_else(|| GeocodeError::NoResults {
                query: place.to_owned(),
            })
    }
}
