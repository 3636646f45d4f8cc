//! Geocoding collaborators consumed by the address and place entry points.
//!
//! The library never talks to a geocoding service itself. Callers supply
//! implementations of [`Geocoder`] and [`PlaceResolver`]; test doubles live in
//! `test_support`.

use geo::{Coord, Geometry, MultiPolygon};
use thiserror::Error;

/// Errors returned by geocoding collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The service returned no usable result for the query.
    #[error("no geocoding result for {query:?}")]
    NoResults {
        /// Text that was geocoded.
        query: String,
    },
    /// The service failed.
    #[error("geocoding service failed: {message}")]
    Service {
        /// Service-supplied failure description.
        message: String,
    },
}

/// Resolve free-text addresses to a single coordinate.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use osmpoi_core::{GeocodeError, Geocoder};
///
/// struct Fixed;
///
/// impl Geocoder for Fixed {
///     fn geocode(&self, _query: &str) -> Result<Coord<f64>, GeocodeError> {
///         Ok(Coord { x: 13.4, y: 52.5 })
///     }
/// }
///
/// assert_eq!(Fixed.geocode("Berlin")?.y, 52.5);
/// # Ok::<(), GeocodeError>(())
/// ```
pub trait Geocoder {
    /// Return the point (`x = longitude`, `y = latitude`) for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the query cannot be resolved.
    fn geocode(&self, query: &str) -> Result<Coord<f64>, GeocodeError>;
}

/// A geocoded place and its boundary geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceBoundary {
    /// Human-readable name reported by the service.
    pub display_name: String,
    /// Boundary geometry; may be a point for places without an outline.
    pub geometry: Geometry<f64>,
}

impl PlaceBoundary {
    /// Construct a boundary record.
    #[must_use]
    pub fn new(display_name: impl Into<String>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            display_name: display_name.into(),
            geometry: geometry.into(),
        }
    }

    /// The boundary as a multipolygon, when the geometry is areal.
    #[must_use]
    pub fn polygon(&self) -> Option<MultiPolygon<f64>> {
        match &self.geometry {
            Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
            Geometry::MultiPolygon(polygons) => Some(polygons.clone()),
            Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
            _ => None,
        }
    }
}

/// Resolve a place name to its boundary.
pub trait PlaceResolver {
    /// Return the `which_result`-th (1-based) boundary matching `place`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when no such result exists.
    fn resolve_place(
        &self,
        place: &str,
        which_result: usize,
    ) -> Result<PlaceBoundary, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Point, Rect, polygon};
    use rstest::rstest;

    #[rstest]
    fn areal_geometries_yield_polygons() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let boundary = PlaceBoundary::new("Square", square);
        assert_eq!(boundary.polygon().map(|p| p.0.len()), Some(1));

        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        assert!(PlaceBoundary::new("Rect", rect).polygon().is_some());
    }

    #[rstest]
    fn point_geometries_have_no_polygon() {
        let boundary = PlaceBoundary::new("Spot", Point::new(1.0, 2.0));
        assert!(boundary.polygon().is_none());
    }
}
