//! Search areas: bounding boxes and optional polygon shapes.
//!
//! Queries are always issued against a [`BoundingBox`]. When a polygon is
//! supplied, its bounds drive the query and the shape itself is kept for a
//! post-hoc containment filter.

use geo::{BoundingRect, Coord, MultiPolygon, Rect};
use thiserror::Error;

/// Mean earth radius in metres used by [`SphericalBounds`].
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// Errors returned when bounding box coordinates are unusable.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoundsError {
    /// At least one coordinate was NaN or infinite.
    #[error("bounding box coordinates must be finite")]
    NonFinite,
    /// North did not lie strictly above south.
    #[error("north ({north}) must be greater than south ({south})")]
    InvertedLatitude {
        /// Northern latitude.
        north: f64,
        /// Southern latitude.
        south: f64,
    },
    /// East did not lie strictly right of west.
    #[error("east ({east}) must be greater than west ({west})")]
    InvertedLongitude {
        /// Eastern longitude.
        east: f64,
        /// Western longitude.
        west: f64,
    },
}

/// Neither a polygon nor a complete set of bounds was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a polygon or complete north, south, east and west bounds are required")]
pub struct MissingAreaError;

/// Errors returned when resolving a [`SearchArea`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AreaError {
    /// No usable area was supplied.
    #[error(transparent)]
    Missing(#[from] MissingAreaError),
    /// The supplied bounds were invalid.
    #[error(transparent)]
    Bounds(#[from] BoundsError),
}

/// Axis-aligned latitude/longitude box without antimeridian wraparound.
///
/// # Examples
///
/// ```
/// use osmpoi_core::BoundingBox;
///
/// # fn main() -> Result<(), osmpoi_core::BoundsError> {
/// let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0)?;
/// assert_eq!(bbox.north(), 1.0);
/// assert!(BoundingBox::new(0.0, 1.0, 1.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl BoundingBox {
    /// Validate and construct a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] when a coordinate is not finite or when the
    /// box is empty or inverted along either axis.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, BoundsError> {
        if ![north, south, east, west].iter().all(|value| value.is_finite()) {
            return Err(BoundsError::NonFinite);
        }
        if north <= south {
            return Err(BoundsError::InvertedLatitude { north, south });
        }
        if east <= west {
            return Err(BoundsError::InvertedLongitude { east, west });
        }
        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Construct from a `geo` rectangle (`x = longitude`, `y = latitude`).
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] when the rectangle is degenerate.
    pub fn from_rect(rect: Rect<f64>) -> Result<Self, BoundsError> {
        Self::new(rect.max().y, rect.min().y, rect.max().x, rect.min().x)
    }

    /// Northern latitude.
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Southern latitude.
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// Eastern longitude.
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Western longitude.
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// The box as a `geo` rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }
}

/// The area a POI query covers.
///
/// `bounds` always exists and scopes the remote query. `shape`, when present,
/// narrows the results to records whose centroid lies strictly within it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    bounds: BoundingBox,
    shape: Option<MultiPolygon<f64>>,
}

impl SearchArea {
    /// An area covering exactly `bounds`.
    #[must_use]
    pub const fn from_bounds(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            shape: None,
        }
    }

    /// An area bounded by `polygon`'s bounding box and filtered by its shape.
    ///
    /// # Errors
    ///
    /// Returns [`AreaError::Missing`] for an empty polygon and
    /// [`AreaError::Bounds`] when its bounding box is degenerate.
    pub fn from_polygon(polygon: impl Into<MultiPolygon<f64>>) -> Result<Self, AreaError> {
        let shape = polygon.into();
        let rect = shape.bounding_rect().ok_or(MissingAreaError)?;
        let bounds = BoundingBox::from_rect(rect)?;
        Ok(Self {
            bounds,
            shape: Some(shape),
        })
    }

    /// Resolve an area from an optional polygon and optional edge coordinates.
    ///
    /// A polygon takes precedence. Otherwise all four edges must be present.
    ///
    /// # Errors
    ///
    /// Returns [`AreaError::Missing`] when neither a polygon nor all four
    /// edges were given, or [`AreaError::Bounds`] for invalid coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use osmpoi_core::{AreaError, SearchArea};
    ///
    /// let area = SearchArea::resolve(None, Some(1.0), Some(0.0), Some(1.0), Some(0.0))?;
    /// assert!(area.shape().is_none());
    ///
    /// let missing = SearchArea::resolve(None, Some(1.0), None, Some(1.0), Some(0.0));
    /// assert!(matches!(missing, Err(AreaError::Missing(_))));
    /// # Ok::<(), AreaError>(())
    /// ```
    pub fn resolve(
        polygon: Option<MultiPolygon<f64>>,
        north: Option<f64>,
        south: Option<f64>,
        east: Option<f64>,
        west: Option<f64>,
    ) -> Result<Self, AreaError> {
        if let Some(shape) = polygon {
            return Self::from_polygon(shape);
        }
        match (north, south, east, west) {
            (Some(north), Some(south), Some(east), Some(west)) => Ok(Self::from_bounds(
                BoundingBox::new(north, south, east, west)?,
            )),
            _ => Err(MissingAreaError.into()),
        }
    }

    /// Bounding box used to scope the query.
    #[must_use]
    pub const fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Shape used for the centroid containment filter, if any.
    #[must_use]
    pub const fn shape(&self) -> Option<&MultiPolygon<f64>> {
        self.shape.as_ref()
    }
}

/// Compute a bounding box around a point.
pub trait BoundsFromPoint {
    /// Box extending `distance_m` metres north, south, east and west of
    /// `point` (`x = longitude`, `y = latitude`).
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError`] when the resulting box is degenerate, e.g. for
    /// non-positive distances or points at the poles.
    fn bbox_from_point(&self, point: Coord<f64>, distance_m: f64)
    -> Result<BoundingBox, BoundsError>;
}

/// Spherical-earth approximation of a point-radius bounding box.
///
/// Latitude offsets are `d / R`; longitude offsets are scaled by the cosine
/// of the point's latitude.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use osmpoi_core::{BoundsFromPoint, SphericalBounds};
///
/// let bbox = SphericalBounds.bbox_from_point(Coord { x: 0.0, y: 0.0 }, 1000.0)?;
/// assert!(bbox.north() > 0.0 && bbox.south() < 0.0);
/// # Ok::<(), osmpoi_core::BoundsError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SphericalBounds;

impl BoundsFromPoint for SphericalBounds {
    fn bbox_from_point(
        &self,
        point: Coord<f64>,
        distance_m: f64,
    ) -> Result<BoundingBox, BoundsError> {
        let delta_lat = (distance_m / EARTH_RADIUS_M).to_degrees();
        let delta_lon = (distance_m / (EARTH_RADIUS_M * point.y.to_radians().cos())).to_degrees();
        BoundingBox::new(
            point.y + delta_lat,
            point.y - delta_lat,
            point.x + delta_lon,
            point.x - delta_lon,
        )
    }
}
