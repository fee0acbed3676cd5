#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Field polygon geometry for the agromap pipeline.
//!
//! Callers draw polygons as ordered (latitude, longitude) vertex lists.
//! The raster query engine wants (longitude, latitude) rings, so this
//! crate owns the coordinate-order conversion, geodesic area, and the
//! bounding box used to frame imagery thumbnails. Small fields get a
//! buffered box — an unbuffered crop of a half-hectare plot is a
//! handful of pixels.

use geo::{BoundingRect, Coord, GeodesicArea, LineString, Polygon};
use serde::Serialize;
use thiserror::Error;

/// Minimum number of vertices for a valid field polygon.
pub const MIN_VERTICES: usize = 3;

/// Buffer applied to fields under [`SMALL_FIELD_SQ_M`], in meters.
const SMALL_FIELD_BUFFER_M: f64 = 800.0;
/// Buffer applied to fields under [`MEDIUM_FIELD_SQ_M`], in meters.
const MEDIUM_FIELD_BUFFER_M: f64 = 500.0;
/// Area threshold for the large thumbnail buffer, m².
const SMALL_FIELD_SQ_M: f64 = 10_000.0;
/// Area threshold for the medium thumbnail buffer, m².
const MEDIUM_FIELD_SQ_M: f64 = 100_000.0;

/// Meters per degree of latitude (WGS84 mean).
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Errors from polygon validation and region construction.
///
/// These are client-input failures: they propagate to the caller as a
/// bad request and are never absorbed by signal fallback.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// Fewer vertices than a polygon requires.
    #[error("polygon must have at least {MIN_VERTICES} vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// A coordinate was NaN or infinite.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending vertex.
        index: usize,
    },

    /// A coordinate was outside valid latitude/longitude ranges.
    #[error("vertex {index} is outside valid lat/lon ranges: ({lat}, {lon})")]
    OutOfRange {
        /// Index of the offending vertex.
        index: usize,
        /// Latitude supplied.
        lat: f64,
        /// Longitude supplied.
        lon: f64,
    },
}

/// A validated user-drawn field polygon in (latitude, longitude) order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPolygon {
    vertices: Vec<[f64; 2]>,
}

impl FieldPolygon {
    /// Validates and wraps a list of `[lat, lon]` vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if fewer than [`MIN_VERTICES`] vertices
    /// are supplied, or any coordinate is non-finite or out of range.
    pub fn new(vertices: Vec<[f64; 2]>) -> Result<Self, GeometryError> {
        if vertices.len() < MIN_VERTICES {
            return Err(GeometryError::TooFewVertices {
                count: vertices.len(),
            });
        }
        for (index, &[lat, lon]) in vertices.iter().enumerate() {
            if !lat.is_finite() || !lon.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { index });
            }
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(GeometryError::OutOfRange { index, lat, lon });
            }
        }
        Ok(Self { vertices })
    }

    /// The vertices as supplied, in `[lat, lon]` order.
    #[must_use]
    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// The first vertex, used as the representative point for
    /// point-based fallback queries. Returned as `(lat, lon)`.
    #[must_use]
    pub fn representative_point(&self) -> (f64, f64) {
        (self.vertices[0][0], self.vertices[0][1])
    }
}

/// Swaps a `[lat, lon]` vertex list into `[lon, lat]` order (or back —
/// the operation is its own inverse).
#[must_use]
pub fn swap_coordinate_order(vertices: &[[f64; 2]]) -> Vec<[f64; 2]> {
    vertices.iter().map(|&[a, b]| [b, a]).collect()
}

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Expands the box outward by `meters` on every side.
    ///
    /// Uses the flat per-degree approximation, which is plenty for
    /// thumbnail framing at field scale.
    #[must_use]
    pub fn buffered(self, meters: f64) -> Self {
        let lat_mid = f64::midpoint(self.south, self.north);
        let dlat = meters / METERS_PER_DEGREE_LAT;
        let dlon = meters / (METERS_PER_DEGREE_LAT * lat_mid.to_radians().cos().max(0.01));
        Self {
            west: self.west - dlon,
            south: self.south - dlat,
            east: self.east + dlon,
            north: self.north + dlat,
        }
    }

    /// The box as a closed `[lon, lat]` ring (five vertices).
    #[must_use]
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.west, self.south],
            [self.east, self.south],
            [self.east, self.north],
            [self.west, self.north],
            [self.west, self.south],
        ]
    }
}

/// A field polygon converted to the raster engine's conventions.
///
/// Owned by a single request; built from a [`FieldPolygon`] and
/// discarded with the response.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    ring: Vec<[f64; 2]>,
    area_sq_m: f64,
    bounds: BoundingBox,
}

impl RegionGeometry {
    /// Derives the engine-facing region from a validated polygon:
    /// (lon, lat) closed ring, geodesic area, bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the ring degenerates to an empty
    /// bounding rectangle (cannot happen for a validated polygon, but
    /// kept as a guard rather than a panic).
    pub fn from_polygon(polygon: &FieldPolygon) -> Result<Self, GeometryError> {
        let mut ring = swap_coordinate_order(polygon.vertices());
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }

        let shell: LineString<f64> = ring
            .iter()
            .map(|&[lon, lat]| Coord { x: lon, y: lat })
            .collect();
        let geo_polygon = Polygon::new(shell, vec![]);

        let area_sq_m = geo_polygon.geodesic_area_unsigned();

        let rect = geo_polygon
            .bounding_rect()
            .ok_or(GeometryError::TooFewVertices { count: 0 })?;
        let bounds = BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);

        Ok(Self {
            ring,
            area_sq_m,
            bounds,
        })
    }

    /// The closed `[lon, lat]` ring.
    #[must_use]
    pub fn ring(&self) -> &[[f64; 2]] {
        &self.ring
    }

    /// Geodesic polygon area in square meters.
    #[must_use]
    pub const fn area_sq_m(&self) -> f64 {
        self.area_sq_m
    }

    /// The polygon's own bounding box.
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The bounding box to frame imagery with: buffered by 800 m for
    /// fields under 1 ha, 500 m under 10 ha, otherwise the raw bounds.
    #[must_use]
    pub fn imagery_bounds(&self) -> BoundingBox {
        if self.area_sq_m < SMALL_FIELD_SQ_M {
            self.bounds.buffered(SMALL_FIELD_BUFFER_M)
        } else if self.area_sq_m < MEDIUM_FIELD_SQ_M {
            self.bounds.buffered(MEDIUM_FIELD_BUFFER_M)
        } else {
            self.bounds
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side_deg: f64) -> FieldPolygon {
        // Square with its southwest corner near Kano.
        let lat0 = 12.0;
        let lon0 = 8.5;
        FieldPolygon::new(vec![
            [lat0, lon0],
            [lat0, lon0 + side_deg],
            [lat0 + side_deg, lon0 + side_deg],
            [lat0 + side_deg, lon0],
        ])
        .unwrap()
    }

    #[test]
    fn rejects_too_few_vertices() {
        let err = FieldPolygon::new(vec![[12.0, 8.5], [12.1, 8.5]]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices { count: 2 });
    }

    #[test]
    fn rejects_non_finite_and_out_of_range() {
        let err = FieldPolygon::new(vec![[12.0, 8.5], [f64::NAN, 8.5], [12.1, 8.6]]).unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteCoordinate { index: 1 });

        let err = FieldPolygon::new(vec![[12.0, 8.5], [95.0, 8.5], [12.1, 8.6]]).unwrap_err();
        assert!(matches!(err, GeometryError::OutOfRange { index: 1, .. }));
    }

    #[test]
    fn coordinate_swap_is_its_own_inverse() {
        let original = vec![[12.0, 8.5], [12.0, 8.6], [12.1, 8.6], [12.1, 8.5]];
        let swapped = swap_coordinate_order(&original);
        assert_eq!(swapped[0], [8.5, 12.0]);
        assert_eq!(swap_coordinate_order(&swapped), original);
    }

    #[test]
    fn region_ring_is_closed_lon_lat() {
        let polygon = square(0.01);
        let region = RegionGeometry::from_polygon(&polygon).unwrap();
        let ring = region.ring();
        assert_eq!(ring.first(), ring.last());
        // (lon, lat): longitude 8.5 comes first.
        assert_eq!(ring[0], [8.5, 12.0]);
    }

    #[test]
    fn area_of_known_square_is_plausible() {
        // 0.01° x 0.01° at 12°N is roughly 1.1 km x 1.1 km.
        let region = RegionGeometry::from_polygon(&square(0.01)).unwrap();
        let area = region.area_sq_m();
        assert!(area > 1.0e6, "area too small: {area}");
        assert!(area < 1.4e6, "area too large: {area}");
    }

    #[test]
    fn imagery_bounds_buffer_thresholds() {
        // ~0.0001° square: a few hundred m², buffered by 800 m.
        let tiny = RegionGeometry::from_polygon(&square(0.0001)).unwrap();
        assert!(tiny.area_sq_m() < 10_000.0);
        let buffered = tiny.imagery_bounds();
        let raw = tiny.bounds();
        let grown_m = (buffered.north - raw.north) * 111_320.0;
        assert!((grown_m - 800.0).abs() < 1.0);

        // ~0.002° square: ~5 ha, buffered by 500 m.
        let medium = RegionGeometry::from_polygon(&square(0.002)).unwrap();
        assert!(medium.area_sq_m() > 10_000.0 && medium.area_sq_m() < 100_000.0);
        let grown_m = (medium.imagery_bounds().north - medium.bounds().north) * 111_320.0;
        assert!((grown_m - 500.0).abs() < 1.0);

        // ~0.02° square: ~500 ha, no buffer.
        let large = RegionGeometry::from_polygon(&square(0.02)).unwrap();
        assert!(large.area_sq_m() > 100_000.0);
        assert_eq!(large.imagery_bounds(), large.bounds());
    }

    #[test]
    fn representative_point_is_first_vertex() {
        let polygon = square(0.01);
        assert_eq!(polygon.representative_point(), (12.0, 8.5));
    }
}
