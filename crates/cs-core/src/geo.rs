//! Coordinate types.
//!
//! The external simulator works in a planar, metre-based network frame
//! ([`PlanarPoint`]).  Local nodes carry a 3D [`Position`] where the third
//! coordinate is a configured constant altitude.  The visualiser expects
//! WGS-84 coordinates ([`GeoPoint`]), obtained through the external
//! simulator's projection query.

use std::fmt;

/// A point in the external simulator's planar network frame, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Lift into 3D with a constant `altitude`.
    #[inline]
    pub fn with_altitude(self, altitude: f64) -> Position {
        Position { x: self.x, y: self.y, z: altitude }
    }
}

/// A local node position in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Arithmetic midpoint of two coordinates.  Adequate for the extent of a
    /// road network; not meaningful across the antimeridian.
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Axis-aligned bounding box of the road network in the planar frame.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Boundary {
    pub lower_left:  PlanarPoint,
    pub upper_right: PlanarPoint,
}

impl Boundary {
    pub fn new(lower_left: PlanarPoint, upper_right: PlanarPoint) -> Self {
        Self { lower_left, upper_right }
    }
}
