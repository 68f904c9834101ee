//! 3D coordinate value type

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 3D point or direction.  Freely copied; entities store these by value.
///
/// A "not set" state is never represented in-band; fields that are only
/// conditionally present in a stream use `Option<Coord>` at the owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    /// Create a new coordinate
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Coord { x, y, z }
    }

    /// Origin
    pub const ZERO: Coord = Coord::new(0.0, 0.0, 0.0);

    /// Unit X axis
    pub const UNIT_X: Coord = Coord::new(1.0, 0.0, 0.0);

    /// Unit Y axis
    pub const UNIT_Y: Coord = Coord::new(0.0, 1.0, 0.0);

    /// Unit Z axis, the default extrusion direction
    pub const UNIT_Z: Coord = Coord::new(0.0, 0.0, 1.0);

    /// Length (magnitude)
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Squared length (avoids sqrt)
    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Normalized copy; returns self unchanged when degenerate
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Coord::new(self.x / len, self.y / len, self.z / len)
        } else {
            *self
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Coord) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    pub fn cross(&self, other: &Coord) -> Coord {
        Coord::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Distance to another point
    pub fn distance(&self, other: &Coord) -> f64 {
        (*self - *other).length()
    }
}

impl Default for Coord {
    fn default() -> Self {
        Coord::ZERO
    }
}

impl Add for Coord {
    type Output = Coord;
    fn add(self, other: Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Coord {
    type Output = Coord;
    fn sub(self, other: Coord) -> Coord {
        Coord::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Coord {
    type Output = Coord;
    fn mul(self, scalar: f64) -> Coord {
        Coord::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f64> for Coord {
    type Output = Coord;
    fn div(self, scalar: f64) -> Coord {
        Coord::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Coord {
    type Output = Coord;
    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
