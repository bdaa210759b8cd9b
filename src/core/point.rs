//! 2D world point and degree-domain angle helpers.

use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees to `[0, 360)`.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// A position in world coordinates (world units).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// X coordinate (world units)
    pub x: f32,
    /// Y coordinate (world units)
    pub y: f32,
}

impl Point2 {
    /// Origin point.
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Absolute heading from this point to another, degrees in `[0, 360)`.
    pub fn bearing_to(&self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        wrap_degrees(dy.atan2(dx).to_degrees())
    }
}
