//! Core geometry types for the decision engine.
//!
//! Coordinate conventions:
//! - World positions are `(x, y)` in world units, X east, Y north.
//! - Yaw is degrees in `[0, 360)`, counter-clockwise from +X.
//! - Bearings are signed degrees relative to the rover's forward axis,
//!   counter-clockwise positive.

mod point;

pub use point::{wrap_degrees, Point2};
