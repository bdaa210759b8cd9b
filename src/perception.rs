//! Perception-interface types.
//!
//! The vision pipeline lives outside this crate. Each control cycle it
//! delivers three classes of geometric features in rover-local polar
//! coordinates: navigable terrain, obstacles, and target samples. This
//! module defines the container those features arrive in, plus the guarded
//! bearing accessors the controller steers by.
//!
//! Bearings are stored in radians (the pipeline's native output); the
//! controller works in degrees through the `*_deg` accessors, so the unit
//! conversion happens in exactly one place.

/// A set of sensed points in rover-local polar coordinates.
///
/// Structure-of-arrays layout: `dists[i]` and `angles[i]` describe one
/// point, with range in world units and bearing in radians (CCW positive
/// from the rover's forward axis).
#[derive(Clone, Debug, Default)]
pub struct PolarFeatures {
    dists: Vec<f32>,
    angles: Vec<f32>,
}

impl PolarFeatures {
    /// Create an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from parallel range/bearing vectors.
    ///
    /// The vectors must be the same length.
    pub fn from_raw(dists: Vec<f32>, angles: Vec<f32>) -> Self {
        debug_assert_eq!(dists.len(), angles.len());
        Self { dists, angles }
    }

    /// Append one sensed point (range in world units, bearing in radians).
    pub fn push(&mut self, dist: f32, angle_rad: f32) {
        self.dists.push(dist);
        self.angles.push(angle_rad);
    }

    /// Number of sensed points.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    /// Whether the set contains no points.
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.dists.clear();
        self.angles.clear();
    }

    /// Ranges of all points.
    pub fn dists(&self) -> &[f32] {
        &self.dists
    }

    /// Bearings of all points, radians.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Mean bearing in degrees, or `None` when the set is empty.
    ///
    /// Returning `None` instead of NaN is what lets the controller retain
    /// its previous steering command when a frame carries no features.
    pub fn mean_bearing_deg(&self) -> Option<f32> {
        if self.angles.is_empty() {
            return None;
        }
        let sum: f32 = self.angles.iter().sum();
        Some((sum / self.angles.len() as f32).to_degrees())
    }

    /// Mean bearing in degrees over points closer than `max_range`, or
    /// `None` when no point qualifies.
    pub fn mean_bearing_deg_within(&self, max_range: f32) -> Option<f32> {
        let mut sum = 0.0;
        let mut n = 0usize;
        for (dist, angle) in self.dists.iter().zip(&self.angles) {
            if *dist < max_range {
                sum += *angle;
                n += 1;
            }
        }
        if n == 0 {
            None
        } else {
            Some((sum / n as f32).to_degrees())
        }
    }

    /// Number of points closer than `max_range`.
    pub fn count_within(&self, max_range: f32) -> usize {
        self.dists.iter().filter(|d| **d < max_range).count()
    }
}

/// One cycle's worth of perception output.
///
/// Replaced wholesale by the pipeline before each decision step. The
/// cumulative occupancy map the pipeline also maintains is not part of this
/// snapshot; the controller never reads it.
#[derive(Clone, Debug, Default)]
pub struct PerceptionSnapshot {
    /// Navigable-terrain points
    pub nav: PolarFeatures,
    /// Target-sample points
    pub rocks: PolarFeatures,
    /// Obstacle points
    pub obstacles: PolarFeatures,
}

impl PerceptionSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all three feature classes.
    pub fn clear(&mut self) {
        self.nav.clear();
        self.rocks.clear();
        self.obstacles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_empty_mean_is_none() {
        let features = PolarFeatures::new();
        assert_eq!(features.mean_bearing_deg(), None);
        assert_eq!(features.mean_bearing_deg_within(10.0), None);
    }

    #[test]
    fn test_mean_bearing_converts_to_degrees() {
        let mut features = PolarFeatures::new();
        features.push(1.0, FRAC_PI_4);
        features.push(2.0, FRAC_PI_4);
        assert_relative_eq!(features.mean_bearing_deg().unwrap(), 45.0, epsilon = 1e-4);
    }

    #[test]
    fn test_near_field_filter() {
        let mut features = PolarFeatures::new();
        features.push(5.0, FRAC_PI_4); // near, 45 deg
        features.push(50.0, -FRAC_PI_4); // far, ignored
        let near = features.mean_bearing_deg_within(10.0).unwrap();
        assert_relative_eq!(near, 45.0, epsilon = 1e-4);
        // Unfiltered mean includes both points
        assert_relative_eq!(features.mean_bearing_deg().unwrap(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_count_within() {
        let features = PolarFeatures::from_raw(vec![2.0, 8.0, 12.0], vec![0.0, 0.1, 0.2]);
        assert_eq!(features.count_within(10.0), 2);
        assert_eq!(features.count_within(1.0), 0);
        assert_eq!(features.len(), 3);
    }
}
