//! Rover state record and decision-mode types.
//!
//! `RoverState` is the single mutable record shared between the harness,
//! the perception pipeline, and the decision controller. The harness owns
//! it; the pipeline rewrites the perception snapshot each cycle; the
//! controller reads telemetry and features and writes actuation plus its
//! own working state. Nothing persists anywhere else.

use crate::config::AttitudeConfig;
use crate::core::Point2;
use crate::perception::PerceptionSnapshot;

/// Decision-controller mode.
///
/// A closed set: every transition lands on one of these variants, so a
/// missing state is a compile error rather than a silent no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Initial state; records home and aligns to the start heading
    Start,
    /// Primary driving state
    Forward,
    /// Stopping or stopped, deciding where to go next
    Stop,
    /// Driving toward a visible target sample
    ApproachTarget,
    /// Holding still while the pickup mechanism runs
    Pickup,
    /// Stall recovery, tagged with the recovery variant
    Stuck(RecoveryKind),
    /// Final-leg navigation back to the recorded home position
    GoHome,
}

impl Mode {
    /// Mode name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Start => "Start",
            Mode::Forward => "Forward",
            Mode::Stop => "Stop",
            Mode::ApproachTarget => "ApproachTarget",
            Mode::Pickup => "Pickup",
            Mode::Stuck(RecoveryKind::Default) => "Stuck",
            Mode::Stuck(RecoveryKind::Obstacle) => "Stuck/Obstacle",
            Mode::Stuck(RecoveryKind::Homing) => "Stuck/Homing",
            Mode::GoHome => "GoHome",
        }
    }
}

/// Variant of stall recovery being performed.
///
/// Replaces the original controller's three independent booleans; invalid
/// combinations are unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryKind {
    /// Ordinary stall in open terrain: short escape turn toward terrain
    Default,
    /// Stalled against an obstacle: longer, counter-clockwise escape turn
    Obstacle,
    /// Stalled on the final leg home: escape turn plus a timed drive-out
    Homing,
}

/// Rover telemetry, written by the harness each cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Telemetry {
    /// Position in world coordinates
    pub pos: Point2,
    /// Heading, degrees in `[0, 360)`
    pub yaw: f32,
    /// Signed scalar velocity
    pub vel: f32,
    /// Roll, degrees in `[0, 360)` with wraparound
    pub roll: f32,
    /// Pitch, degrees in `[0, 360)` with wraparound
    pub pitch: f32,
    /// Within pickup range of a target sample
    pub near_sample: bool,
    /// Pickup animation in progress
    pub picking_up: bool,
}

impl Telemetry {
    /// Whether roll and pitch are near level.
    ///
    /// The vision pipeline gates cumulative-map updates on this so that
    /// tilted frames do not smear the map. Roll/pitch wrap through 360, so
    /// "near zero" means within the limit on either side of the wrap.
    pub fn attitude_level(&self, limits: &AttitudeConfig) -> bool {
        let roll_ok = self.roll < limits.roll_max || self.roll > 360.0 - limits.roll_max;
        let pitch_ok = self.pitch < limits.pitch_max || self.pitch > 360.0 - limits.pitch_max;
        roll_ok && pitch_ok
    }
}

/// Actuation commands, written by the controller, consumed by the harness.
#[derive(Clone, Copy, Debug, Default)]
pub struct Actuation {
    /// Throttle level (zero whenever braking)
    pub throttle: f32,
    /// Brake level (zero whenever throttling)
    pub brake: f32,
    /// Steering angle, degrees, clamped to the four-wheel-turn range
    pub steer: f32,
    /// One-shot sample-pickup request; cleared by the harness once issued
    pub send_pickup: bool,
}

/// The single shared rover record.
///
/// Created once at mission start and kept alive for the whole run; the
/// controller's timing-based detections (stall, bend escape, temporary
/// target loss) work precisely because these fields persist across cycles.
#[derive(Clone, Debug)]
pub struct RoverState {
    /// Telemetry snapshot for this cycle
    pub telemetry: Telemetry,
    /// Perception features for this cycle
    pub perception: PerceptionSnapshot,
    /// Commanded actuation
    pub actuation: Actuation,

    // --- Controller-owned working state ---
    /// Current decision mode
    pub mode: Mode,
    /// Recorded start position; set on the first cycle and never cleared
    pub home: Option<Point2>,
    /// Heading the controller is trying to hold or return to (degrees)
    pub target_yaw: f32,
    /// Bearing to the current target sample (degrees)
    pub target_angle: f32,
    /// Signed heading error toward the current target (degrees)
    pub yaw_error: f32,
    /// Cycles spent in the current timing window (stall detection and
    /// recovery sequencing)
    pub stall_cycles: u32,
    /// Consecutive cycles the target sample has been out of sight
    pub blind_cycles: u32,
    /// Obstacle detected directly ahead on the last driving cycle
    pub obstacle_ahead: bool,
    /// Escape-turn direction (+1/-1) once recovery has started; `None`
    /// marks the first recovery cycle
    pub recovery_dir: Option<f32>,
    /// Samples collected so far
    pub sample_count: u32,
    /// Cached distance to home (world units)
    pub dist_home: f32,
}

impl RoverState {
    /// Create a mission-start state: everything zeroed, mode `Start`.
    pub fn new() -> Self {
        Self {
            telemetry: Telemetry::default(),
            perception: PerceptionSnapshot::default(),
            actuation: Actuation::default(),
            mode: Mode::Start,
            home: None,
            target_yaw: 0.0,
            target_angle: 0.0,
            yaw_error: 0.0,
            stall_cycles: 0,
            blind_cycles: 0,
            obstacle_ahead: false,
            recovery_dir: None,
            sample_count: 0,
            dist_home: 0.0,
        }
    }
}

impl Default for RoverState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let rover = RoverState::new();
        assert_eq!(rover.mode, Mode::Start);
        assert!(rover.home.is_none());
        assert_eq!(rover.sample_count, 0);
        assert!(!rover.actuation.send_pickup);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Forward.name(), "Forward");
        assert_eq!(Mode::Stuck(RecoveryKind::Default).name(), "Stuck");
        assert_eq!(Mode::Stuck(RecoveryKind::Homing).name(), "Stuck/Homing");
        assert_eq!(Mode::GoHome.name(), "GoHome");
    }

    #[test]
    fn test_attitude_level_wraps_through_zero() {
        let limits = AttitudeConfig::default();
        let mut telemetry = Telemetry::default();
        assert!(telemetry.attitude_level(&limits));

        // Just below 360 counts as near level
        telemetry.roll = 359.5;
        telemetry.pitch = 359.9;
        assert!(telemetry.attitude_level(&limits));

        // A real tilt does not
        telemetry.roll = 5.0;
        assert!(!telemetry.attitude_level(&limits));
    }
}
