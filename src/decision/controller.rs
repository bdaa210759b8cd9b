//! Decision controller state machine.
//!
//! One call to [`DecisionController::step`] per control period. The
//! controller reads the telemetry and perception fields of [`RoverState`],
//! dispatches on the current [`Mode`], and writes actuation plus its own
//! working state back into the record. It never blocks, never fails, and
//! keeps no state of its own beyond configuration: all persistence flows
//! through `RoverState`, which is what makes the cycle-counted detections
//! (stall, bend escape, target loss) work.

use crate::config::NavConfig;
use crate::state::{Mode, RecoveryKind, RoverState};

use super::motion;

/// Heading the rover aligns to before the first drive, degrees.
const START_HEADING: f32 = 170.0;
/// Heading tolerance for in-place alignment turns, degrees.
const YAW_ALIGN_TOL: f32 = 5.0;
/// Bearing tolerance under which the rover drives straight at a sample.
const TARGET_ALIGN_TOL: f32 = 15.0;
/// Heading tolerance on the final leg home, degrees.
const HOME_ALIGN_TOL: f32 = 10.0;
/// Maximum mean sample bearing that triggers an approach, degrees.
const ROCK_BEARING_MAX: f32 = 35.0;
/// Obstacle range considered "directly ahead", world units.
const OBSTACLE_NEAR: f32 = 10.0;
/// Velocity below which the rover counts as not moving.
const STALL_VEL: f32 = 0.1;
/// Velocity below which a commanded stop counts as settled.
const STOP_SETTLE_VEL: f32 = 0.2;
/// Stalled cycles in `Forward` before entering recovery.
const FORWARD_STALL_LIMIT: u32 = 70;
/// Stalled cycles in `ApproachTarget` before the bend-escape maneuver.
const APPROACH_STALL_LIMIT: u32 = 150;
/// Stalled cycles in `GoHome` before entering recovery.
const HOMING_STALL_LIMIT: u32 = 50;
/// Escape-turn window for ordinary stalls, cycles.
const ESCAPE_CYCLES: u32 = 20;
/// Escape-turn window for obstacle stalls, cycles.
const ESCAPE_CYCLES_OBSTACLE: u32 = 50;
/// Cycle count bounding the homing-recovery drive-out phase.
const HOMING_DRIVE_LIMIT: u32 = 120;
/// Cycles the target may stay out of sight before the approach is abandoned.
const BLIND_LIMIT: u32 = 20;
/// Distance to home treated as arrived, world units.
const HOME_ARRIVE_RADIUS: f32 = 1.0;
/// Speed held while driving out of a homing stall.
const HOMING_RECOVERY_SPEED: f32 = 0.5;
/// Throttle used while driving out of a homing stall.
const HOMING_RECOVERY_THROTTLE: f32 = 0.5;

/// Reactive decision controller.
///
/// Holds only configuration; see the module docs for the cycle contract.
pub struct DecisionController {
    config: NavConfig,
}

impl DecisionController {
    /// Create a controller with the given configuration.
    pub fn new(config: NavConfig) -> Self {
        Self { config }
    }

    /// Create a controller with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(NavConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Run one decision cycle.
    pub fn step(&self, rover: &mut RoverState) {
        let prev = rover.mode;

        match rover.mode {
            Mode::Start => self.step_start(rover),
            Mode::Forward => self.step_forward(rover),
            Mode::Stop => self.step_stop(rover),
            Mode::ApproachTarget => self.step_approach(rover),
            Mode::Pickup => self.step_pickup(rover),
            Mode::Stuck(kind) => self.step_stuck(rover, kind),
            Mode::GoHome => self.step_home(rover),
        }

        if rover.mode != prev {
            match rover.mode {
                Mode::Stuck(_) => {
                    tracing::warn!("mode {} -> {}", prev.name(), rover.mode.name())
                }
                _ => tracing::info!("mode {} -> {}", prev.name(), rover.mode.name()),
            }
        }

        // One-shot pickup request, independent of mode: stopped next to a
        // sample with no pickup already running.
        if rover.telemetry.near_sample && rover.telemetry.vel == 0.0 && !rover.telemetry.picking_up
        {
            rover.actuation.send_pickup = true;
        }
    }

    /// Record home, then four-wheel turn onto the start heading.
    fn step_start(&self, rover: &mut RoverState) {
        rover.target_yaw = START_HEADING;
        rover.yaw_error = rover.target_yaw - rover.telemetry.yaw;

        if rover.home.is_none() {
            rover.home = Some(rover.telemetry.pos);
            tracing::info!(
                "home recorded at ({:.2}, {:.2})",
                rover.telemetry.pos.x,
                rover.telemetry.pos.y
            );
        } else if rover.yaw_error.abs() > YAW_ALIGN_TOL {
            rover.actuation.brake = 0.0;
            rover.actuation.throttle = 0.0;
            rover.actuation.steer = motion::STEER_LIMIT * motion::turn_direction(rover.yaw_error);
        } else {
            rover.actuation.steer = 0.0;
            rover.mode = Mode::Forward;
        }
    }

    /// Primary driving state.
    fn step_forward(&self, rover: &mut RoverState) {
        let cfg = &self.config;

        // Crude stall check: commanded throttle but no motion.
        if rover.telemetry.vel < STALL_VEL && rover.actuation.throttle > 0.0 {
            rover.stall_cycles += 1;
        } else {
            rover.stall_cycles = 0;
        }

        if rover.stall_cycles >= FORWARD_STALL_LIMIT {
            let kind = if rover.obstacle_ahead {
                RecoveryKind::Obstacle
            } else {
                RecoveryKind::Default
            };
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
            rover.mode = Mode::Stuck(kind);
            return;
        }

        if rover.perception.nav.len() >= cfg.terrain.stop_forward {
            // Terrain looks good: throttle until cruise speed, then coast.
            if rover.telemetry.vel < cfg.speed.max_vel {
                rover.actuation.throttle = cfg.speed.throttle_set;
            } else {
                rover.actuation.throttle = 0.0;
            }
            rover.actuation.brake = 0.0;

            // Latch whether something sits directly ahead; consumed by the
            // recovery variant selection above if a stall develops.
            rover.obstacle_ahead =
                rover.perception.obstacles.count_within(OBSTACLE_NEAR) > 1;

            // Steer by the near-field terrain, biased to hug the wall.
            // When the frame has no near-field points the previous command
            // is retained rather than computed from nothing.
            if let Some(bearing) = rover
                .perception
                .nav
                .mean_bearing_deg_within(cfg.terrain.nav_close)
            {
                rover.actuation.steer = motion::clamp_steer(bearing - cfg.terrain.nav_adjust);
            }

            // A sample ahead: stop, and once settled, go after it. The
            // current heading is saved so exploration resumes on the same
            // track after the pickup.
            if let Some(rock_bearing) = rover.perception.rocks.mean_bearing_deg() {
                if rock_bearing.abs() < ROCK_BEARING_MAX {
                    motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
                    if rover.telemetry.vel == 0.0 {
                        rover.mode = Mode::ApproachTarget;
                        rover.target_yaw = rover.telemetry.yaw;
                        rover.stall_cycles = 0;
                    }
                }
            }
        } else {
            // Not enough navigable terrain ahead.
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
            rover.mode = Mode::Stop;
        }

        // Homing check runs every cycle once the sample quota is met, so
        // re-entering the home zone is never missed.
        if rover.sample_count >= cfg.homing.samples_required {
            if let Some(home) = rover.home {
                rover.dist_home = rover.telemetry.pos.distance(home);
                if rover.dist_home < cfg.homing.home_prox {
                    rover.mode = Mode::GoHome;
                }
            }
        }
    }

    /// Stopped or stopping; spin until the view opens up, then drive.
    fn step_stop(&self, rover: &mut RoverState) {
        let cfg = &self.config;
        rover.stall_cycles = 0;

        if rover.telemetry.vel > STOP_SETTLE_VEL {
            // Still rolling: keep braking.
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_nom);
        } else if rover.perception.nav.len() < cfg.terrain.go_forward {
            // View is blocked: release the brake and spin in place. The
            // fixed left turn pairs with the right-wall-hugging bias in
            // Forward.
            rover.actuation.throttle = 0.0;
            rover.actuation.brake = 0.0;
            rover.actuation.steer = motion::STEER_LIMIT;
        } else {
            rover.actuation.throttle = cfg.speed.throttle_set;
            rover.actuation.brake = 0.0;
            if let Some(bearing) = rover.perception.nav.mean_bearing_deg() {
                rover.actuation.steer = motion::clamp_steer(bearing);
            }
            rover.mode = Mode::Forward;
        }
    }

    /// Close on a visible sample.
    fn step_approach(&self, rover: &mut RoverState) {
        let cfg = &self.config;

        if let Some(rock_bearing) = rover.perception.rocks.mean_bearing_deg() {
            rover.target_angle = rock_bearing;
            rover.blind_cycles = 0;

            if rover.target_angle.abs() > TARGET_ALIGN_TOL {
                // Too far off axis: stop, then four-wheel turn onto it.
                if rover.telemetry.vel > 0.0 {
                    motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
                } else {
                    rover.actuation.brake = 0.0;
                    rover.yaw_error = rover.target_angle;
                    rover.actuation.steer =
                        motion::STEER_LIMIT * motion::turn_direction(rover.yaw_error);
                }
            } else {
                motion::hold_speed(
                    &mut rover.actuation,
                    rover.telemetry.vel,
                    cfg.approach.target_speed,
                    cfg.approach.target_throttle,
                    cfg.speed.brake_nom,
                );
                rover.actuation.steer = motion::clamp_steer(rover.target_angle);
            }

            // Approach-specific stall check; samples on a bend tend to trap
            // the rover against the inside wall.
            if rover.actuation.throttle > 0.0 && rover.telemetry.vel < STALL_VEL {
                rover.stall_cycles += 1;
            } else {
                rover.stall_cycles = 0;
            }
            if rover.stall_cycles >= APPROACH_STALL_LIMIT {
                tracing::debug!("approach stalled, forcing bend-escape throttle");
                rover.actuation.steer = 0.0;
                rover.actuation.throttle = cfg.approach.bend_escape_throttle;
                rover.actuation.brake = 0.0;
                rover.stall_cycles = 0;
            }
        } else {
            // Sample out of sight; give it a grace window before falling
            // back to normal driving.
            rover.blind_cycles += 1;
            if rover.blind_cycles > BLIND_LIMIT {
                rover.blind_cycles = 0;
                rover.mode = Mode::Forward;
            }
        }

        if rover.telemetry.near_sample {
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
            rover.mode = Mode::Pickup;
            rover.blind_cycles = 0;
        }
    }

    /// Hold still through the pickup, then turn back onto the saved heading.
    fn step_pickup(&self, rover: &mut RoverState) {
        let cfg = &self.config;

        if rover.telemetry.near_sample {
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
        } else {
            rover.actuation.brake = 0.0;
            rover.yaw_error = rover.target_yaw - rover.telemetry.yaw;
            if rover.yaw_error.abs() > YAW_ALIGN_TOL {
                rover.actuation.steer =
                    motion::STEER_LIMIT * motion::turn_direction(rover.yaw_error);
            } else {
                rover.sample_count += 1;
                tracing::info!("sample secured ({} collected)", rover.sample_count);
                rover.mode = Mode::Forward;
            }
        }
    }

    /// Escape a stall: turn in place, then (for homing stalls) drive out.
    fn step_stuck(&self, rover: &mut RoverState, kind: RecoveryKind) {
        let cfg = &self.config;

        let dir = match rover.recovery_dir {
            Some(dir) => dir,
            None => {
                // First recovery cycle: pick the escape direction.
                rover.stall_cycles = 0;
                rover.actuation.throttle = 0.0;
                let dir = match kind {
                    // Obstacle stalls get a consistent CCW escape.
                    RecoveryKind::Obstacle => {
                        rover.obstacle_ahead = false;
                        1.0
                    }
                    // Otherwise turn toward the bulk of navigable terrain.
                    _ => {
                        if rover.perception.nav.mean_bearing_deg().unwrap_or(0.0) < 0.0 {
                            -1.0
                        } else {
                            1.0
                        }
                    }
                };
                rover.recovery_dir = Some(dir);
                dir
            }
        };

        let window = match kind {
            RecoveryKind::Obstacle => ESCAPE_CYCLES_OBSTACLE,
            _ => ESCAPE_CYCLES,
        };

        if rover.stall_cycles < window {
            rover.actuation.steer = dir * motion::STEER_LIMIT;
            rover.actuation.brake = 0.0;
            rover.actuation.throttle = 0.0;
            rover.stall_cycles += 1;
        } else if kind == RecoveryKind::Homing {
            // The home zone is littered with small rocks; after the turn,
            // drive out for a fixed window before resuming the final leg.
            motion::hold_speed(
                &mut rover.actuation,
                rover.telemetry.vel,
                HOMING_RECOVERY_SPEED,
                HOMING_RECOVERY_THROTTLE,
                cfg.speed.brake_nom,
            );
            rover.stall_cycles += 1;
            if rover.stall_cycles > HOMING_DRIVE_LIMIT {
                motion::full_stop(&mut rover.actuation, cfg.speed.brake_nom);
                rover.stall_cycles = 0;
                rover.recovery_dir = None;
                rover.mode = Mode::GoHome;
            }
        } else {
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
            rover.stall_cycles = 0;
            rover.recovery_dir = None;
            rover.obstacle_ahead = false;
            rover.mode = Mode::Forward;
        }
    }

    /// Final leg: face home, drive, hold once arrived.
    fn step_home(&self, rover: &mut RoverState) {
        let cfg = &self.config;

        let Some(home) = rover.home else {
            // No recorded home; nothing sensible to navigate to.
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
            return;
        };

        rover.dist_home = rover.telemetry.pos.distance(home);
        rover.target_yaw = rover.telemetry.pos.bearing_to(home);
        rover.yaw_error = rover.target_yaw - rover.telemetry.yaw;

        if rover.dist_home > HOME_ARRIVE_RADIUS {
            if rover.yaw_error.abs() > HOME_ALIGN_TOL {
                // Stop and turn to face home; driving misaligned tends to
                // orbit the home position.
                if rover.telemetry.vel > 0.0 {
                    motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
                } else {
                    rover.actuation.brake = 0.0;
                    rover.actuation.throttle = 0.0;
                    rover.actuation.steer =
                        motion::STEER_LIMIT * motion::turn_direction(rover.yaw_error);
                }
            } else {
                motion::hold_speed(
                    &mut rover.actuation,
                    rover.telemetry.vel,
                    cfg.homing.cruise_speed,
                    cfg.homing.cruise_throttle,
                    cfg.speed.brake_nom,
                );
                // Steering sharpens with misalignment instead of snapping
                // to the limit.
                rover.actuation.steer = motion::clamp_steer(rover.yaw_error.abs())
                    * motion::turn_direction(rover.yaw_error);

                if rover.telemetry.vel < STALL_VEL {
                    rover.stall_cycles += 1;
                } else {
                    rover.stall_cycles = 0;
                }
                if rover.stall_cycles >= HOMING_STALL_LIMIT {
                    motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
                    rover.mode = Mode::Stuck(RecoveryKind::Homing);
                }
            }
        } else {
            // Arrived: hold the full stop. Mission complete.
            motion::full_stop(&mut rover.actuation, cfg.speed.brake_set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point2;
    use approx::assert_relative_eq;

    fn controller() -> DecisionController {
        DecisionController::with_defaults()
    }

    /// Fill the nav feature set with `n` points at the given bearing (deg).
    fn fill_nav(rover: &mut RoverState, n: usize, bearing_deg: f32, dist: f32) {
        rover.perception.nav.clear();
        for _ in 0..n {
            rover.perception.nav.push(dist, bearing_deg.to_radians());
        }
    }

    #[test]
    fn test_start_records_home_once() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.telemetry.pos = Point2::new(99.5, 85.5);
        rover.telemetry.yaw = 60.0;

        ctrl.step(&mut rover);
        assert_eq!(rover.home, Some(Point2::new(99.5, 85.5)));
        assert_eq!(rover.mode, Mode::Start);

        // Moving afterwards must not re-record home
        rover.telemetry.pos = Point2::new(101.0, 85.0);
        ctrl.step(&mut rover);
        assert_eq!(rover.home, Some(Point2::new(99.5, 85.5)));
    }

    #[test]
    fn test_start_turns_shorter_arc_then_drives() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.telemetry.yaw = 60.0;

        ctrl.step(&mut rover); // records home
        ctrl.step(&mut rover); // yaw_error = 110 -> CCW turn
        assert_relative_eq!(rover.actuation.steer, 15.0);
        assert_eq!(rover.mode, Mode::Start);

        rover.telemetry.yaw = 168.0; // within tolerance
        ctrl.step(&mut rover);
        assert_relative_eq!(rover.actuation.steer, 0.0);
        assert_eq!(rover.mode, Mode::Forward);
    }

    #[test]
    fn test_forward_steering_retained_without_near_field() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::Forward;
        rover.actuation.steer = -7.0;
        // Plenty of terrain, but all of it beyond the near-field cutoff
        fill_nav(&mut rover, 100, 20.0, 40.0);

        ctrl.step(&mut rover);
        assert_eq!(rover.mode, Mode::Forward);
        assert_relative_eq!(rover.actuation.steer, -7.0);
    }

    #[test]
    fn test_forward_wall_hug_bias() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::Forward;
        fill_nav(&mut rover, 100, 12.0, 5.0);

        ctrl.step(&mut rover);
        // mean bearing 12 minus the 10-degree bias
        assert_relative_eq!(rover.actuation.steer, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_forward_latches_obstacle_ahead() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::Forward;
        fill_nav(&mut rover, 100, 0.0, 5.0);
        rover.perception.obstacles.push(4.0, 0.0);
        rover.perception.obstacles.push(6.0, 0.1);

        ctrl.step(&mut rover);
        assert!(rover.obstacle_ahead);

        rover.perception.obstacles.clear();
        ctrl.step(&mut rover);
        assert!(!rover.obstacle_ahead);
    }

    #[test]
    fn test_stop_spins_left_when_blocked() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::Stop;
        rover.telemetry.vel = 0.0;
        fill_nav(&mut rover, 10, 0.0, 5.0); // far below go_forward

        ctrl.step(&mut rover);
        assert_eq!(rover.mode, Mode::Stop);
        assert_relative_eq!(rover.actuation.steer, 15.0);
        assert_relative_eq!(rover.actuation.brake, 0.0);
        assert_relative_eq!(rover.actuation.throttle, 0.0);
    }

    #[test]
    fn test_stop_resumes_when_open() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::Stop;
        rover.telemetry.vel = 0.0;
        fill_nav(&mut rover, 600, -8.0, 5.0);

        ctrl.step(&mut rover);
        assert_eq!(rover.mode, Mode::Forward);
        assert_relative_eq!(rover.actuation.throttle, 0.4);
        assert_relative_eq!(rover.actuation.brake, 0.0);
        assert_relative_eq!(rover.actuation.steer, -8.0, epsilon = 1e-3);
    }

    #[test]
    fn test_approach_turns_in_place_when_off_axis() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::ApproachTarget;
        rover.telemetry.vel = 0.0;
        rover.perception.rocks.push(8.0, (-30.0_f32).to_radians());

        ctrl.step(&mut rover);
        assert_eq!(rover.mode, Mode::ApproachTarget);
        // -30 wraps to 330 >= 180, so the turn is clockwise
        assert_relative_eq!(rover.actuation.steer, -15.0);
        assert_relative_eq!(rover.actuation.throttle, 0.0);
    }

    #[test]
    fn test_approach_drives_at_sample_when_aligned() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::ApproachTarget;
        rover.telemetry.vel = 0.2;
        rover.perception.rocks.push(8.0, (10.0_f32).to_radians());

        ctrl.step(&mut rover);
        assert_relative_eq!(rover.actuation.throttle, 0.3);
        assert_relative_eq!(rover.actuation.brake, 0.0);
        assert_relative_eq!(rover.actuation.steer, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_gohome_arrived_holds_stop() {
        let ctrl = controller();
        let mut rover = RoverState::new();
        rover.mode = Mode::GoHome;
        rover.home = Some(Point2::new(100.0, 85.0));
        rover.telemetry.pos = Point2::new(100.3, 85.0);

        ctrl.step(&mut rover);
        assert_eq!(rover.mode, Mode::GoHome);
        assert_relative_eq!(rover.actuation.throttle, 0.0);
        assert_relative_eq!(rover.actuation.brake, 10.0);
        assert_relative_eq!(rover.actuation.steer, 0.0);
    }
}
