//! Shared motion primitives.
//!
//! Small, pure command helpers used by several decision modes: the
//! shorter-arc turn rule, the bang-bang speed governor, and the full-stop
//! command. All of them write through [`Actuation`] so the
//! throttle/brake-exclusivity and steering-clamp invariants are enforced
//! in one place.

use crate::state::Actuation;

/// Steering limit, degrees. At standstill a command at this limit induces
/// a four-wheel (in-place) turn.
pub const STEER_LIMIT: f32 = 15.0;

/// Velocity deadband for the speed governor.
pub const SPEED_DEADBAND: f32 = 0.1;

/// Direction of the shorter-arc turn for a signed heading error.
///
/// Returns `+1.0` (counter-clockwise) when `(yaw_error + 360) mod 360`
/// falls below 180, else `-1.0` (clockwise). Works for errors in any
/// range, wrapped or not.
#[inline]
pub fn turn_direction(yaw_error_deg: f32) -> f32 {
    if (yaw_error_deg + 360.0).rem_euclid(360.0) < 180.0 {
        1.0
    } else {
        -1.0
    }
}

/// Clamp a steering command to the four-wheel-turn range.
#[inline]
pub fn clamp_steer(steer_deg: f32) -> f32 {
    steer_deg.clamp(-STEER_LIMIT, STEER_LIMIT)
}

/// Hold velocity near `target_speed` without a PID loop.
///
/// Over target by more than the deadband: nominal braking. Below target:
/// apply `throttle` with the brake released. Otherwise coast.
pub fn hold_speed(
    actuation: &mut Actuation,
    vel: f32,
    target_speed: f32,
    throttle: f32,
    brake_nom: f32,
) {
    if vel > target_speed + SPEED_DEADBAND {
        actuation.throttle = 0.0;
        actuation.brake = brake_nom;
    } else if vel < target_speed {
        actuation.throttle = throttle;
        actuation.brake = 0.0;
    } else {
        actuation.throttle = 0.0;
        actuation.brake = 0.0;
    }
}

/// Command a full stop at the given brake level, steering zeroed.
pub fn full_stop(actuation: &mut Actuation, brake_val: f32) {
    actuation.throttle = 0.0;
    actuation.brake = brake_val;
    actuation.steer = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_turn_direction_shorter_arc() {
        // Positive errors under 180 turn CCW
        assert_relative_eq!(turn_direction(10.0), 1.0);
        assert_relative_eq!(turn_direction(170.0), 1.0);
        // Past the half circle the clockwise arc is shorter
        assert_relative_eq!(turn_direction(190.0), -1.0);
        assert_relative_eq!(turn_direction(350.0), -1.0);
        // Negative errors wrap: -10 is equivalent to 350
        assert_relative_eq!(turn_direction(-10.0), -1.0);
        assert_relative_eq!(turn_direction(-170.0), -1.0);
        assert_relative_eq!(turn_direction(-190.0), 1.0);
    }

    #[test]
    fn test_clamp_steer() {
        assert_relative_eq!(clamp_steer(40.0), STEER_LIMIT);
        assert_relative_eq!(clamp_steer(-40.0), -STEER_LIMIT);
        assert_relative_eq!(clamp_steer(7.5), 7.5);
    }

    #[test]
    fn test_hold_speed_brakes_when_fast() {
        let mut actuation = Actuation::default();
        hold_speed(&mut actuation, 1.0, 0.5, 0.3, 1.0);
        assert_relative_eq!(actuation.throttle, 0.0);
        assert_relative_eq!(actuation.brake, 1.0);
    }

    #[test]
    fn test_hold_speed_throttles_when_slow() {
        let mut actuation = Actuation::default();
        hold_speed(&mut actuation, 0.1, 0.5, 0.3, 1.0);
        assert_relative_eq!(actuation.throttle, 0.3);
        assert_relative_eq!(actuation.brake, 0.0);
    }

    #[test]
    fn test_hold_speed_coasts_in_deadband() {
        let mut actuation = Actuation::default();
        hold_speed(&mut actuation, 0.55, 0.5, 0.3, 1.0);
        assert_relative_eq!(actuation.throttle, 0.0);
        assert_relative_eq!(actuation.brake, 0.0);
    }

    #[test]
    fn test_full_stop() {
        let mut actuation = Actuation {
            throttle: 0.4,
            brake: 0.0,
            steer: 12.0,
            send_pickup: false,
        };
        full_stop(&mut actuation, 10.0);
        assert_relative_eq!(actuation.throttle, 0.0);
        assert_relative_eq!(actuation.brake, 10.0);
        assert_relative_eq!(actuation.steer, 0.0);
    }
}
