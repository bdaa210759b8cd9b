//! Decision engine: mode state machine and shared motion primitives.

pub mod controller;
pub mod motion;

pub use controller::DecisionController;
pub use motion::{clamp_steer, full_stop, hold_speed, turn_direction, STEER_LIMIT};
