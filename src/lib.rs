//! # MargaNav
//!
//! Reactive decision engine for an autonomous sample-return rover.
//!
//! ## Overview
//!
//! The rover explores an unknown, partially-mapped environment. Once per
//! control period an external vision pipeline extracts geometric features
//! from the camera frame (navigable terrain, obstacles, target samples, as
//! rover-local range/bearing sets), the harness refreshes telemetry, and
//! this crate's [`DecisionController`] turns that snapshot into throttle,
//! brake and steering commands. The controller is a seven-mode finite
//! state machine with cycle-counted stall detection and recovery, a
//! sample approach/pickup sequence, and a return-to-home final leg once
//! the sample quota is collected.
//!
//! The controller is purely reactive: one synchronous, infallible step per
//! cycle, no lookahead, no planning, no I/O. Everything it remembers lives
//! in the shared [`RoverState`] record.
//!
//! ## Quick Start
//!
//! ```rust
//! use marga_nav::{DecisionController, Mode, NavConfig, RoverState};
//!
//! let controller = DecisionController::new(NavConfig::default());
//! let mut rover = RoverState::new();
//! rover.telemetry.yaw = 170.0; // already on the start heading
//!
//! controller.step(&mut rover); // first cycle records home
//! assert_eq!(rover.mode, Mode::Start);
//!
//! controller.step(&mut rover); // aligned: off we go
//! assert_eq!(rover.mode, Mode::Forward);
//! ```
//!
//! ## Coordinate System
//!
//! - World positions `(x, y)` in world units, X east, Y north
//! - Yaw in degrees `[0, 360)`, counter-clockwise positive
//! - Feature bearings rover-local, counter-clockwise positive; stored in
//!   radians at the perception interface, consumed in degrees by the
//!   controller

#![warn(missing_docs)]

// Core geometry types
pub mod core;

// Configuration (TOML)
pub mod config;

// Decision state machine
pub mod decision;

// Error types
pub mod error;

// Perception-interface types
pub mod perception;

// Shared rover record
pub mod state;

pub use config::{
    ApproachConfig, AttitudeConfig, HomingConfig, NavConfig, SpeedConfig, TerrainConfig,
};
pub use self::core::{wrap_degrees, Point2};
pub use decision::DecisionController;
pub use error::{NavError, Result};
pub use perception::{PerceptionSnapshot, PolarFeatures};
pub use state::{Actuation, Mode, RecoveryKind, RoverState, Telemetry};
