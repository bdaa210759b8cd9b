//! Configuration loading for MargaNav

use crate::error::{NavError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    /// Speed and braking set-points
    #[serde(default)]
    pub speed: SpeedConfig,
    /// Terrain-driven steering thresholds
    #[serde(default)]
    pub terrain: TerrainConfig,
    /// Sample-approach tuning
    #[serde(default)]
    pub approach: ApproachConfig,
    /// Return-to-home tuning
    #[serde(default)]
    pub homing: HomingConfig,
    /// Attitude limits for map-quality gating
    #[serde(default)]
    pub attitude: AttitudeConfig,
}

/// Speed and braking set-points
#[derive(Clone, Debug, Deserialize)]
pub struct SpeedConfig {
    /// Maximum cruise velocity (world units/s, default: 2.0)
    #[serde(default = "default_max_vel")]
    pub max_vel: f32,

    /// Throttle applied while driving forward (default: 0.4)
    #[serde(default = "default_throttle_set")]
    pub throttle_set: f32,

    /// Hard braking level for full stops (default: 10.0)
    #[serde(default = "default_brake_set")]
    pub brake_set: f32,

    /// Nominal braking level for speed trimming (default: 1.0)
    #[serde(default = "default_brake_nom")]
    pub brake_nom: f32,
}

/// Terrain-driven steering thresholds
#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    /// Minimum navigable-terrain points to keep driving (default: 50)
    #[serde(default = "default_stop_forward")]
    pub stop_forward: usize,

    /// Minimum navigable-terrain points to resume driving from a stop
    /// (default: 500)
    #[serde(default = "default_go_forward")]
    pub go_forward: usize,

    /// Range cutoff for near-field steering (world units, default: 25.0)
    #[serde(default = "default_nav_close")]
    pub nav_close: f32,

    /// Wall-hugging steering bias subtracted from the mean terrain bearing
    /// (degrees, default: 10.0; positive biases toward the right wall)
    #[serde(default = "default_nav_adjust")]
    pub nav_adjust: f32,
}

/// Sample-approach tuning
#[derive(Clone, Debug, Deserialize)]
pub struct ApproachConfig {
    /// Speed held while closing on a visible sample (default: 0.5)
    #[serde(default = "default_target_speed")]
    pub target_speed: f32,

    /// Throttle used by the approach speed governor (default: 0.3)
    #[serde(default = "default_target_throttle")]
    pub target_throttle: f32,

    /// Throttle forced by the bend-escape maneuver after a long approach
    /// stall (default: 10.0)
    #[serde(default = "default_bend_escape_throttle")]
    pub bend_escape_throttle: f32,
}

/// Return-to-home tuning
#[derive(Clone, Debug, Deserialize)]
pub struct HomingConfig {
    /// Samples to collect before homing is armed (default: 6)
    #[serde(default = "default_samples_required")]
    pub samples_required: u32,

    /// Distance to home that triggers the final leg (world units,
    /// default: 15.0)
    #[serde(default = "default_home_prox")]
    pub home_prox: f32,

    /// Speed held on the final leg (default: 1.0)
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: f32,

    /// Throttle used by the final-leg speed governor (default: 0.2)
    #[serde(default = "default_cruise_throttle")]
    pub cruise_throttle: f32,
}

/// Attitude limits for map-quality gating
///
/// The vision pipeline only folds a frame into the cumulative map when roll
/// and pitch are near level; these are the limits it checks against.
#[derive(Clone, Debug, Deserialize)]
pub struct AttitudeConfig {
    /// Maximum roll magnitude for a map-worthy frame (degrees, default: 1.0)
    #[serde(default = "default_roll_max")]
    pub roll_max: f32,

    /// Maximum pitch magnitude for a map-worthy frame (degrees,
    /// default: 0.8)
    #[serde(default = "default_pitch_max")]
    pub pitch_max: f32,
}

fn default_max_vel() -> f32 {
    2.0
}
fn default_throttle_set() -> f32 {
    0.4
}
fn default_brake_set() -> f32 {
    10.0
}
fn default_brake_nom() -> f32 {
    1.0
}

fn default_stop_forward() -> usize {
    50
}
fn default_go_forward() -> usize {
    500
}
fn default_nav_close() -> f32 {
    25.0
}
fn default_nav_adjust() -> f32 {
    10.0
}

fn default_target_speed() -> f32 {
    0.5
}
fn default_target_throttle() -> f32 {
    0.3
}
fn default_bend_escape_throttle() -> f32 {
    10.0
}

fn default_samples_required() -> u32 {
    6
}
fn default_home_prox() -> f32 {
    15.0
}
fn default_cruise_speed() -> f32 {
    1.0
}
fn default_cruise_throttle() -> f32 {
    0.2
}

fn default_roll_max() -> f32 {
    1.0
}
fn default_pitch_max() -> f32 {
    0.8
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            max_vel: default_max_vel(),
            throttle_set: default_throttle_set(),
            brake_set: default_brake_set(),
            brake_nom: default_brake_nom(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            stop_forward: default_stop_forward(),
            go_forward: default_go_forward(),
            nav_close: default_nav_close(),
            nav_adjust: default_nav_adjust(),
        }
    }
}

impl Default for ApproachConfig {
    fn default() -> Self {
        Self {
            target_speed: default_target_speed(),
            target_throttle: default_target_throttle(),
            bend_escape_throttle: default_bend_escape_throttle(),
        }
    }
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            samples_required: default_samples_required(),
            home_prox: default_home_prox(),
            cruise_speed: default_cruise_speed(),
            cruise_throttle: default_cruise_throttle(),
        }
    }
}

impl Default for AttitudeConfig {
    fn default() -> Self {
        Self {
            roll_max: default_roll_max(),
            pitch_max: default_pitch_max(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            speed: SpeedConfig::default(),
            terrain: TerrainConfig::default(),
            approach: ApproachConfig::default(),
            homing: HomingConfig::default(),
            attitude: AttitudeConfig::default(),
        }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
