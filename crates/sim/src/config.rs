//! Simulation parameters shared by every stage.

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Whether walls block light while baking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occlusion {
    /// Every light reaches every texel of its scene.
    #[default]
    None,
    /// A light is dropped for a texel when a wall crosses the path between them.
    Walls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Rays cast per drone by `render`.
    pub resolution: usize,
    /// Angular spread of the rays, in radians.
    pub fov: f32,
    /// Integration time step.
    pub dt: f32,
    /// Momentum gained per unit of mesial/lateral command.
    pub accel: f32,
    /// Angular momentum gained per unit of yaw command.
    pub yaw_accel: f32,
    /// Fraction of momentum carried over between ticks.
    pub damping: f32,
    /// Commands are clamped to `[-max_command, max_command]`.
    pub max_command: i32,
    /// Minimum clearance kept between a drone and any wall.
    pub drone_radius: f32,
    /// Distance at which a light's contribution halves.
    pub light_falloff: f32,
    pub occlusion: Occlusion,
    /// Target texel length when walls are subdivided by the scene builder.
    pub texel_size: f32,
    pub randomize_orientation: bool,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            resolution: 64,
            fov: FRAC_PI_2,
            dt: 0.1,
            accel: 1.0,
            yaw_accel: 1.0,
            damping: 0.5,
            max_command: 1,
            drone_radius: 0.0,
            light_falloff: 1.0,
            occlusion: Occlusion::None,
            texel_size: 0.1,
            randomize_orientation: true,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Rejects parameter combinations no stage can run with.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: &str| -> Result<(), SimError> { Err(SimError::InvalidConfig(msg.to_owned())) };
        if self.resolution == 0 {
            return invalid("resolution must be at least 1");
        }
        if !(self.fov.is_finite() && self.fov > 0.0 && self.fov <= TAU) {
            return invalid("fov must lie in (0, 2π]");
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return invalid("dt must be positive");
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return invalid("damping must lie in [0, 1]");
        }
        if self.max_command < 0 {
            return invalid("max_command must not be negative");
        }
        if !(self.drone_radius.is_finite() && self.drone_radius >= 0.0) {
            return invalid("drone_radius must not be negative");
        }
        if !(self.light_falloff.is_finite() && self.light_falloff > 0.0) {
            return invalid("light_falloff must be positive");
        }
        if !(self.texel_size.is_finite() && self.texel_size > 0.0) {
            return invalid("texel_size must be positive");
        }
        if !(self.accel.is_finite() && self.yaw_accel.is_finite()) {
            return invalid("accelerations must be finite");
        }
        Ok(())
    }
}
