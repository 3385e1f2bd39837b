//! Canvas bounds and physics tunables.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Play-area dimensions, supplied once at init. Used directly as wall and
/// floor placement: left wall at x = 0, right wall at x = width, floor at
/// `floor_height` above y = 0. There is no ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Physics tunables for the simulation.
///
/// Defaults match the constants in [`crate::consts`]; tests and tuning
/// passes override individual values through the builder.
///
/// ```
/// use merge_drop::SimConfig;
///
/// let config = SimConfig::new().with_gravity(0.0).with_restitution(0.6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Gravity acceleration, px/ms² (negative pulls toward the floor).
    pub gravity: f32,
    /// Normal-velocity fraction retained in ball-ball bounces. Tangential
    /// velocity is untouched (no friction or rotation modeled).
    pub restitution: f32,
    /// Velocity fraction retained in wall and floor bounces.
    pub wall_restitution: f32,
    /// Fraction of the overlap removed per substep when separating a
    /// bounce pair. Split evenly between the two bodies.
    pub correction_factor: f32,
    /// Floor height above y = 0.
    pub floor_height: f32,
}

impl SimConfig {
    pub fn new() -> Self {
        Self {
            gravity: GRAVITY,
            restitution: RESTITUTION,
            wall_restitution: WALL_RESTITUTION,
            correction_factor: CORRECTION_FACTOR,
            floor_height: FLOOR_HEIGHT,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_wall_restitution(mut self, wall_restitution: f32) -> Self {
        self.wall_restitution = wall_restitution;
        self
    }

    pub fn with_correction_factor(mut self, correction_factor: f32) -> Self {
        self.correction_factor = correction_factor;
        self
    }

    pub fn with_floor_height(mut self, floor_height: f32) -> Self {
        self.floor_height = floor_height;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
