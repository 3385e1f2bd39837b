//! Merge Drop - a falling-spheres merge game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, merges, game state)
//! - `levels`: Level table mapping size tiers to radii and asset handles
//! - `config`: Canvas bounds and physics tunables
//!
//! Rendering, input wiring and the score display are external collaborators:
//! the core consumes a [`levels::LevelTable`] and click positions, and
//! produces drawable snapshots ([`sim::Drawable`]) and [`sim::GameEvent`]s.

pub mod config;
pub mod levels;
pub mod sim;

pub use config::{Bounds, SimConfig};
pub use levels::{AssetHandle, LevelEntry, LevelError, LevelTable};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed physics substep in milliseconds (256 Hz for collision stability)
    pub const STEP_MS: f64 = 1000.0 / 256.0;

    /// Gravity acceleration, px/ms² (negative: the simulation is Y-up)
    pub const GRAVITY: f32 = -0.0025;
    /// Fraction of normal velocity retained after a ball-ball bounce
    pub const RESTITUTION: f32 = 0.4;
    /// Fraction of velocity retained after a wall or floor bounce
    pub const WALL_RESTITUTION: f32 = 0.5;
    /// Positional correction factor for overlapping bounce pairs
    pub const CORRECTION_FACTOR: f32 = 0.5;

    /// Floor height above y = 0
    pub const FLOOR_HEIGHT: f32 = 30.0;
    /// Vertical offset of the drop point below the top of the canvas
    pub const SPAWN_OFFSET: f32 = 60.0;

    /// Decorative particle radius (fixed, no level)
    pub const PARTICLE_RADIUS: f32 = 10.0;
    /// Particle burst speed range, px/ms
    pub const PARTICLE_MIN_SPEED: f32 = 0.3;
    pub const PARTICLE_MAX_SPEED: f32 = 0.6;

    /// The pending preview ball rolls a level uniformly below this bound,
    /// biasing the early game toward small balls
    pub const PREVIEW_LEVELS: u32 = 5;

    /// Score awarded per merge is `MERGE_SCORE_FACTOR * (new_level + 1)`
    pub const MERGE_SCORE_FACTOR: u64 = 3;

    /// Below this center distance a colliding pair is treated as coincident
    /// and skipped (the contact normal is undefined)
    pub const DISTANCE_EPSILON: f32 = 1e-6;
}

/// Convert a click position in canvas pixel space (origin top-left) into
/// simulation space (Y-up from the floor).
#[inline]
pub fn canvas_to_sim(bounds: &Bounds, canvas_x: f32, canvas_y: f32) -> Vec2 {
    Vec2::new(canvas_x, bounds.height - canvas_y)
}
