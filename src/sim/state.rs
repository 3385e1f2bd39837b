//! Game state and core simulation types
//!
//! The state owns the live sets of balls and particles, the pending
//! preview ball, the score accumulator and the outbound event queue.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{Bounds, SimConfig};
use crate::consts::*;
use crate::levels::{AssetHandle, LevelTable};

/// A falling ball entity.
///
/// Radius comes from the level table, mass is radius squared. Both are
/// fixed for the ball's lifetime; a merge retires the inputs and spawns a
/// fresh ball rather than mutating one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub level: u32,
    pub asset: AssetHandle,
}

/// A decorative particle emitted by a merge. Never collides, carries no
/// level or mass, and is pruned once it falls out of the visible region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub asset: AssetHandle,
}

/// A static decorative sprite, e.g. the upper-bound marker line. Takes no
/// part in physics; exists only so the renderer has something to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSprite {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub asset: AssetHandle,
}

/// One entry of the drawable snapshot handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub asset: AssetHandle,
}

/// Events produced by the simulation for the score/UI collaborator,
/// drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Two balls combined; `level` is the level of the resulting ball.
    Merged { level: u32, pos: Vec2 },
    /// The running score total changed.
    ScoreChanged { total: u64 },
    /// The pending preview ball changed (show this asset in the "next" box).
    PreviewChanged { asset: AssetHandle },
}

/// Complete game state (deterministic, serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG for preview levels and particle bursts
    rng: Pcg32,
    /// Play-area bounds (walls and floor placement)
    pub bounds: Bounds,
    /// Physics tunables
    pub config: SimConfig,
    /// Level table handed over at init; immutable from here on
    table: LevelTable,
    /// Active balls, in spawn order (stable for the duration of a substep)
    balls: Vec<Ball>,
    /// Active particles
    particles: Vec<Particle>,
    /// Static decorations (e.g. the upper-bound marker)
    markers: Vec<StaticSprite>,
    /// Next-to-drop preview, excluded from physics until released
    pending: Ball,
    /// Running score total
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Outbound events, drained by the UI collaborator each frame
    #[serde(skip)]
    events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with default physics tunables.
    pub fn new(bounds: Bounds, table: LevelTable, seed: u64) -> Self {
        Self::with_config(bounds, table, seed, SimConfig::default())
    }

    pub fn with_config(bounds: Bounds, table: LevelTable, seed: u64, config: SimConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = roll_preview_level(&mut rng, table.max_level());
        let pending = make_ball(1, &table, level, Vec2::new(bounds.width / 2.0, drop_y(&bounds)));

        log::info!("New game: seed {}, {} levels", seed, table.len());

        let mut state = Self {
            seed,
            rng,
            bounds,
            config,
            table,
            balls: Vec::new(),
            particles: Vec::new(),
            markers: Vec::new(),
            pending,
            score: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 2,
        };
        state
            .events
            .push(GameEvent::PreviewChanged { asset: state.pending.asset });
        state
    }

    /// Allocate a new entity ID.
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn max_level(&self) -> u32 {
        self.table.max_level()
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub(crate) fn balls_mut(&mut self) -> &mut Vec<Ball> {
        &mut self.balls
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    /// The next-to-drop preview ball. Not part of the active set.
    pub fn pending(&self) -> &Ball {
        &self.pending
    }

    /// Spawn an active ball at the given level and position.
    pub fn spawn_ball(&mut self, level: u32, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        let mut ball = make_ball(id, &self.table, level, pos);
        ball.vel = vel;
        self.balls.push(ball);
        id
    }

    /// Spawn a decorative particle.
    pub fn spawn_particle(&mut self, pos: Vec2, vel: Vec2, asset: AssetHandle) {
        self.particles.push(Particle {
            pos,
            vel,
            radius: PARTICLE_RADIUS,
            asset,
        });
    }

    /// Remove a ball by ID. No-op if it was already removed this substep.
    pub fn remove_ball(&mut self, id: u32) -> bool {
        match self.balls.iter().position(|b| b.id == id) {
            Some(idx) => {
                self.balls.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Move the pending preview horizontally to track the pointer, keeping
    /// it clear of both walls.
    pub fn aim(&mut self, x: f32) {
        let r = self.pending.radius;
        self.pending.pos.x = x.clamp(r, self.bounds.width - r);
    }

    /// Release the pending ball into the active set at the aimed position
    /// and roll a new preview. Emits [`GameEvent::PreviewChanged`].
    pub fn release_pending(&mut self, x: f32) -> u32 {
        self.aim(x);
        let id = self.next_entity_id();
        let mut ball = self.pending.clone();
        ball.id = id;
        log::debug!("Dropped level {} ball at x = {}", ball.level, ball.pos.x);
        self.balls.push(ball);

        let level = roll_preview_level(&mut self.rng, self.table.max_level());
        self.pending = make_ball(
            self.next_entity_id(),
            &self.table,
            level,
            Vec2::new(self.bounds.width / 2.0, drop_y(&self.bounds)),
        );
        self.events.push(GameEvent::PreviewChanged {
            asset: self.pending.asset,
        });
        id
    }

    /// Add score and notify the UI collaborator.
    pub fn add_score(&mut self, delta: u64) {
        self.score += delta;
        self.events.push(GameEvent::ScoreChanged { total: self.score });
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain the pending events, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register a static decoration, e.g. the upper-bound marker line.
    /// Purely visual; no game-over condition is attached to it.
    pub fn add_marker(&mut self, sprite: StaticSprite) {
        self.markers.push(sprite);
    }

    /// Uniform random direction/speed burst velocity for merge particles.
    pub(crate) fn roll_particle_velocity(&mut self) -> Vec2 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = self.rng.random_range(PARTICLE_MIN_SPEED..PARTICLE_MAX_SPEED);
        Vec2::new(angle.cos(), angle.sin()) * speed
    }

    /// Snapshot of everything the renderer should draw this frame:
    /// markers, active balls, particles, and the pending preview.
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut out = Vec::with_capacity(self.markers.len() + self.balls.len() + self.particles.len() + 1);
        for m in &self.markers {
            out.push(Drawable {
                width: m.width,
                height: m.height,
                x: m.pos.x,
                y: m.pos.y,
                rotation: 0.0,
                asset: m.asset,
            });
        }
        for b in self.balls.iter().chain(std::iter::once(&self.pending)) {
            out.push(Drawable {
                width: b.radius * 2.0,
                height: b.radius * 2.0,
                x: b.pos.x,
                y: b.pos.y,
                rotation: 0.0,
                asset: b.asset,
            });
        }
        for p in &self.particles {
            out.push(Drawable {
                width: p.radius * 2.0,
                height: p.radius * 2.0,
                x: p.pos.x,
                y: p.pos.y,
                rotation: 0.0,
                asset: p.asset,
            });
        }
        out
    }
}

fn make_ball(id: u32, table: &LevelTable, level: u32, pos: Vec2) -> Ball {
    let radius = table.radius_for(level);
    Ball {
        id,
        pos,
        vel: Vec2::ZERO,
        radius,
        mass: radius * radius,
        level,
        asset: table.asset_for(level),
    }
}

/// Preview levels are drawn from a reduced low-level subrange so the early
/// game skews toward small balls.
fn roll_preview_level(rng: &mut Pcg32, max_level: u32) -> u32 {
    let bound = PREVIEW_LEVELS.min(max_level + 1);
    rng.random_range(0..bound)
}

fn drop_y(bounds: &Bounds) -> f32 {
    bounds.height - SPAWN_OFFSET
}
