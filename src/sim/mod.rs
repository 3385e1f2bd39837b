//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod state;
pub mod tick;

pub use clock::FrameClock;
pub use collision::{Contact, ContactKind, detect_contacts, resolve_bounce, resolve_walls};
pub use state::{Ball, Drawable, GameEvent, GameState, Particle, StaticSprite};
pub use tick::{advance_frame, tick};
