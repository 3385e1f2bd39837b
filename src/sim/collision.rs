//! Collision detection and response for circle bodies
//!
//! Detection is a naive all-pairs scan over a stable snapshot of the
//! active balls; contacts are classified up front so merges in the same
//! substep can never corrupt the scan.

use super::state::Ball;
use crate::config::{Bounds, SimConfig};
use crate::consts::DISTANCE_EPSILON;

/// How a detected contact should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Impulse + positional correction only.
    Bounce,
    /// Equal level below the table top: combine into one higher-level ball.
    Merge,
}

/// One colliding pair, referenced by ball ID so later removals cannot
/// invalidate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: u32,
    pub b: u32,
    pub kind: ContactKind,
}

/// All-pairs scan, O(n²). Two balls collide when their center distance is
/// strictly less than the sum of their radii. A pair merges when both are
/// the same level and below `max_level`; two top-level balls only bounce.
pub fn detect_contacts(balls: &[Ball], max_level: u32) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            let a = &balls[i];
            let b = &balls[j];
            let dist = a.pos.distance(b.pos);
            if dist < a.radius + b.radius {
                let kind = if a.level == b.level && a.level < max_level {
                    ContactKind::Merge
                } else {
                    ContactKind::Bounce
                };
                contacts.push(Contact {
                    a: a.id,
                    b: b.id,
                    kind,
                });
            }
        }
    }
    contacts
}

/// Separate and bounce one contact pair.
///
/// Positional correction pushes the two bodies apart along the contact
/// normal, splitting the overlap evenly regardless of mass. Velocity is
/// resolved with an equal-and-opposite impulse scaled by inverse mass, so
/// momentum is conserved exactly. Tangential velocity is untouched.
pub fn resolve_bounce(a: &mut Ball, b: &mut Ball, config: &SimConfig) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    // Coincident centers: the normal is undefined, skip this pair for the
    // substep rather than divide by zero.
    if dist < DISTANCE_EPSILON {
        return;
    }
    let normal = delta / dist;

    let overlap = a.radius + b.radius - dist;
    if overlap <= 0.0 {
        return;
    }
    let correction = normal * (overlap * config.correction_factor * 0.5);
    a.pos -= correction;
    b.pos += correction;

    let relative_vel = b.vel - a.vel;
    let normal_vel = relative_vel.dot(normal);
    // Already separating: leave the velocities alone.
    if normal_vel > 0.0 {
        return;
    }

    let inv_mass = 1.0 / a.mass + 1.0 / b.mass;
    let impulse_scalar = -(1.0 + config.restitution) * normal_vel / inv_mass;
    let impulse = normal * impulse_scalar;
    a.vel -= impulse / a.mass;
    b.vel += impulse / b.mass;
}

/// Clamp a ball against the floor and both walls, reflecting the velocity
/// component into the surface. No ceiling: balls may leave the top of the
/// visible area unimpeded.
pub fn resolve_walls(ball: &mut Ball, bounds: &Bounds, config: &SimConfig) {
    let r = ball.radius;

    if ball.pos.y - r < config.floor_height {
        ball.pos.y = config.floor_height + r;
        ball.vel.y = -ball.vel.y * config.wall_restitution;
    }
    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = -ball.vel.x * config.wall_restitution;
    }
    if ball.pos.x + r > bounds.width {
        ball.pos.x = bounds.width - r;
        ball.vel.x = -ball.vel.x * config.wall_restitution;
    }
}
