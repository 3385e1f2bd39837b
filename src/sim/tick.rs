//! Fixed timestep simulation tick
//!
//! One substep runs in a fixed order: integrate gravity for balls and
//! particles, clamp against walls and floor, detect contacts on a stable
//! snapshot, resolve bounce pairs, process merge pairs, prune dead
//! particles. Contacts are detected once before any mutation, so merges
//! can never invalidate the scan that found them.

use super::clock::FrameClock;
use super::collision::{ContactKind, detect_contacts, resolve_bounce, resolve_walls};
use super::state::{GameEvent, GameState, Particle};
use crate::consts::{MERGE_SCORE_FACTOR, STEP_MS};

/// Advance the simulation by one fixed substep. `dt` is in milliseconds
/// and is always [`STEP_MS`] in production; tests pass it directly.
pub fn tick(state: &mut GameState, dt: f32) {
    state.time_ticks += 1;

    integrate(state, dt);
    walls(state);

    // Contact snapshot: computed before any mutation below
    let contacts = detect_contacts(state.balls(), state.max_level());

    for contact in contacts.iter().filter(|c| c.kind == ContactKind::Bounce) {
        bounce_pair(state, contact.a, contact.b);
    }
    for contact in contacts.iter().filter(|c| c.kind == ContactKind::Merge) {
        merge_pair(state, contact.a, contact.b);
    }

    prune_particles(state);
}

/// Run as many fixed substeps as the clock owes for this frame timestamp.
/// Returns the number of substeps executed.
pub fn advance_frame(state: &mut GameState, clock: &mut FrameClock, now_ms: f64) -> u32 {
    let steps = clock.accumulate(now_ms);
    for _ in 0..steps {
        tick(state, STEP_MS as f32);
    }
    steps
}

fn integrate(state: &mut GameState, dt: f32) {
    let gravity = state.config.gravity;
    for ball in state.balls_mut() {
        ball.vel.y += gravity * dt;
        ball.pos += ball.vel * dt;
    }
    // Particles fall under the same gravity, with no collision
    for particle in state.particles_mut() {
        particle.vel.y += gravity * dt;
        particle.pos += particle.vel * dt;
    }
}

fn walls(state: &mut GameState) {
    let bounds = state.bounds;
    let config = state.config;
    for ball in state.balls_mut() {
        resolve_walls(ball, &bounds, &config);
    }
}

fn bounce_pair(state: &mut GameState, a_id: u32, b_id: u32) {
    let config = state.config;
    let balls = state.balls_mut();
    let Some(ia) = balls.iter().position(|b| b.id == a_id) else {
        return;
    };
    let Some(ib) = balls.iter().position(|b| b.id == b_id) else {
        return;
    };
    // Split borrow to get both balls mutably
    let (lo, hi) = (ia.min(ib), ia.max(ib));
    let (head, tail) = balls.split_at_mut(hi);
    let (first, second) = (&mut head[lo], &mut tail[0]);
    if ia < ib {
        resolve_bounce(first, second, &config);
    } else {
        resolve_bounce(second, first, &config);
    }
}

/// Combine a merge pair: retire both inputs, spawn the next-level ball at
/// their midpoint with the mass-weighted (momentum-conserving) velocity,
/// emit a particle burst and award score.
fn merge_pair(state: &mut GameState, a_id: u32, b_id: u32) {
    // A ball consumed by an earlier merge this substep must not merge again
    let (Some(a), Some(b)) = (state.ball(a_id), state.ball(b_id)) else {
        return;
    };

    let new_level = (a.level + 1).min(state.max_level());
    let pos = (a.pos + b.pos) / 2.0;
    let vel = (a.vel * a.mass + b.vel * b.mass) / (a.mass + b.mass);
    let burst = ((a.radius + b.radius) / 5.0).floor() as usize;

    // The burst reuses the consumed level's look
    let burst_asset = a.asset;

    state.remove_ball(a_id);
    state.remove_ball(b_id);
    state.spawn_ball(new_level, pos, vel);

    for _ in 0..burst {
        let vel = state.roll_particle_velocity();
        state.spawn_particle(pos, vel, burst_asset);
    }

    log::debug!("Merged {} + {} -> level {}", a_id, b_id, new_level);
    state.push_event(GameEvent::Merged {
        level: new_level,
        pos,
    });
    state.add_score(MERGE_SCORE_FACTOR * (new_level as u64 + 1));
}

/// Drop particles once they have fully fallen out of the visible region.
fn prune_particles(state: &mut GameState) {
    state
        .particles_mut()
        .retain(|p: &Particle| p.pos.y + p.radius >= 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bounds, SimConfig};
    use crate::levels::sample_table;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = STEP_MS as f32;

    fn new_state() -> GameState {
        GameState::new(Bounds::new(600.0, 800.0), sample_table(11), 12345)
    }

    /// Gravity off so contact geometry is exact.
    fn new_state_no_gravity() -> GameState {
        GameState::with_config(
            Bounds::new(600.0, 800.0),
            sample_table(11),
            12345,
            SimConfig::new().with_gravity(0.0),
        )
    }

    #[test]
    fn test_equal_pair_merges_at_midpoint() {
        let mut state = new_state_no_gravity();
        state.drain_events();
        let r = 18.0; // level 0 radius in the sample table

        // Centers 1.5r apart, approaching head-on
        state.spawn_ball(0, Vec2::new(300.0 - 0.75 * r, 400.0), Vec2::new(0.2, 0.0));
        state.spawn_ball(0, Vec2::new(300.0 + 0.75 * r, 400.0), Vec2::new(-0.2, 0.0));
        tick(&mut state, DT);

        assert_eq!(state.balls().len(), 1);
        let merged = state.balls()[0].clone();
        assert_eq!(merged.level, 1);
        assert!((merged.pos.x - 300.0).abs() < 1e-3);
        assert!((merged.pos.y - 400.0).abs() < 1e-3);
        // Equal masses, opposite velocities: the merged ball is at rest
        assert!(merged.vel.length() < 1e-6);
        // Score: 3 * (1 + 1)
        assert_eq!(state.score, 6);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Merged {
            level: 1,
            pos: merged.pos
        }));
        assert!(events.contains(&GameEvent::ScoreChanged { total: 6 }));
    }

    #[test]
    fn test_top_level_pair_bounces_instead_of_merging() {
        let mut state = new_state_no_gravity();
        let max = state.max_level();
        let r = 18.0 * 1.25_f32.powi(max as i32);

        state.spawn_ball(max, Vec2::new(300.0 - 0.75 * r, 400.0), Vec2::new(0.2, 0.0));
        state.spawn_ball(max, Vec2::new(300.0 + 0.75 * r, 400.0), Vec2::new(-0.2, 0.0));
        tick(&mut state, DT);

        assert_eq!(state.balls().len(), 2);
        assert_eq!(state.score, 0);
        // Velocities reversed by the bounce impulse
        assert!(state.balls()[0].vel.x < 0.0);
        assert!(state.balls()[1].vel.x > 0.0);
    }

    #[test]
    fn test_no_double_consumption() {
        // Three mutually-overlapping level-0 balls in a row: the first
        // detected pair merges, the remaining pairs reference consumed
        // balls and must be skipped.
        let mut state = new_state_no_gravity();
        let r = 18.0;
        state.spawn_ball(0, Vec2::new(300.0 - r, 400.0), Vec2::ZERO);
        state.spawn_ball(0, Vec2::new(300.0, 400.0), Vec2::ZERO);
        state.spawn_ball(0, Vec2::new(300.0 + r, 400.0), Vec2::ZERO);
        tick(&mut state, DT);

        let mut levels: Vec<u32> = state.balls().iter().map(|b| b.level).collect();
        levels.sort_unstable();
        assert_eq!(levels, vec![0, 1]);
        // Exactly one merge scored
        assert_eq!(state.score, 6);
    }

    #[test]
    fn test_merge_level_never_exceeds_table_top() {
        let mut state = new_state_no_gravity();
        let max = state.max_level();
        let r = 18.0 * 1.25_f32.powi((max - 1) as i32);

        state.spawn_ball(max - 1, Vec2::new(300.0 - 0.5 * r, 400.0), Vec2::ZERO);
        state.spawn_ball(max - 1, Vec2::new(300.0 + 0.5 * r, 400.0), Vec2::ZERO);
        tick(&mut state, DT);

        assert_eq!(state.balls().len(), 1);
        assert_eq!(state.balls()[0].level, max);
    }

    #[test]
    fn test_dropped_ball_bounces_to_restitution_squared_height() {
        // Scenario: a ball falls from rest, bounces off the floor, and its
        // rebound apex is wall_restitution² times the drop height.
        let mut state = new_state();
        let floor = state.config.floor_height;
        let rho = state.config.wall_restitution;
        let r = 18.0;
        let drop = 400.0;
        let id = state.spawn_ball(0, Vec2::new(300.0, floor + r + drop), Vec2::ZERO);

        // Run until the floor reflects the ball upward
        let mut ticks = 0;
        while state.ball(id).unwrap().vel.y <= 0.0 {
            tick(&mut state, DT);
            ticks += 1;
            assert!(ticks < 100_000, "ball never reached the floor");
        }
        // Then track the rebound apex
        let mut apex = 0.0_f32;
        while state.ball(id).unwrap().vel.y > 0.0 {
            tick(&mut state, DT);
            apex = apex.max(state.ball(id).unwrap().pos.y);
        }

        let rebound = apex - floor - r;
        let expected = rho * rho * drop;
        let tolerance = expected * 0.1;
        assert!(
            (rebound - expected).abs() < tolerance,
            "rebound {} vs expected {}",
            rebound,
            expected
        );
    }

    #[test]
    fn test_merge_emits_radius_scaled_particle_burst() {
        // a.radius + b.radius = 50 -> exactly 10 particles
        let entries = (0..3)
            .map(|i| crate::levels::LevelEntry {
                radius: 25.0 + 10.0 * i as f32,
                asset: crate::levels::AssetHandle(i),
            })
            .collect();
        let table = crate::levels::LevelTable::new(entries).unwrap();
        let mut state = GameState::with_config(
            Bounds::new(600.0, 800.0),
            table,
            7,
            SimConfig::new().with_gravity(0.0),
        );

        state.spawn_ball(0, Vec2::new(290.0, 400.0), Vec2::ZERO);
        state.spawn_ball(0, Vec2::new(310.0, 400.0), Vec2::ZERO);
        tick(&mut state, DT);

        assert_eq!(state.particles().len(), 10);
    }

    #[test]
    fn test_particles_pruned_below_visible_region() {
        let mut state = new_state();
        state.spawn_particle(Vec2::new(300.0, 15.0), Vec2::new(0.0, -0.5), crate::levels::AssetHandle(0));
        // Particles ignore the floor and fall straight through it
        let mut ticks = 0;
        while !state.particles().is_empty() {
            tick(&mut state, DT);
            ticks += 1;
            assert!(ticks < 100_000, "particle never pruned");
        }
    }

    #[test]
    fn test_particle_still_visible_is_kept() {
        let mut state = new_state_no_gravity();
        state.spawn_particle(Vec2::new(300.0, 100.0), Vec2::ZERO, crate::levels::AssetHandle(0));
        tick(&mut state, DT);
        assert_eq!(state.particles().len(), 1);
    }

    #[test]
    fn test_advance_frame_runs_owed_substeps() {
        let mut state = new_state();
        let mut clock = FrameClock::new();
        state.spawn_ball(0, Vec2::new(300.0, 400.0), Vec2::ZERO);

        let steps = advance_frame(&mut state, &mut clock, 16.67);
        assert_eq!(steps, 4);
        assert_eq!(state.time_ticks, 4);
    }

    #[test]
    fn test_determinism_across_frame_splits() {
        // Identical cumulative time, different frame boundaries: the two
        // runs stay bit-identical (whole-state JSON comparison).
        let mut a = new_state();
        let mut b = new_state();
        a.spawn_ball(0, Vec2::new(200.0, 600.0), Vec2::new(0.1, 0.0));
        b.spawn_ball(0, Vec2::new(200.0, 600.0), Vec2::new(0.1, 0.0));
        a.spawn_ball(3, Vec2::new(400.0, 500.0), Vec2::ZERO);
        b.spawn_ball(3, Vec2::new(400.0, 500.0), Vec2::ZERO);

        let mut clock_a = FrameClock::new();
        let mut clock_b = FrameClock::new();

        // A: four 25 ms frames; B: one 100 ms frame
        for i in 1..=4 {
            advance_frame(&mut a, &mut clock_a, i as f64 * 25.0);
        }
        advance_frame(&mut b, &mut clock_b, 100.0);

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    proptest! {
        /// Merge velocity is the mass-weighted average of the inputs.
        #[test]
        fn prop_merge_velocity_is_mass_weighted_average(
            level in 0_u32..5,
            vax in -0.5_f32..0.5,
            vay in -0.5_f32..0.5,
            vbx in -0.5_f32..0.5,
            vby in -0.5_f32..0.5,
        ) {
            let mut state = new_state_no_gravity();
            state.drain_events();
            let r = 18.0 * 1.25_f32.powi(level as i32);
            let m = r * r;

            let va = Vec2::new(vax, vay);
            let vb = Vec2::new(vbx, vby);
            state.spawn_ball(level, Vec2::new(300.0 - 0.5 * r, 400.0), va);
            state.spawn_ball(level, Vec2::new(300.0 + 0.5 * r, 400.0), vb);
            tick(&mut state, DT);

            prop_assert_eq!(state.balls().len(), 1);
            let merged = &state.balls()[0];
            prop_assert_eq!(merged.level, level + 1);
            let expected = (va * m + vb * m) / (2.0 * m);
            prop_assert!((merged.vel - expected).length() < 1e-4);
        }
    }
}
