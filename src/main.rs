//! Headless demo: runs the simulation at a synthetic 60 fps for a few
//! seconds, dropping a ball once a second, and logs the resulting score.
//!
//! The real game embeds the core behind a canvas renderer; this binary
//! exists to exercise the frame loop end to end without one.

use std::time::{SystemTime, UNIX_EPOCH};

use merge_drop::consts::FLOOR_HEIGHT;
use merge_drop::sim::{FrameClock, GameEvent, GameState, StaticSprite, advance_frame};
use merge_drop::{AssetHandle, Bounds, LevelEntry, LevelTable, canvas_to_sim};

/// Eleven size tiers with roughly geometric radii.
fn demo_table() -> LevelTable {
    let radii = [
        18.0, 24.0, 31.0, 39.0, 48.0, 58.0, 69.0, 81.0, 94.0, 108.0, 123.0,
    ];
    let entries = radii
        .iter()
        .enumerate()
        .map(|(i, &radius)| LevelEntry {
            radius,
            asset: AssetHandle(i as u32),
        })
        .collect();
    LevelTable::new(entries).expect("demo table is valid")
}

fn main() {
    env_logger::init();

    let bounds = Bounds::new(600.0, 800.0);
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut state = GameState::new(bounds, demo_table(), seed);
    let mut clock = FrameClock::new();

    // Decorative fill-limit marker near the top; nothing enforces it
    state.add_marker(StaticSprite {
        pos: canvas_to_sim(&bounds, bounds.width / 2.0, 120.0),
        width: bounds.width,
        height: 4.0,
        asset: AssetHandle(100),
    });

    // 30 seconds of 60 fps frames, one drop per second at a wandering x
    let frame_ms = 1000.0 / 60.0;
    for frame in 1_u64..=30 * 60 {
        if frame % 60 == 0 {
            let x = 80.0 + ((frame / 60) * 97 % 440) as f32;
            state.release_pending(x);
        }

        advance_frame(&mut state, &mut clock, frame as f64 * frame_ms);

        for event in state.drain_events() {
            match event {
                GameEvent::Merged { level, pos } => {
                    log::info!("merge -> level {} at ({:.0}, {:.0})", level, pos.x, pos.y)
                }
                GameEvent::ScoreChanged { total } => log::debug!("score {}", total),
                GameEvent::PreviewChanged { asset } => log::debug!("next ball: {:?}", asset),
            }
        }
    }

    log::info!(
        "Done: score {}, {} balls resting above y = {}, {} drawables",
        state.score,
        state.balls().len(),
        FLOOR_HEIGHT,
        state.drawables().len()
    );
}
