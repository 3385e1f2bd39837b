//! Frame-time accumulator that converts variable frame timestamps into a
//! whole number of fixed physics substeps.
//!
//! Physics substeps always receive the same dt, so the simulation evolves
//! identically no matter how the elapsed time is split across frame
//! callbacks; the leftover accumulator carries to the next frame.

use serde::{Deserialize, Serialize};

use crate::consts::STEP_MS;

/// Fixed-timestep clock. Feed it each frame's timestamp in milliseconds;
/// it answers with how many fixed substeps the simulation owes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    last_time: f64,
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_time: 0.0,
            accumulator: 0.0,
        }
    }

    /// Advance to `now_ms` and return the number of fixed substeps to run.
    ///
    /// The frame delta is taken modulo 1000 ms, so a pathological gap
    /// (e.g. a backgrounded tab) contributes at most ~1 s of simulation
    /// before wrapping. The wrap is non-monotonic on purpose: a 2500 ms
    /// gap accumulates as 500 ms.
    pub fn accumulate(&mut self, now_ms: f64) -> u32 {
        let dt = (now_ms - self.last_time) % 1000.0;
        self.last_time = now_ms;
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator > STEP_MS {
            self.accumulator -= STEP_MS;
            steps += 1;
        }
        steps
    }

    /// Leftover time owed to the next frame, in milliseconds.
    pub fn residual_ms(&self) -> f64 {
        self.accumulator
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
