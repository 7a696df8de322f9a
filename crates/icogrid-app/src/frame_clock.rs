//! Fixed-timestep accumulator clock.
//!
//! Decouples the simulation rate (reveal pacing, rotation) from the render
//! rate: each frame runs zero or more fixed 60 Hz updates, with the frame
//! time clamped so a stall never triggers a catch-up spiral.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Maximum frame time accepted per tick; longer frames are clamped and the
/// simulation simply slows down instead of running dozens of updates.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Wall-clock driven fixed-timestep loop.
pub struct FrameClock {
    previous: Instant,
    accumulator: f64,
}

impl FrameClock {
    /// Start the clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
            accumulator: 0.0,
        }
    }

    /// Run one frame: measure elapsed wall-clock time and invoke `update`
    /// once per elapsed fixed step.
    pub fn tick(&mut self, update: impl FnMut(f64)) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous).as_secs_f64();
        self.previous = now;

        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
        }
        self.step(frame_time, update);
    }

    /// Advance by an explicit frame time (test seam; `tick` measures and
    /// delegates here).
    fn step(&mut self, frame_time: f64, mut update: impl FnMut(f64)) {
        self.accumulator += frame_time.min(MAX_FRAME_TIME);
        while self.accumulator >= FIXED_DT {
            update(FIXED_DT);
            self.accumulator -= FIXED_DT;
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
