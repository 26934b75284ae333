//! Scene clock driving every periodic motion in the animated scene.

use std::time::Duration;

/// Monotonic elapsed-time source owned by the scene animator.
///
/// Motion is always derived from `elapsed`, never from `frame_count`, so
/// visual speed does not depend on frame rate. The host loop steps it with
/// the frame's `dt` through `advance`.
#[derive(Debug)]
pub struct SceneClock {
    /// Total elapsed time since creation.
    elapsed: Duration,
    /// Frames observed since creation. Informational only.
    frame_count: u64,
}

impl Default for SceneClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneClock {
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance by an explicit number of seconds. Negative or non-finite
    /// values are ignored so the clock never runs backwards.
    pub fn advance(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.step(Duration::from_secs_f64(seconds));
        } else {
            self.step(Duration::ZERO);
        }
    }

    fn step(&mut self, delta: Duration) {
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
