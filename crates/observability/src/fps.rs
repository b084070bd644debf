//! Frame-rate counter driven by the host's frame callback.

use std::time::{Duration, Instant};

/// Counts frames and reports the average rate once per interval
#[derive(Debug, Clone)]
pub struct FrameRateCounter {
    interval: Duration,
    window_start: Instant,
    frames: u64,
}

impl FrameRateCounter {
    /// Create a counter reporting every `interval`
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Create a counter whose first window opens at `start`
    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            window_start: start,
            frames: 0,
        }
    }

    /// Record one frame now
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Record one frame at `now`
    ///
    /// Returns the frames-per-second of the finished window once `interval`
    /// has elapsed, and opens a new window.
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }

        let fps = self.frames as f64 / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    /// Frames counted in the open window
    pub fn pending_frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameRateCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
