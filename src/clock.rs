//! Frame timing.
//!
//! One [`FrameClock`] lives in the runtime; `tick()` is called once per
//! rendered frame and its `time` is what demos receive as `current_time`.

use std::time::{Duration, Instant};

/// Upper bound for a single frame delta. Keeps animation stable after a
/// stall (debugger pause, window drag).
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock was created.
    pub time: f64,
    /// Seconds since the previous tick, clamped to [`MAX_FRAME_DELTA`].
    pub dt: f64,
    /// Number of ticks before this one. Wraps on overflow.
    pub frame_index: u64,
}

/// Monotonic clock producing [`FrameTime`] snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
        }
    }

    /// Seconds since the clock was created, without advancing it.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Advance the clock by one frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).min(MAX_FRAME_DELTA);
        self.last = now;

        let frame = FrameTime {
            time: now.saturating_duration_since(self.start).as_secs_f64(),
            dt: dt.as_secs_f64(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames and reports the rate roughly once per `window`.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f64,
    window_start: f64,
    frames: u32,
}

impl FpsCounter {
    /// A counter that reports every `window_secs` seconds.
    #[must_use]
    pub fn new(window_secs: f64) -> Self {
        Self {
            window: window_secs,
            window_start: 0.0,
            frames: 0,
        }
    }

    /// Record a frame at `time`. Returns the average frame rate when a
    /// reporting window has elapsed, and starts the next window.
    pub fn record(&mut self, time: f64) -> Option<f64> {
        self.frames += 1;
        let span = time - self.window_start;
        if span < self.window {
            return None;
        }
        let fps = f64::from(self.frames) / span;
        self.window_start = time;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_monotonic_and_counted() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert!(b.time >= a.time);
        assert!(a.dt >= 0.0 && b.dt >= 0.0);
    }

    #[test]
    fn delta_is_clamped_after_a_stall() {
        let mut clock = FrameClock::new();
        clock.last = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .expect("clock is at least 5s past its epoch");
        let frame = clock.tick();
        assert!((frame.dt - MAX_FRAME_DELTA.as_secs_f64()).abs() < 1e-9);
    }

    #[test]
    fn frame_index_wraps() {
        let mut clock = FrameClock::new();
        clock.frame_index = u64::MAX;
        assert_eq!(clock.tick().frame_index, u64::MAX);
        assert_eq!(clock.tick().frame_index, 0);
    }

    #[test]
    fn fps_counter_reports_once_per_window() {
        let mut fps = FpsCounter::new(1.0);
        for i in 1..60 {
            assert_eq!(fps.record(f64::from(i) / 60.0), None);
        }
        let rate = fps.record(1.0).expect("window elapsed");
        assert!((rate - 60.0).abs() < 1e-9);
        assert_eq!(fps.record(1.01), None);
    }
}
