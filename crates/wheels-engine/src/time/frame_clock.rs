use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick, in seconds.
    pub dt: f32,

    /// Seconds since the clock was created (or last reset).
    pub elapsed: f32,

    /// Zero for the first frame, then increments by one per tick.
    pub frame_index: u64,
}

impl FrameTime {
    /// True for the first frame rendered by the runtime.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.frame_index == 0
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not
/// hand the app a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the timing baseline. The frame index keeps counting.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_frame_zero() {
        let mut clock = FrameClock::new();
        let first = clock.tick();
        assert!(first.is_first());
        let second = clock.tick();
        assert_eq!(second.frame_index, 1);
        assert!(!second.is_first());
    }

    #[test]
    fn dt_respects_minimum_clamp() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(10));
        let ft = clock.tick();
        assert!(ft.dt >= 0.005 - f32::EPSILON);
        assert!(ft.dt <= 0.010 + f32::EPSILON);
    }

    #[test]
    fn reset_keeps_frame_index() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.tick();
        clock.reset();
        assert_eq!(clock.tick().frame_index, 2);
    }
}
