use std::time::{Duration, Instant};

/// Period after which the animation phase wraps back to zero.
///
/// Keeps `sin(phase * k)` terms in a range where `f32` still has sub-millisecond
/// resolution, at the cost of one visible hitch per hour.
pub const PHASE_WRAP_SECONDS: f32 = 3600.0;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Sum of clamped `dt` values since the clock started.
    pub elapsed: f64,

    /// `elapsed` wrapped at [`PHASE_WRAP_SECONDS`]. This is the `phase` passed
    /// to every width/color evaluation for the frame.
    pub phase: f32,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. The animation phase advances by the
/// clamped delta, so a stall never makes beams jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    elapsed: f64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            elapsed: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the delta baseline without touching the phase.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock using wall time and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.advance(dt, now)
    }

    /// Advances the clock by an explicit delta (offline rendering, tests).
    pub fn tick_by(&mut self, dt: Duration) -> FrameTime {
        self.last += dt;
        let now = self.last;
        self.advance(dt, now)
    }

    fn advance(&mut self, dt: Duration, now: Instant) -> FrameTime {
        let dt = dt.clamp(self.dt_min, self.dt_max);
        self.elapsed += dt.as_secs_f64();

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            elapsed: self.elapsed,
            phase: wrap_phase(self.elapsed),
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

#[inline]
fn wrap_phase(elapsed: f64) -> f32 {
    elapsed.rem_euclid(PHASE_WRAP_SECONDS as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_by_accumulates_phase() {
        let mut clock = FrameClock::new();
        let a = clock.tick_by(Duration::from_millis(100));
        let b = clock.tick_by(Duration::from_millis(100));
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert!((b.phase - 0.2).abs() < 1e-5);
    }

    #[test]
    fn stall_is_clamped() {
        let mut clock = FrameClock::new();
        let ft = clock.tick_by(Duration::from_secs(10));
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert!((ft.phase - 0.25).abs() < 1e-6);
    }

    #[test]
    fn phase_wraps() {
        assert!((wrap_phase(PHASE_WRAP_SECONDS as f64 + 1.5) - 1.5).abs() < 1e-4);
    }
}
