/// Fixed-rate simulation stepper.
///
/// Converts variable frame deltas into whole simulation steps. Each step has
/// a monotonically increasing number, which is what the managed beam registry
/// keys its once-per-step aging on.
#[derive(Debug, Clone)]
pub struct StepAccumulator {
    step_seconds: f32,
    accumulated: f32,
    step: u64,
    max_steps_per_frame: u32,
}

impl StepAccumulator {
    /// Default simulation rate.
    pub const DEFAULT_RATE_HZ: f32 = 60.0;

    pub fn new(rate_hz: f32) -> Self {
        let rate_hz =
            if rate_hz.is_finite() && rate_hz > 0.0 { rate_hz } else { Self::DEFAULT_RATE_HZ };
        Self {
            step_seconds: 1.0 / rate_hz,
            accumulated: 0.0,
            step: 0,
            max_steps_per_frame: 8,
        }
    }

    /// Caps how many steps one frame may run; excess time is dropped.
    pub fn with_max_steps_per_frame(mut self, max: u32) -> Self {
        self.max_steps_per_frame = max.max(1);
        self
    }

    /// Number of the most recently completed step (0 before any step ran).
    #[inline]
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Fraction of a step accumulated but not yet run, in [0, 1).
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.accumulated / self.step_seconds).clamp(0.0, 1.0)
    }

    /// Adds `dt` seconds and returns the numbers of the steps that became due,
    /// oldest first.
    pub fn advance(&mut self, dt: f32) -> std::ops::RangeInclusive<u64> {
        if dt.is_finite() && dt > 0.0 {
            self.accumulated += dt;
        }

        let mut due = 0u32;
        while self.accumulated >= self.step_seconds && due < self.max_steps_per_frame {
            self.accumulated -= self.step_seconds;
            due += 1;
        }
        if due == self.max_steps_per_frame && self.accumulated >= self.step_seconds {
            log::trace!("step accumulator dropping {:.3}s of backlog", self.accumulated);
            self.accumulated = 0.0;
        }

        let first = self.step + 1;
        self.step += due as u64;
        // An empty range when nothing is due.
        first..=self.step
    }
}

impl Default for StepAccumulator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE_HZ)
    }
}
