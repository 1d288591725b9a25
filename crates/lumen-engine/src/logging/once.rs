/// Latch for diagnostics that should be logged a single time.
///
/// Render paths run every frame; a persistent misconfiguration must surface
/// once instead of flooding the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct WarnOnce {
    fired: bool,
}

impl WarnOnce {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    /// Returns `true` the first time it is called, `false` afterwards.
    #[inline]
    pub fn first(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Re-arms the latch (e.g. after the pool is re-initialized with a new capacity).
    #[inline]
    pub fn reset(&mut self) {
        self.fired = false;
    }
}
