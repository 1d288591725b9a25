//! Time subsystem.
//!
//! Provides the two clocks the host loop feeds the engine with:
//! - `FrameClock::tick()` once per presented frame, yielding the animation `phase`
//! - `StepAccumulator::advance()` to run fixed simulation steps (registry aging)

mod frame_clock;
mod step;

pub use frame_clock::{FrameClock, FrameTime, PHASE_WRAP_SECONDS};
pub use step::StepAccumulator;
