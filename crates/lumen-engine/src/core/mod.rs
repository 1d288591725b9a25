//! Engine context and lifecycle hooks.
//!
//! `BeamEngine` is the single object a host keeps for the beam subsystem. It
//! owns the shared buffer pool, so there is no process-wide state.

mod engine;

pub use engine::{BeamEngine, EngineConfig};
