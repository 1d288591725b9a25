//! Lumen engine crate.
//!
//! Procedural beam geometry (spline smoothing, per-vertex shading, pooled
//! ribbon meshes) drawn through bloom/glow/body/core passes, plus the wgpu
//! backend and headless device used to put those passes on a GPU.

pub mod beam;
pub mod core;
pub mod device;
pub mod time;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
