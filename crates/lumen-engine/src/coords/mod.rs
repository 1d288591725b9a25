//! Coordinate and geometry types shared by the beam pipeline and the renderer.
//!
//! Canonical CPU space:
//! - World units (logical pixels)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The renderer converts to NDC in the vertex shader using a viewport uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
