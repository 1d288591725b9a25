//! Color model shared by the shading functions and the renderer.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - palettes and palette lookup by theme key
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod palette;

pub use color::Color;
pub use palette::{
    resolve as resolve_palette, NoPalettes, Palette, PaletteBook, PaletteSource, SpreadMode,
    DEFAULT_PALETTE,
};
