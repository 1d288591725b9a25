//! GPU rendering subsystem.
//!
//! `BeamRenderer` is the wgpu implementation of `beam::DrawBackend`: the
//! compositor submits passes into it during the frame and `flush` turns the
//! batch into one render pass.
//!
//! Convention:
//! - CPU geometry is in world units (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a viewport uniform.

mod beam;
mod blend;
mod ctx;

pub use beam::{BeamRenderer, FlushStats};
pub use ctx::{RenderCtx, RenderTarget};
