//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - owning the offscreen color target
//! - providing encoders/views for rendering and submitting them

mod headless;
mod init;

pub use headless::{HeadlessFrame, HeadlessGpu};
pub use init::GpuInit;
