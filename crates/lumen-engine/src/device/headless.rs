use anyhow::{Context, Result};

use crate::coords::Viewport;
use crate::render::RenderCtx;

use super::GpuInit;

/// Owns wgpu core objects and an offscreen color target.
///
/// The window-less counterpart of a surface-backed context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - owns a render-attachment texture the frame is drawn into
/// - hands out an encoder + view per frame and submits it
pub struct HeadlessGpu {
    /// Kept alive for the adapter and device.
    _instance: wgpu::Instance,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    target: wgpu::Texture,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

/// A single frame in flight.
///
/// Hand it back to [`HeadlessGpu::submit`] once every renderer has recorded
/// into `encoder`.
pub struct HeadlessFrame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl HeadlessGpu {
    /// Creates the context. Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        init.validate()?;

        let GpuInit {
            size,
            format,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let info = adapter.get_info();
        log::info!("headless gpu: {} ({:?})", info.name, info.backend);

        let target = create_target(&device, size, format);

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            target,
            format,
            size,
        })
    }

    /// Blocking variant of [`new`](Self::new) for hosts without an executor.
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// One world unit per target pixel, origin at the top-left corner.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.size.0 as f32, self.size.1 as f32)
    }

    /// Renderer context for this device showing `viewport`.
    pub fn render_ctx(&self, viewport: Viewport) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, self.format, viewport)
    }

    /// Recreates the offscreen target. Zero sizes are rejected.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        anyhow::ensure!(
            width > 0 && height > 0,
            "offscreen target has zero size ({width}x{height})"
        );
        if (width, height) == self.size {
            return Ok(());
        }
        self.size = (width, height);
        self.target = create_target(&self.device, self.size, self.format);
        log::debug!("headless target resized to {width}x{height}");
        Ok(())
    }

    /// Starts a frame, clearing the target to `clear`.
    pub fn begin_frame(&self, clear: wgpu::Color) -> HeadlessFrame {
        let view = self.target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen frame encoder"),
        });

        // An empty pass with a clear load op.
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        HeadlessFrame { view, encoder }
    }

    /// Submits the recorded commands for `frame`.
    pub fn submit(&self, frame: HeadlessFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
    }
}

fn create_target(
    device: &wgpu::Device,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("lumen offscreen target"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
