use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::beam::{BackendState, BeamVertex, BlendMode, CullMode, DrawBackend};
use crate::render::{RenderCtx, RenderTarget};

use super::blend::blend_state;

/// Beam renderer backed by wgpu.
///
/// Implements [`DrawBackend`] by copying every submitted pass into retained CPU
/// arrays; [`flush`](Self::flush) uploads the batch and replays it in one
/// render pass, switching between the additive and the alpha pipeline.
///
/// Colors are expected to be linear premultiplied RGBA.
#[derive(Default)]
pub struct BeamRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    additive_pipeline: Option<wgpu::RenderPipeline>,
    alpha_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    view_ubo: Option<wgpu::Buffer>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,

    // Batch for the current frame; cleared (capacity kept) by `flush`.
    vertices: Vec<BeamVertex>,
    indices: Vec<u16>,
    draws: Vec<BatchedDraw>,

    state: BackendState,
    warned_cull: bool,
}

#[derive(Debug, Clone)]
struct BatchedDraw {
    indices: Range<u32>,
    base_vertex: i32,
    blend: BlendMode,
}

/// Work done by one [`BeamRenderer::flush`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct FlushStats {
    pub draw_calls: usize,
    pub pipeline_switches: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl BeamRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes submitted since the last flush.
    #[inline]
    pub fn pending_draws(&self) -> usize {
        self.draws.len()
    }

    /// Drops the pending batch without drawing it.
    pub fn discard(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draws.clear();
    }

    /// Uploads the pending batch and draws it into `target` on top of its
    /// current contents.
    pub fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> FlushStats {
        if self.draws.is_empty() {
            return FlushStats::default();
        }

        self.ensure_pipelines(ctx);
        self.ensure_bindings(ctx);

        // Buffer writes must be a multiple of four bytes.
        if self.indices.len() % 2 == 1 {
            self.indices.push(0);
        }

        // Mutating methods must happen before borrowing pipelines/buffers immutably.
        self.write_view_uniform(ctx);
        self.ensure_buffers(ctx);

        let Some(vbo) = self.vbo.as_ref() else { return FlushStats::default() };
        let Some(ibo) = self.ibo.as_ref() else { return FlushStats::default() };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertices));
        ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&self.indices));

        let Some(additive) = self.additive_pipeline.as_ref() else { return FlushStats::default() };
        let Some(alpha) = self.alpha_pipeline.as_ref() else { return FlushStats::default() };
        let Some(bind_group) = self.bind_group.as_ref() else { return FlushStats::default() };

        let mut stats = FlushStats { vertices: self.vertices.len(), ..FlushStats::default() };
        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen beam pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, bind_group, &[]);
            rpass.set_vertex_buffer(0, vbo.slice(..));
            rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);

            let mut bound: Option<BlendMode> = None;
            for draw in &self.draws {
                if bound != Some(draw.blend) {
                    rpass.set_pipeline(match draw.blend {
                        BlendMode::Additive => additive,
                        BlendMode::Alpha => alpha,
                    });
                    bound = Some(draw.blend);
                    stats.pipeline_switches += 1;
                }
                rpass.draw_indexed(draw.indices.clone(), draw.base_vertex, 0..1);
                stats.draw_calls += 1;
                stats.triangles += draw.indices.len() / 3;
            }
        }

        log::trace!(
            "beam flush: {} draws, {} triangles, {} pipeline switches",
            stats.draw_calls,
            stats.triangles,
            stats.pipeline_switches
        );
        self.discard();
        stats
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format)
            && self.additive_pipeline.is_some()
            && self.alpha_pipeline.is_some()
        {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen beam shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/beam.wgsl").into()),
        });

        let uniform_size = wgpu::BufferSize::new(std::mem::size_of::<ViewUniform>() as u64);
        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lumen beam bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_size,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen beam pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let build = |label: &'static str, mode: BlendMode| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: Some(blend_state(mode)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Ribbons may fold over themselves on tight curves.
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let additive = build("lumen beam additive pipeline", BlendMode::Additive);
        let alpha = build("lumen beam alpha pipeline", BlendMode::Alpha);

        log::debug!("beam pipelines built for {:?}", ctx.target_format);
        self.pipeline_format = Some(ctx.target_format);
        self.additive_pipeline = Some(additive);
        self.alpha_pipeline = Some(alpha);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.view_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.view_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let view_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen beam view ubo"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen beam bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: view_ubo.as_entire_binding() }],
        });

        self.view_ubo = Some(view_ubo);
        self.bind_group = Some(bind_group);
    }

    fn write_view_uniform(&mut self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.view_ubo.as_ref() else { return };
        let vp = ctx.viewport;
        let u = ViewUniform {
            size: [vp.width.max(1.0), vp.height.max(1.0)],
            origin: [vp.origin.x, vp.origin.y],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    /// Grows the GPU buffers to fit the pending batch. They never shrink.
    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertices.len() > self.vbo_capacity || self.vbo.is_none() {
            let cap = self.vertices.len().next_power_of_two().max(1024);
            self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lumen beam vbo"),
                size: (cap * std::mem::size_of::<BeamVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vbo_capacity = cap;
        }

        if self.indices.len() > self.ibo_capacity || self.ibo.is_none() {
            let cap = self.indices.len().next_power_of_two().max(4096);
            self.ibo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("lumen beam ibo"),
                size: (cap * std::mem::size_of::<u16>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.ibo_capacity = cap;
        }
    }
}

impl DrawBackend for BeamRenderer {
    fn save_state(&mut self) -> BackendState {
        self.state
    }

    fn apply_state(&mut self, state: BackendState) {
        if (state.cull != CullMode::None || state.depth_test) && !self.warned_cull {
            log::debug!("beam renderer draws without culling or depth; requested {state:?}");
            self.warned_cull = true;
        }
        self.state = state;
    }

    fn submit_triangle_list(&mut self, vertices: &[BeamVertex], indices: &[u16], blend: BlendMode) {
        if vertices.is_empty() || indices.len() < 3 {
            return;
        }
        let triangles = indices.len() / 3;
        let Ok(base_vertex) = i32::try_from(self.vertices.len()) else { return };
        let Ok(start) = u32::try_from(self.indices.len()) else { return };
        let end = start + (triangles * 3) as u32;

        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(&indices[..triangles * 3]);
        self.draws.push(BatchedDraw { indices: start..end, base_vertex, blend });
    }

    fn restore_state(&mut self, state: BackendState) {
        self.state = state;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewUniform {
    size: [f32; 2],
    origin: [f32; 2],
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x4, // color
    2 => Float32x2  // uv
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<BeamVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}
