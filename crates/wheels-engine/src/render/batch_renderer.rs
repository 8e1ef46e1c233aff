use anyhow::{anyhow, Result};

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::{premultiply_srgb8, Color};

use super::common::{grow_capacity, logical_clip_to_scissor, premul_alpha_blend, ViewportUniform};
use super::{
    validate_texture_data, GraphicsState, Renderer, SamplerState, ScissorRect, Texture,
    TextureError, TextureId, Vertex,
};

/// Result of [`WgpuRenderer::present`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// The surface was unavailable; recorded work for this frame was dropped.
    Skipped,
}

struct GpuTexture {
    // Kept alive for the view and bind groups.
    _texture: wgpu::Texture,
    width: u32,
    height: u32,
    /// One bind group per [`SamplerState`], indexed by `SamplerState::slot`.
    bind_groups: [wgpu::BindGroup; 2],
}

#[derive(Debug, Copy, Clone)]
struct DrawCall {
    texture: TextureId,
    sampler: SamplerState,
    scissor: Option<ScissorRect>,
    first_index: u32,
    index_count: u32,
    base_vertex: i32,
}

#[derive(Debug, Default)]
struct RecordedPass {
    clear: Option<Color>,
    draws: Vec<DrawCall>,
}

/// wgpu implementation of [`Renderer`].
///
/// Clears and batches are recorded as they arrive and encoded by
/// [`present`](Self::present): one render pass per clear, one indexed draw per
/// batch. All geometry of a frame shares one vertex and one index buffer.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,

    viewport: Viewport,
    scale_factor: f32,

    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    samplers: [wgpu::Sampler; 2],

    textures: Vec<Option<GpuTexture>>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,

    // per-frame recording
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    passes: Vec<RecordedPass>,
    base: Option<(u32, u32)>,

    warned_missing_texture: bool,
}

impl WgpuRenderer {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wheels batch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wheels viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: ViewportUniform::min_binding_size(),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wheels texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("wheels batch pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("wheels batch pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Transforms may mirror geometry; draw both windings.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wheels viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wheels viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let samplers = SamplerState::ALL.map(|s| create_sampler(&device, s));

        Self {
            device,
            queue,
            viewport: Viewport::new(1.0, 1.0),
            scale_factor: 1.0,
            pipeline,
            texture_bgl,
            viewport_ubo,
            viewport_bind_group,
            samplers,
            textures: Vec::new(),
            vbo: None,
            vbo_capacity: 0,
            ibo: None,
            ibo_capacity: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
            passes: Vec::new(),
            base: None,
            warned_missing_texture: false,
        }
    }

    /// Sets the logical render target size and the logical-to-physical scale.
    pub fn set_viewport(&mut self, viewport: Viewport, scale_factor: f32) {
        self.viewport = viewport;
        self.scale_factor = scale_factor.max(0.01);
    }

    /// Encodes everything recorded since the last call into the next surface
    /// frame, submits it and presents it.
    ///
    /// Recorded work is consumed even when the frame is skipped.
    pub fn present(&mut self, gpu: &mut Gpu<'_>) -> Result<FrameOutcome> {
        if self.base.is_some() {
            log::warn!("WgpuRenderer: present called between begin_render and end_render");
            self.base = None;
        }

        let mut frame = match gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                self.reset_frame();
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow!("surface is out of memory")),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        Ok(FrameOutcome::Skipped)
                    }
                };
            }
        };

        self.upload_geometry();

        let mut passes = std::mem::take(&mut self.passes);
        if passes.is_empty() {
            passes.push(RecordedPass::default());
        }

        for (i, pass) in passes.iter().enumerate() {
            // The first pass must initialize the freshly acquired target.
            let load = match (pass.clear, i) {
                (Some(c), _) => wgpu::LoadOp::Clear(to_wgpu_color(c)),
                (None, 0) => wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                (None, _) => wgpu::LoadOp::Load,
            };
            self.encode_pass(&mut frame.encoder, &frame.view, load, &pass.draws);
        }

        gpu.present(frame);

        passes.clear();
        self.passes = passes;
        self.reset_frame();
        Ok(FrameOutcome::Presented)
    }

    fn encode_pass(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        draws: &[DrawCall],
    ) {
        let mut missing = false;

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("wheels batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (Some(vbo), Some(ibo)) = (self.vbo.as_ref(), self.ibo.as_ref()) else {
                // Nothing was ever drawn; the pass only clears.
                return;
            };
            if draws.is_empty() {
                return;
            }

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
            rpass.set_vertex_buffer(0, vbo.slice(..));
            rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

            for draw in draws {
                let Some(tex) = self.textures.get(draw.texture.index()).and_then(Option::as_ref) else {
                    missing = true;
                    continue;
                };
                let Some((sx, sy, sw, sh)) =
                    logical_clip_to_scissor(draw.scissor, self.viewport, self.scale_factor)
                else {
                    continue;
                };
                rpass.set_scissor_rect(sx, sy, sw, sh);
                rpass.set_bind_group(1, &tex.bind_groups[draw.sampler.slot()], &[]);
                rpass.draw_indexed(
                    draw.first_index..draw.first_index + draw.index_count,
                    draw.base_vertex,
                    0..1,
                );
            }
        }

        if missing && !self.warned_missing_texture {
            log::warn!("WgpuRenderer: batch references an unknown or released texture; skipped");
            self.warned_missing_texture = true;
        }
    }

    fn upload_geometry(&mut self) {
        self.queue.write_buffer(
            &self.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(self.viewport)),
        );

        if self.vertices.is_empty() || self.indices.is_empty() {
            return;
        }

        self.ensure_vertex_capacity(self.vertices.len());
        self.ensure_index_capacity(self.indices.len());

        if let Some(vbo) = self.vbo.as_ref() {
            self.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertices));
        }
        if let Some(ibo) = self.ibo.as_ref() {
            self.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&self.indices));
        }
    }

    fn ensure_vertex_capacity(&mut self, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }
        let new_cap = grow_capacity(required, 1024);
        self.vbo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wheels batch vbo"),
            size: (new_cap * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
        log::debug!("WgpuRenderer: vertex buffer grown to {new_cap} vertices");
    }

    fn ensure_index_capacity(&mut self, required: usize) {
        if required <= self.ibo_capacity && self.ibo.is_some() {
            return;
        }
        let new_cap = grow_capacity(required, 1536);
        self.ibo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wheels batch ibo"),
            size: (new_cap * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.ibo_capacity = new_cap;
        log::debug!("WgpuRenderer: index buffer grown to {new_cap} indices");
    }

    fn reset_frame(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.passes.clear();
        self.base = None;
    }

    fn current_pass(&mut self) -> &mut RecordedPass {
        if self.passes.is_empty() {
            self.passes.push(RecordedPass::default());
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }
}

impl Renderer for WgpuRenderer {
    fn register_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<Texture, TextureError> {
        validate_texture_data(rgba, width, height)?;
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureError::TooLarge { width, height, max });
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("wheels texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let premul = premultiply_srgb8(rgba);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &premul,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_groups = SamplerState::ALL.map(|s| {
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("wheels texture bind group"),
                layout: &self.texture_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.samplers[s.slot()]),
                    },
                ],
            })
        });

        // Ids are never reused, so a released id stays dead.
        let index = self.textures.len();
        self.textures.push(Some(GpuTexture { _texture: texture, width, height, bind_groups }));

        log::debug!("WgpuRenderer: registered texture #{index} ({width}x{height})");
        Ok(Texture { id: TextureId(index as u32), width, height })
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(slot) = self.textures.get_mut(id.index()) {
            *slot = None;
        }
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures
            .get(id.index())
            .and_then(Option::as_ref)
            .map(|t| (t.width, t.height))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self, color: Color) {
        match self.passes.last_mut() {
            // A pass that has not drawn anything yet can just take the new color.
            Some(pass) if pass.draws.is_empty() => pass.clear = Some(color),
            _ => self.passes.push(RecordedPass { clear: Some(color), draws: Vec::new() }),
        }
    }

    fn begin_render(&mut self, vertices: &[Vertex], indices: &[u32]) {
        debug_assert!(self.base.is_none(), "begin_render called twice");
        self.base = Some((self.vertices.len() as u32, self.indices.len() as u32));
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
    }

    fn draw_batch(&mut self, state: &GraphicsState, start_index: u32, index_count: u32) {
        let Some((base_vertex, base_index)) = self.base else {
            log::warn!("WgpuRenderer: draw_batch outside begin_render; ignored");
            return;
        };
        if index_count == 0 {
            return;
        }
        let call = DrawCall {
            texture: state.texture,
            sampler: state.sampler,
            scissor: state.scissor,
            first_index: base_index + start_index,
            index_count,
            base_vertex: base_vertex as i32,
        };
        self.current_pass().draws.push(call);
    }

    fn end_render(&mut self) {
        self.base = None;
    }
}

fn create_sampler(device: &wgpu::Device, state: SamplerState) -> wgpu::Sampler {
    let filter = match state {
        SamplerState::LinearClamp => wgpu::FilterMode::Linear,
        SamplerState::PointClamp => wgpu::FilterMode::Nearest,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("wheels sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}
