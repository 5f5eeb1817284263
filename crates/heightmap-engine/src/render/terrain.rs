use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::{FillMode, RenderState};
use crate::device::Gpu;
use crate::mesh::{GridMesh, GridVertex};

use super::shader::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::{RenderCtx, RenderTarget};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Fixed strip restart value for `Uint32` indices in wgpu.
const GPU_RESTART_INDEX: u32 = u32::MAX;

/// Terrain renderer settings.
#[derive(Debug, Clone, Copy)]
pub struct TerrainConfig {
    pub clear_colour: wgpu::Color,
    /// Requested MSAA sample count; lowered to what the adapter supports.
    pub sample_count: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            clear_colour: wgpu::Color {
                r: 0.4,
                g: 0.4,
                b: 0.4,
                a: 1.0,
            },
            sample_count: 4,
        }
    }
}

/// Draws one uploaded [`GridMesh`] as a restart-separated triangle strip.
///
/// Buffers and pipelines are created up front; depth and MSAA targets follow the
/// surface size and are rebuilt lazily when it changes.
pub struct TerrainRenderer {
    clear_colour: wgpu::Color,
    sample_count: u32,
    surface_format: wgpu::TextureFormat,

    fill_pipeline: wgpu::RenderPipeline,
    /// `None` when the device lacks `POLYGON_MODE_LINE`.
    line_pipeline: Option<wgpu::RenderPipeline>,

    bind_group: wgpu::BindGroup,
    transform_ubo: wgpu::Buffer,

    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,

    targets: Option<FrameTargets>,

    warned_no_wireframe: bool,
}

struct FrameTargets {
    size: (u32, u32),
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
}

impl TerrainRenderer {
    pub fn new(
        gpu: &Gpu<'_>,
        mesh: &GridMesh,
        shaders: &ShaderSources,
        config: TerrainConfig,
    ) -> Result<Self> {
        let device = gpu.device();
        let surface_format = gpu.surface_format();

        let vertex_bytes: &[u8] = bytemuck::cast_slice(mesh.vertices());
        anyhow::ensure!(
            (vertex_bytes.len() as u64) <= device.limits().max_buffer_size,
            "terrain mesh ({} bytes) exceeds the device buffer limit",
            vertex_bytes.len()
        );
        let index_count =
            u32::try_from(mesh.indices().len()).context("terrain index count exceeds u32")?;

        let sample_count = gpu
            .supported_sample_count(surface_format, config.sample_count)
            .min(gpu.supported_sample_count(DEPTH_FORMAT, config.sample_count));
        if sample_count != config.sample_count {
            log::info!(
                "MSAA x{} unavailable, using x{}",
                config.sample_count,
                sample_count
            );
        }

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain vbo"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = mesh.remapped_indices(GPU_RESTART_INDEX);
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("terrain transform ubo"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TransformUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain vertex shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.vertex.wgsl.as_str().into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain fragment shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.fragment.wgsl.as_str().into()),
        });

        let stages = PipelineStages {
            layout: &pipeline_layout,
            vs: &vs,
            fs: &fs,
            format: surface_format,
            sample_count,
        };

        let fill_pipeline = stages.build(device, wgpu::PolygonMode::Fill, "terrain fill pipeline");
        let line_pipeline = gpu
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| stages.build(device, wgpu::PolygonMode::Line, "terrain line pipeline"));

        log::info!(
            "terrain uploaded: {} vertices, {} indices, MSAA x{}, wireframe {}",
            mesh.vertices().len(),
            index_count,
            sample_count,
            if line_pipeline.is_some() { "available" } else { "unsupported" }
        );

        Ok(Self {
            clear_colour: config.clear_colour,
            sample_count,
            surface_format,
            fill_pipeline,
            line_pipeline,
            bind_group,
            transform_ubo,
            vbo,
            ibo,
            index_count,
            targets: None,
            warned_no_wireframe: false,
        })
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn supports_wireframe(&self) -> bool {
        self.line_pipeline.is_some()
    }

    /// Clears the target and draws the terrain with `state`'s MVP and fill mode.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        state: &RenderState,
    ) -> Result<()> {
        anyhow::ensure!(
            ctx.surface_format == self.surface_format,
            "surface format changed from {:?} to {:?}",
            self.surface_format,
            ctx.surface_format
        );

        if !self.ensure_targets(ctx) {
            return Ok(());
        }
        self.write_transform(ctx, state);

        let wants_lines = state.fill_mode().is_wireframe();
        if wants_lines && !self.supports_wireframe() && !self.warned_no_wireframe {
            log::warn!("wireframe needs POLYGON_MODE_LINE, which this device lacks; drawing filled");
            self.warned_no_wireframe = true;
        }

        let pipeline = self.pipeline_for(state.fill_mode());
        let Some(targets) = self.targets.as_ref() else {
            return Ok(());
        };

        let (color_view, resolve_target, store) = match targets.msaa_view.as_ref() {
            Some(msaa) => (msaa, Some(target.color_view), wgpu::StoreOp::Discard),
            None => (target.color_view, None, wgpu::StoreOp::Store),
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("terrain pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some((vw, vh)) = draw_viewport(state.viewport(), targets.size) else {
            // Minimized or not yet sized: clear only.
            return Ok(());
        };
        rpass.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);

        Ok(())
    }

    fn pipeline_for(&self, mode: FillMode) -> &wgpu::RenderPipeline {
        match (mode, self.line_pipeline.as_ref()) {
            (FillMode::Wireframe, Some(line)) => line,
            _ => &self.fill_pipeline,
        }
    }

    fn write_transform(&self, ctx: &RenderCtx<'_>, state: &RenderState) {
        let u = TransformUniform {
            mvp: state.mvp().to_cols_array_2d(),
        };
        ctx.queue.write_buffer(&self.transform_ubo, 0, bytemuck::bytes_of(&u));
    }

    /// Returns `false` if the target has no area and nothing can be drawn.
    fn ensure_targets(&mut self, ctx: &RenderCtx<'_>) -> bool {
        let Some(size) = attachment_size(ctx.target_size) else {
            return false;
        };
        if self.targets.as_ref().is_some_and(|t| t.size == size) {
            return true;
        }

        let extent = wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        };

        let attachment = |label: &str, format: wgpu::TextureFormat| {
            ctx.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: self.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let depth_view = attachment("terrain depth", DEPTH_FORMAT);
        let msaa_view =
            (self.sample_count > 1).then(|| attachment("terrain msaa colour", self.surface_format));

        log::debug!("terrain targets resized to {}x{}", size.0, size.1);
        self.targets = Some(FrameTargets {
            size,
            depth_view,
            msaa_view,
        });
        true
    }
}

impl Drop for TerrainRenderer {
    fn drop(&mut self) {
        log::info!("releasing terrain buffers and pipelines");
    }
}

/// Depth/MSAA size for a colour target; `None` for a zero-area target.
///
/// Every attachment in a pass must share the colour target's exact size.
fn attachment_size(target: (u32, u32)) -> Option<(u32, u32)> {
    (target.0 > 0 && target.1 > 0).then_some(target)
}

/// Viewport clamped to the attachment size; `None` if nothing would be visible.
fn draw_viewport(requested: (u32, u32), target: (u32, u32)) -> Option<(u32, u32)> {
    let w = requested.0.min(target.0);
    let h = requested.1.min(target.1);
    (w > 0 && h > 0).then_some((w, h))
}

struct PipelineStages<'a> {
    layout: &'a wgpu::PipelineLayout,
    vs: &'a wgpu::ShaderModule,
    fs: &'a wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sample_count: u32,
}

impl PipelineStages<'_> {
    fn build(
        &self,
        device: &wgpu::Device,
        polygon_mode: wgpu::PolygonMode,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(self.layout),

            vertex: wgpu::VertexState {
                module: self.vs,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: self.fs,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),

            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        })
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3  // colour
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GridVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_grid_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }

    #[test]
    fn transform_uniform_is_one_mat4() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 64);
    }

    #[test]
    fn attachments_follow_target_exactly() {
        assert_eq!(attachment_size((720, 576)), Some((720, 576)));
        assert_eq!(attachment_size((1, 1)), Some((1, 1)));
    }

    #[test]
    fn zero_area_target_gets_no_attachments() {
        assert_eq!(attachment_size((0, 0)), None);
        assert_eq!(attachment_size((720, 0)), None);
        assert_eq!(attachment_size((0, 576)), None);
    }

    #[test]
    fn viewport_is_clamped_to_target() {
        assert_eq!(draw_viewport((1440, 1152), (1440, 1152)), Some((1440, 1152)));
        assert_eq!(draw_viewport((2000, 900), (1600, 1000)), Some((1600, 900)));
        assert_eq!(draw_viewport((0, 900), (1600, 1000)), None);
    }
}
