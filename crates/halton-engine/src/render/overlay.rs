//! Single-pipeline renderer for [`OverlayList`]s.

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::overlay::{OverlayCmd, OverlayList};
use crate::text::FontSystem;

use super::atlas::{GlyphAtlas, UvRect};
use super::{RenderCtx, RenderTarget};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct OverlayInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl OverlayInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OverlayInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(min: [f32; 2], max: [f32; 2], uv: UvRect, color: crate::paint::Color) -> Self {
        Self {
            dst_min: min,
            dst_max: max,
            uv_min: uv.min,
            uv_max: uv.max,
            color: [color.r, color.g, color.b, color.a],
        }
    }
}

/// Device objects, built on first use and rebuilt when the surface format changes.
struct OverlayGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport: wgpu::Buffer,
    atlas: GlyphAtlas,
    instances: Option<wgpu::Buffer>,
    capacity: usize,
}

impl OverlayGpu {
    fn new(ctx: &RenderCtx<'_>) -> Self {
        let device = ctx.device;
        let atlas = GlyphAtlas::new(device, ctx.queue);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("halton overlay shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("halton overlay bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(16),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let viewport = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("halton overlay viewport"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("halton overlay sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("halton overlay bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: viewport.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(atlas.view()) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&sampler) },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("halton overlay pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("halton overlay pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[OverlayInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.backbuffer.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            format: ctx.backbuffer.format,
            pipeline,
            bind_group,
            viewport,
            atlas,
            instances: None,
            capacity: 0,
        }
    }

    fn upload_instances(&mut self, ctx: &RenderCtx<'_>, instances: &[OverlayInstance]) {
        if self.instances.is_none() || instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two().max(64);
            self.instances = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("halton overlay instances"),
                size: (self.capacity * std::mem::size_of::<OverlayInstance>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
        if let Some(buffer) = &self.instances {
            ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(instances));
        }
    }
}

/// Draws the HUD over whatever the frame already holds.
pub struct OverlayRenderer {
    gpu: Option<OverlayGpu>,
    layout: Layout<()>,
    instances: Vec<OverlayInstance>,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self {
            gpu: None,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            instances: Vec::new(),
        }
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        list: &OverlayList,
        fonts: &FontSystem,
    ) {
        if list.is_empty() {
            return;
        }
        if self.gpu.as_ref().is_none_or(|g| g.format != ctx.backbuffer.format) {
            self.gpu = Some(OverlayGpu::new(ctx));
        }
        let Some(gpu) = self.gpu.as_mut() else { return };

        self.instances.clear();
        for cmd in list.iter() {
            match cmd {
                OverlayCmd::Fill { rect, color } => {
                    self.instances.extend(fill_instance(*rect, *color, gpu.atlas.white()));
                }
                OverlayCmd::Text { text, font, size, color, origin } => {
                    let Some(font) = fonts.get(*font) else {
                        log::warn!("overlay text uses an unknown font; skipped");
                        continue;
                    };
                    self.layout.reset(&LayoutSettings {
                        x: origin.x,
                        y: origin.y,
                        ..LayoutSettings::default()
                    });
                    self.layout.append(&[font], &TextStyle::new(text, *size, 0));
                    for g in self.layout.glyphs() {
                        if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                            continue;
                        }
                        let Some(uv) = gpu.atlas.glyph(ctx.queue, font, g.key) else { continue };
                        self.instances.push(OverlayInstance::new(
                            [g.x, g.y],
                            [g.x + g.width as f32, g.y + g.height as f32],
                            uv,
                            *color,
                        ));
                    }
                }
            }
        }
        if self.instances.is_empty() {
            return;
        }

        let size = [ctx.backbuffer.width.max(1) as f32, ctx.backbuffer.height.max(1) as f32, 0.0, 0.0];
        ctx.queue.write_buffer(&gpu.viewport, 0, bytemuck::cast_slice(&size));
        gpu.upload_instances(ctx, &self.instances);
        let Some(instances) = &gpu.instances else { return };

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("halton overlay pass"),
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
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &gpu.bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..4, 0..self.instances.len() as u32);
    }
}

fn fill_instance(rect: crate::coords::Rect, color: crate::paint::Color, white: UvRect) -> Option<OverlayInstance> {
    let r = rect.normalized();
    if r.is_empty() || color.a <= 0.0 {
        return None;
    }
    Some(OverlayInstance::new(
        [r.origin.x, r.origin.y],
        [r.origin.x + r.size.x, r.origin.y + r.size.y],
        white,
        color,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;

    const WHITE: UvRect = UvRect { min: [0.25, 0.25], max: [0.25, 0.25] };

    #[test]
    fn fills_use_the_white_texel() {
        let inst = fill_instance(Rect::new(1.0, 2.0, 3.0, 4.0), Color::from_straight(1.0, 0.0, 0.0, 1.0), WHITE)
            .unwrap();
        assert_eq!(inst.dst_min, [1.0, 2.0]);
        assert_eq!(inst.dst_max, [4.0, 6.0]);
        assert_eq!(inst.uv_min, WHITE.min);
        assert_eq!(inst.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn negative_sizes_are_normalized() {
        let inst = fill_instance(Rect::new(4.0, 6.0, -3.0, -4.0), Color::from_straight(1.0, 1.0, 1.0, 1.0), WHITE)
            .unwrap();
        assert_eq!((inst.dst_min, inst.dst_max), ([1.0, 2.0], [4.0, 6.0]));
    }

    #[test]
    fn invisible_fills_are_dropped() {
        assert!(fill_instance(Rect::new(0.0, 0.0, 0.0, 5.0), Color::from_straight(1.0, 1.0, 1.0, 1.0), WHITE).is_none());
        assert!(fill_instance(Rect::new(0.0, 0.0, 5.0, 5.0), Color::transparent(), WHITE).is_none());
    }
}
