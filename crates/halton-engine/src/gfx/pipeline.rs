use std::collections::HashMap;

use super::shader::{PsId, ShaderRegistry, VsId};
use super::state::{depth_stencil_state, primitive_state, DepthState, RasterState};

/// Everything that selects a distinct render pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineKey {
    pub vs: VsId,
    pub ps: PsId,
    pub raster: RasterState,
    pub depth: DepthState,
    pub color_format: wgpu::TextureFormat,
    /// `None` when no depth output is bound.
    pub depth_format: Option<wgpu::TextureFormat>,
    pub topology: wgpu::PrimitiveTopology,
}

/// Lazily built pipelines, one per distinct [`PipelineKey`].
#[derive(Default)]
pub struct PipelineCache {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn clear(&mut self) {
        self.pipelines.clear();
    }

    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        shaders: &ShaderRegistry,
        line_mode: bool,
        key: PipelineKey,
    ) -> &wgpu::RenderPipeline {
        self.pipelines
            .entry(key)
            .or_insert_with(|| build(device, shaders, line_mode, key))
    }
}

fn build(
    device: &wgpu::Device,
    shaders: &ShaderRegistry,
    line_mode: bool,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    log::debug!("building pipeline {key:?}");

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("halton pipeline layout"),
        bind_group_layouts: &[
            shaders.constants_layout(key.vs),
            shaders.texture_layout(key.ps),
            shaders.sampler_layout(),
        ],
        immediate_size: 0,
    });

    let vertex_layout = key.vs.vertex_kind().buffer_layout();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("halton pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shaders.vertex_module(key.vs),
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shaders.pixel_module(key.ps),
            entry_point: Some(key.ps.entry_point()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(key.raster, key.topology, line_mode),
        depth_stencil: key
            .depth_format
            .map(|format| depth_stencil_state(key.depth, format)),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
