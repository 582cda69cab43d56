//! Render state machine: bound shader stages, fixed-function states, output
//! binding and the draw path that turns them into wgpu passes.

use std::ops::{Deref, DerefMut, Range};

use glam::{Mat4, Vec3};

use crate::device::BackbufferDesc;
use crate::paint::unpack_argb;

use super::error::GfxError;
use super::mesh::{Mesh, MeshOps, TextureSlots};
use super::pipeline::{PipelineCache, PipelineKey};
use super::resource::{FallbackTexture, GpuTarget, TargetKind, DEPTH_FORMAT};
use super::shader::{ConstantBlock, DsId, HsId, PsId, ShaderRegistry, VsId};
use super::state::{DepthState, RasterState, SamplerState, SamplerTable};
use super::target::{DeviceAllocator, Output, RenderTargets, TargetHandle};
use super::vertex::VertexKind;

/// Maps back-buffer pixels (top-left origin, +Y down) to clip space.
pub fn screen_projection(width: u32, height: u32) -> Mat4 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.0))
        * Mat4::from_scale(Vec3::new(2.0 / w, -2.0 / h, 1.0))
}

#[derive(Debug, Default, Copy, Clone)]
struct BoundStages {
    vs: Option<VsId>,
    hs: Option<HsId>,
    ds: Option<DsId>,
    ps: Option<PsId>,
    raster: RasterState,
    depth: DepthState,
    sampler: SamplerState,
}

/// Device-lifetime rendering resources.
///
/// Built in `on_device_created`, told about swapchain loss and resize, and
/// turned into a per-frame [`Context`] with [`Renderer::begin`].
pub struct Renderer {
    targets: RenderTargets<GpuTarget>,
    sampler_groups: Vec<wgpu::BindGroup>,
    shaders: ShaderRegistry,
    pipelines: PipelineCache,
    fallback: FallbackTexture,
    backbuffer: BackbufferDesc,
    backbuffer_depth: Option<GpuTarget>,
    stages: BoundStages,
    line_mode: bool,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        backbuffer: BackbufferDesc,
    ) -> Result<Self, GfxError> {
        let shaders = ShaderRegistry::new(device)?;
        let samplers = SamplerTable::new(device);
        let sampler_groups = SamplerState::ALL
            .iter()
            .map(|state| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("halton sampler bind group"),
                    layout: shaders.sampler_layout(),
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Sampler(samplers.get(*state)),
                    }],
                })
            })
            .collect();

        let line_mode = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let mut renderer = Self {
            targets: RenderTargets::new(),
            sampler_groups,
            shaders,
            pipelines: PipelineCache::new(),
            fallback: FallbackTexture::new(device, queue),
            backbuffer,
            backbuffer_depth: None,
            stages: BoundStages::default(),
            line_mode,
        };
        renderer.create_backbuffer_depth(device)?;
        Ok(renderer)
    }

    fn create_backbuffer_depth(&mut self, device: &wgpu::Device) -> Result<(), GfxError> {
        self.backbuffer_depth = None;
        if !self.backbuffer.is_empty() {
            self.backbuffer_depth = Some(GpuTarget::new(
                device,
                TargetKind::Depth,
                self.backbuffer.width,
                self.backbuffer.height,
            )?);
        }
        Ok(())
    }

    /// Creates a render target. Color targets follow back-buffer resizes.
    pub fn create_target(
        &mut self,
        device: &wgpu::Device,
        kind: TargetKind,
        width: u32,
        height: u32,
    ) -> Result<TargetHandle, GfxError> {
        self.targets.create(&mut DeviceAllocator(device), kind, width, height)
    }

    pub fn targets(&self) -> &RenderTargets<GpuTarget> {
        &self.targets
    }

    /// Drops everything sized to the swapchain. Handles stay valid.
    pub fn releasing_swapchain(&mut self) {
        self.targets.release();
        self.backbuffer_depth = None;
    }

    /// Recreates every color target and the back-buffer depth at the new size.
    pub fn resized_swapchain(
        &mut self,
        device: &wgpu::Device,
        backbuffer: BackbufferDesc,
    ) -> Result<(), GfxError> {
        self.backbuffer = backbuffer;
        self.targets
            .resize(&mut DeviceAllocator(device), backbuffer.width, backbuffer.height)?;
        self.create_backbuffer_depth(device)
    }

    pub fn backbuffer(&self) -> BackbufferDesc {
        self.backbuffer
    }

    /// Pixel-space to clip-space matrix for the current back buffer.
    pub fn screen_proj_matrix(&self) -> Mat4 {
        screen_projection(self.backbuffer.width, self.backbuffer.height)
    }

    /// Starts recording a frame into `encoder`.
    ///
    /// Constant rings rewind and the output binding points back at the back
    /// buffer. Bound stages and states carry over from the previous frame.
    pub fn begin<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
        backbuffer_view: &'a wgpu::TextureView,
    ) -> Context<'a> {
        self.shaders.reset_frame();
        self.targets.reset_binding();
        Context {
            renderer: self,
            device,
            queue,
            encoder,
            backbuffer_view,
            pending: PendingClears::default(),
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
struct PendingClears {
    color: Option<wgpu::Color>,
    depth: Option<f32>,
}

impl PendingClears {
    fn is_empty(&self) -> bool {
        self.color.is_none() && self.depth.is_none()
    }
}

/// One draw's worth of buffers, handed from a mesh to [`Context::draw_geometry`].
pub(crate) struct Geometry<'m> {
    pub vertex_kind: VertexKind,
    pub vertex_buffer: &'m wgpu::Buffer,
    pub index_buffer: &'m wgpu::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub indices: Range<u32>,
    pub base_vertex: i32,
    pub textures: Option<&'m TextureSlots<TargetHandle>>,
}

struct Outputs<'r> {
    color: &'r wgpu::TextureView,
    color_format: wgpu::TextureFormat,
    depth: Option<&'r wgpu::TextureView>,
}

fn resolve_outputs<'r>(
    renderer: &'r Renderer,
    backbuffer_view: &'r wgpu::TextureView,
) -> Result<Outputs<'r>, GfxError> {
    let binding = renderer.targets.binding();

    let (color, color_format, color_size) = match binding.color {
        Output::Backbuffer => (
            backbuffer_view,
            renderer.backbuffer.format,
            (renderer.backbuffer.width, renderer.backbuffer.height),
        ),
        Output::Target(handle) => {
            let target = renderer.targets.get(handle)?;
            (target.attachment_view(), target.format(), target.size())
        }
    };

    let depth_target = match binding.depth {
        None => None,
        Some(Output::Backbuffer) => renderer.backbuffer_depth.as_ref(),
        Some(Output::Target(handle)) => Some(renderer.targets.get(handle)?),
    };
    let depth = match depth_target {
        Some(target) if target.size() != color_size => {
            log::warn!(
                "depth output {:?} does not match color output {:?}; depth detached",
                target.size(),
                color_size
            );
            None
        }
        Some(target) => Some(target.attachment_view()),
        None => None,
    };

    Ok(Outputs {
        color,
        color_format,
        depth,
    })
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    outputs: &Outputs<'_>,
    pending: PendingClears,
) -> wgpu::RenderPass<'e> {
    let color_load = match pending.color {
        Some(color) => wgpu::LoadOp::Clear(color),
        None => wgpu::LoadOp::Load,
    };

    let depth_stencil_attachment = outputs.depth.map(|view| {
        let (depth_load, stencil_load) = match pending.depth {
            Some(depth) => (wgpu::LoadOp::Clear(depth), wgpu::LoadOp::Clear(0)),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };
        wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: Some(wgpu::Operations {
                load: stencil_load,
                store: wgpu::StoreOp::Store,
            }),
        }
    });

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("halton pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: outputs.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

/// Per-frame recording context.
///
/// Clears are deferred until the next draw or binding change and folded into
/// that pass's load operations. Dropping the context flushes any that remain.
pub struct Context<'a> {
    renderer: &'a mut Renderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    backbuffer_view: &'a wgpu::TextureView,
    pending: PendingClears,
}

impl<'a> Context<'a> {
    pub fn device(&self) -> &'a wgpu::Device {
        self.device
    }

    pub fn queue(&self) -> &'a wgpu::Queue {
        self.queue
    }

    pub fn backbuffer(&self) -> BackbufferDesc {
        self.renderer.backbuffer
    }

    pub fn screen_proj_matrix(&self) -> Mat4 {
        self.renderer.screen_proj_matrix()
    }

    // ── outputs ──────────────────────────────────────────────────────────

    /// Binds a color target as color output or a depth target as depth output.
    pub fn set_render_target(&mut self, handle: TargetHandle) -> Result<(), GfxError> {
        self.flush()?;
        self.renderer.targets.bind(handle)
    }

    pub fn unbind_depth(&mut self) -> Result<(), GfxError> {
        self.flush()?;
        self.renderer.targets.unbind_depth();
        Ok(())
    }

    pub fn push_render_target(&mut self) {
        self.renderer.targets.push_default();
    }

    pub fn pop_render_target(&mut self) -> Result<(), GfxError> {
        self.flush()?;
        self.renderer.targets.pop_default();
        Ok(())
    }

    /// Clears the bound color output to a packed `0xAARRGGBB` color.
    pub fn clear(&mut self, argb: u32) {
        let [r, g, b, a] = unpack_argb(argb);
        self.pending.color = Some(wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        });
    }

    pub fn clear_depth(&mut self, depth: f32) {
        if self.renderer.targets.binding().depth.is_none() {
            log::warn!("clear_depth with no depth output bound; ignored");
            return;
        }
        self.pending.depth = Some(depth);
    }

    // ── stages and states ────────────────────────────────────────────────

    pub fn set_vs(&mut self, vs: VsId) {
        self.renderer.stages.vs = Some(vs);
    }

    pub fn set_hs(&mut self, hs: HsId) {
        self.renderer.stages.hs = Some(hs);
    }

    pub fn set_ds(&mut self, ds: DsId) {
        self.renderer.stages.ds = Some(ds);
    }

    pub fn set_ps(&mut self, ps: PsId) {
        self.renderer.stages.ps = Some(ps);
    }

    pub fn disable_vs(&mut self) {
        self.renderer.stages.vs = None;
    }

    pub fn disable_hs(&mut self) {
        self.renderer.stages.hs = None;
    }

    pub fn disable_ds(&mut self) {
        self.renderer.stages.ds = None;
    }

    pub fn disable_ps(&mut self) {
        self.renderer.stages.ps = None;
    }

    pub fn set_raster_state(&mut self, state: RasterState) {
        self.renderer.stages.raster = state;
    }

    pub fn set_sampler_state(&mut self, state: SamplerState) {
        self.renderer.stages.sampler = state;
    }

    pub fn set_depth_state(&mut self, state: DepthState) {
        self.renderer.stages.depth = state;
    }

    /// Bound hull and domain variants, when both are set.
    pub fn tessellation(&self) -> Option<(HsId, DsId)> {
        Some((self.renderer.stages.hs?, self.renderer.stages.ds?))
    }

    // ── constants ────────────────────────────────────────────────────────

    /// Reserves a constant slot for the bound vertex shader and returns a
    /// zeroed block to fill. The block is uploaded when the guard drops and
    /// is used by every draw until the next mapping.
    pub fn map_constants<T: ConstantBlock>(&mut self) -> Result<Constants<'_, T>, GfxError> {
        let bound = self.renderer.stages.vs.ok_or(GfxError::NoVertexShader)?;
        if bound != T::VARIANT {
            return Err(GfxError::ConstantsMismatch {
                bound,
                requested: T::VARIANT,
            });
        }

        let (buffer, offset) = self.renderer.shaders.acquire_constants(self.device, bound);
        Ok(Constants {
            queue: self.queue,
            buffer: buffer.clone(),
            offset: offset as u64,
            value: T::zeroed(),
        })
    }

    // ── draws ────────────────────────────────────────────────────────────

    pub fn draw(&mut self, mesh: &mut Mesh) -> Result<(), GfxError> {
        mesh.draw(self)
    }

    pub(crate) fn draw_geometry(&mut self, geometry: Geometry<'_>) -> Result<(), GfxError> {
        let stages = self.renderer.stages;
        let vs = stages.vs.ok_or(GfxError::NoVertexShader)?;
        let Some(ps) = stages.ps else {
            log::warn!("draw with no pixel shader bound; skipped");
            return Ok(());
        };
        if geometry.vertex_kind != vs.vertex_kind() {
            return Err(GfxError::MeshLayout(format!(
                "{vs:?} expects {:?} vertices, mesh supplies {:?}",
                vs.vertex_kind(),
                geometry.vertex_kind
            )));
        }

        let (color_format, depth_format) = {
            let outputs = resolve_outputs(self.renderer, self.backbuffer_view)?;
            (
                outputs.color_format,
                outputs.depth.map(|_| DEPTH_FORMAT),
            )
        };

        let renderer = &mut *self.renderer;
        let pipeline = renderer
            .pipelines
            .get_or_create(
                self.device,
                &renderer.shaders,
                renderer.line_mode,
                PipelineKey {
                    vs,
                    ps,
                    raster: stages.raster,
                    depth: stages.depth,
                    color_format,
                    depth_format,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                },
            )
            .clone();

        let constants = renderer.shaders.constants(vs);
        let constants_offset = constants.ring.mapped_offset(vs)?;
        let constants_group = constants.bind_group.clone();

        let texture_group = self.texture_bind_group(ps, geometry.textures);
        let sampler_group = self.renderer.sampler_groups[stages.sampler as usize].clone();

        let outputs = resolve_outputs(self.renderer, self.backbuffer_view)?;
        let pending = std::mem::take(&mut self.pending);
        let mut pass = begin_pass(self.encoder, &outputs, pending);
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &constants_group, &[constants_offset]);
        pass.set_bind_group(1, &texture_group, &[]);
        pass.set_bind_group(2, &sampler_group, &[]);
        pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        pass.set_index_buffer(geometry.index_buffer.slice(..), geometry.index_format);
        pass.draw_indexed(geometry.indices, geometry.base_vertex, 0..1);
        Ok(())
    }

    /// Builds group 1 for `ps`. Slots that are empty, released, depth, or
    /// currently bound as color output sample the fallback texture instead.
    fn texture_bind_group(
        &self,
        ps: PsId,
        textures: Option<&TextureSlots<TargetHandle>>,
    ) -> wgpu::BindGroup {
        let renderer = &*self.renderer;
        let color_output = renderer.targets.binding().color;

        let views: Vec<&wgpu::TextureView> = (0..ps.texture_count() as usize)
            .map(|slot| {
                let Some(handle) = textures.and_then(|t| t.get(slot)) else {
                    return renderer.fallback.view();
                };
                if color_output == Output::Target(handle) {
                    log::warn!("{handle:?} is the bound color output; slot {slot} unbound");
                    return renderer.fallback.view();
                }
                match renderer.targets.get(handle) {
                    Ok(target) if target.kind().is_color() => target.sample_view(),
                    Ok(_) => {
                        log::warn!("{handle:?} is a depth target; slot {slot} unbound");
                        renderer.fallback.view()
                    }
                    Err(err) => {
                        log::warn!("slot {slot}: {err}");
                        renderer.fallback.view()
                    }
                }
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry<'_>> = views
            .into_iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("halton texture bind group"),
            layout: renderer.shaders.texture_layout(ps),
            entries: &entries,
        })
    }

    /// Records pending clears as an empty pass on the current outputs.
    fn flush(&mut self) -> Result<(), GfxError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let outputs = resolve_outputs(self.renderer, self.backbuffer_view)?;
        let pending = std::mem::take(&mut self.pending);
        drop(begin_pass(self.encoder, &outputs, pending));
        Ok(())
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("dropping pending clears: {err}");
        }
    }
}

/// Mapped constant block; uploaded to its slot on drop.
pub struct Constants<'c, T: ConstantBlock> {
    queue: &'c wgpu::Queue,
    buffer: wgpu::Buffer,
    offset: u64,
    value: T,
}

impl<T: ConstantBlock> Deref for Constants<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ConstantBlock> DerefMut for Constants<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: ConstantBlock> Drop for Constants<'_, T> {
    fn drop(&mut self) {
        self.queue
            .write_buffer(&self.buffer, self.offset, bytemuck::bytes_of(&self.value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn screen_projection_maps_corners() {
        let m = screen_projection(800, 600);
        let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = m * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn screen_projection_centre_is_origin() {
        let c = screen_projection(1280, 720) * Vec4::new(640.0, 360.0, 0.5, 1.0);
        assert!(c.x.abs() < 1e-6 && c.y.abs() < 1e-6);
        assert_eq!(c.z, 0.5);
    }

    #[test]
    fn full_screen_quad_covers_clip_space() {
        let m = screen_projection(640, 480) * Mat4::from_scale(Vec3::new(640.0, 480.0, 1.0));
        let far = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((far.x - 1.0).abs() < 1e-6 && (far.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn pending_clears_start_empty() {
        let mut pending = PendingClears::default();
        assert!(pending.is_empty());
        pending.depth = Some(1.0);
        assert!(!pending.is_empty());
    }
}
