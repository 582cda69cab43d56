//! Shader program variants and per-variant constant buffers.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use super::bezier::Partition;
use super::error::GfxError;
use super::vertex::VertexKind;

/// Vertex shader variants. Each owns one constant buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VsId {
    Scene,
    Decal,
    Shadow,
    Bezier,
    Taa,
}

impl VsId {
    pub const ALL: [VsId; 5] = [VsId::Scene, VsId::Decal, VsId::Shadow, VsId::Bezier, VsId::Taa];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn vertex_kind(self) -> VertexKind {
        match self {
            VsId::Scene | VsId::Shadow | VsId::Bezier => VertexKind::Scene,
            VsId::Decal | VsId::Taa => VertexKind::Decal,
        }
    }

    /// Size of this variant's constant block in bytes.
    pub const fn constants_size(self) -> u64 {
        let size = match self {
            VsId::Scene => std::mem::size_of::<SceneConstants>(),
            VsId::Decal => std::mem::size_of::<DecalConstants>(),
            VsId::Shadow => std::mem::size_of::<ShadowConstants>(),
            VsId::Bezier => std::mem::size_of::<BezierConstants>(),
            VsId::Taa => std::mem::size_of::<TaaConstants>(),
        };
        size as u64
    }

    const fn source(self) -> ShaderSource {
        match self {
            VsId::Scene => ShaderSource::Scene,
            VsId::Decal => ShaderSource::Decal,
            VsId::Shadow => ShaderSource::Shadow,
            VsId::Bezier => ShaderSource::Bezier,
            VsId::Taa => ShaderSource::Taa,
        }
    }
}

/// Hull shader variants; each selects a tessellation partition rule.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HsId {
    Integer,
    FracEven,
    FracOdd,
}

impl HsId {
    pub const fn partition(self) -> Partition {
        match self {
            HsId::Integer => Partition::Integer,
            HsId::FracEven => Partition::FractionalEven,
            HsId::FracOdd => Partition::FractionalOdd,
        }
    }
}

/// Domain shader variants; each selects a patch evaluator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DsId {
    Bezier,
}

/// Pixel shader variants.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PsId {
    Decal,
    SolidColor,
    Scene,
    Shadow,
    Bezier,
    Taa,
}

impl PsId {
    pub const ALL: [PsId; 6] = [
        PsId::Decal,
        PsId::SolidColor,
        PsId::Scene,
        PsId::Shadow,
        PsId::Bezier,
        PsId::Taa,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of textures the shader samples (group 1, bindings `0..n`).
    pub const fn texture_count(self) -> u32 {
        match self {
            PsId::Decal => 1,
            PsId::Taa => 2,
            PsId::SolidColor | PsId::Scene | PsId::Shadow | PsId::Bezier => 0,
        }
    }

    const fn source(self) -> ShaderSource {
        match self {
            PsId::Decal => ShaderSource::Decal,
            PsId::SolidColor | PsId::Bezier => ShaderSource::Bezier,
            PsId::Scene => ShaderSource::Scene,
            PsId::Shadow => ShaderSource::Shadow,
            PsId::Taa => ShaderSource::Taa,
        }
    }

    pub(crate) const fn entry_point(self) -> &'static str {
        match self {
            PsId::SolidColor => "fs_solid",
            _ => "fs_main",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ShaderSource {
    Scene,
    Decal,
    Shadow,
    Bezier,
    Taa,
}

impl ShaderSource {
    const ALL: [ShaderSource; 5] = [
        ShaderSource::Scene,
        ShaderSource::Decal,
        ShaderSource::Shadow,
        ShaderSource::Bezier,
        ShaderSource::Taa,
    ];

    fn label(self) -> &'static str {
        match self {
            ShaderSource::Scene => "scene.wgsl",
            ShaderSource::Decal => "decal.wgsl",
            ShaderSource::Shadow => "shadow.wgsl",
            ShaderSource::Bezier => "bezier.wgsl",
            ShaderSource::Taa => "taa.wgsl",
        }
    }

    fn code(self) -> &'static str {
        match self {
            ShaderSource::Scene => include_str!("shaders/scene.wgsl"),
            ShaderSource::Decal => include_str!("shaders/decal.wgsl"),
            ShaderSource::Shadow => include_str!("shaders/shadow.wgsl"),
            ShaderSource::Bezier => include_str!("shaders/bezier.wgsl"),
            ShaderSource::Taa => include_str!("shaders/taa.wgsl"),
        }
    }
}

// ── constant blocks ──────────────────────────────────────────────────────

/// A plain-data constant block tied to one vertex shader variant.
pub trait ConstantBlock: Pod + Zeroable {
    const VARIANT: VsId;
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneConstants {
    pub view_proj: Mat4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DecalConstants {
    pub view_proj: Mat4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ShadowConstants {
    pub view_proj: Mat4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct BezierConstants {
    pub view_proj: Mat4,
    pub camera_pos: Vec3,
    pub tess_factor: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TaaConstants {
    pub view_proj: Mat4,
    pub inv_screen_size: Vec2,
    pub rate: f32,
    pub blur_size: f32,
}

impl ConstantBlock for SceneConstants {
    const VARIANT: VsId = VsId::Scene;
}
impl ConstantBlock for DecalConstants {
    const VARIANT: VsId = VsId::Decal;
}
impl ConstantBlock for ShadowConstants {
    const VARIANT: VsId = VsId::Shadow;
}
impl ConstantBlock for BezierConstants {
    const VARIANT: VsId = VsId::Bezier;
}
impl ConstantBlock for TaaConstants {
    const VARIANT: VsId = VsId::Taa;
}

// ── constant ring ────────────────────────────────────────────────────────

const INITIAL_SLOTS: u32 = 16;

/// Slot bookkeeping for a dynamic-offset constant buffer.
///
/// Every map within a frame takes the next slot so draws recorded earlier in
/// the frame keep their own values.
#[derive(Debug, Clone)]
pub(crate) struct SlotRing {
    stride: u64,
    capacity: u32,
    next: u32,
    last: Option<u32>,
}

impl SlotRing {
    pub(crate) fn new(block_size: u64, alignment: u64, capacity: u32) -> Self {
        let alignment = alignment.max(1);
        Self {
            stride: block_size.div_ceil(alignment) * alignment,
            capacity,
            next: 0,
            last: None,
        }
    }

    pub(crate) fn stride(&self) -> u64 {
        self.stride
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Takes the next slot; `true` in the second field means the ring had to
    /// double and the buffer must be reallocated.
    pub(crate) fn acquire(&mut self) -> (u32, bool) {
        let grew = self.next == self.capacity;
        if grew {
            self.capacity *= 2;
        }
        let offset = (self.next as u64 * self.stride) as u32;
        self.next += 1;
        self.last = Some(offset);
        (offset, grew)
    }

    /// Offset of the most recent map this frame, which a draw with `variant`
    /// bound reads from. Slots left over from an earlier frame are never reused.
    pub(crate) fn mapped_offset(&self, variant: VsId) -> Result<u32, GfxError> {
        self.last.ok_or(GfxError::ConstantsNotMapped(variant))
    }

    pub(crate) fn reset(&mut self) {
        self.next = 0;
        self.last = None;
    }

    pub(crate) fn buffer_size(&self) -> u64 {
        self.stride * self.capacity as u64
    }
}

pub(crate) struct ConstantBuffer {
    variant: VsId,
    block_size: NonZeroU64,
    pub(crate) ring: SlotRing,
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl ConstantBuffer {
    fn new(device: &wgpu::Device, variant: VsId, layout: &wgpu::BindGroupLayout) -> Result<Self, GfxError> {
        let block_size = NonZeroU64::new(variant.constants_size()).ok_or_else(|| {
            GfxError::ResourceCreation(format!("{variant:?} constant block is empty"))
        })?;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let ring = SlotRing::new(block_size.get(), alignment, INITIAL_SLOTS);
        let (buffer, bind_group) = Self::allocate(device, variant, layout, block_size, ring.buffer_size());

        Ok(Self {
            variant,
            block_size,
            ring,
            buffer,
            bind_group,
        })
    }

    fn allocate(
        device: &wgpu::Device,
        variant: VsId,
        layout: &wgpu::BindGroupLayout,
        block_size: NonZeroU64,
        size: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("halton constant buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("halton constants bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(block_size),
                }),
            }],
        });

        log::debug!("{variant:?} constant buffer: {size} bytes");
        (buffer, bind_group)
    }

    /// Reserves a slot and returns its byte offset.
    pub(crate) fn acquire(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> u32 {
        let (offset, grew) = self.ring.acquire();
        if grew {
            // Draws already recorded keep the old buffer alive through their bind group.
            let (buffer, bind_group) =
                Self::allocate(device, self.variant, layout, self.block_size, self.ring.buffer_size());
            self.buffer = buffer;
            self.bind_group = bind_group;
        }
        offset
    }
}

// ── registry ─────────────────────────────────────────────────────────────

/// Compiled shader modules, bind group layouts and constant buffers.
pub struct ShaderRegistry {
    /// Indexed by `ShaderSource as usize`.
    modules: Vec<wgpu::ShaderModule>,
    constants_layouts: Vec<wgpu::BindGroupLayout>,
    texture_layouts: Vec<wgpu::BindGroupLayout>,
    sampler_layout: wgpu::BindGroupLayout,
    constants: Vec<ConstantBuffer>,
}

impl ShaderRegistry {
    /// Compiles every variant. Any compile error is returned with its label.
    pub fn new(device: &wgpu::Device) -> Result<Self, GfxError> {
        let mut modules = Vec::with_capacity(ShaderSource::ALL.len());
        for source in ShaderSource::ALL {
            modules.push(compile(device, source)?);
        }

        let constants_layouts: Vec<_> = VsId::ALL
            .iter()
            .map(|vs| constants_layout(device, *vs))
            .collect();

        let texture_layouts: Vec<_> = PsId::ALL
            .iter()
            .map(|ps| texture_layout(device, ps.texture_count()))
            .collect();

        let sampler_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("halton sampler layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            }],
        });

        let mut constants = Vec::with_capacity(VsId::ALL.len());
        for vs in VsId::ALL {
            constants.push(ConstantBuffer::new(device, vs, &constants_layouts[vs.index()])?);
        }

        log::info!("compiled {} shader modules", modules.len());

        Ok(Self {
            modules,
            constants_layouts,
            texture_layouts,
            sampler_layout,
            constants,
        })
    }

    fn module(&self, source: ShaderSource) -> &wgpu::ShaderModule {
        &self.modules[source as usize]
    }

    pub(crate) fn vertex_module(&self, vs: VsId) -> &wgpu::ShaderModule {
        self.module(vs.source())
    }

    pub(crate) fn pixel_module(&self, ps: PsId) -> &wgpu::ShaderModule {
        self.module(ps.source())
    }

    pub(crate) fn constants_layout(&self, vs: VsId) -> &wgpu::BindGroupLayout {
        &self.constants_layouts[vs.index()]
    }

    pub(crate) fn texture_layout(&self, ps: PsId) -> &wgpu::BindGroupLayout {
        &self.texture_layouts[ps.index()]
    }

    pub(crate) fn sampler_layout(&self) -> &wgpu::BindGroupLayout {
        &self.sampler_layout
    }

    pub(crate) fn constants(&self, vs: VsId) -> &ConstantBuffer {
        &self.constants[vs.index()]
    }

    /// Reserves a constant slot for `vs`; returns the buffer and byte offset.
    pub(crate) fn acquire_constants(&mut self, device: &wgpu::Device, vs: VsId) -> (&wgpu::Buffer, u32) {
        let layout = &self.constants_layouts[vs.index()];
        let cb = &mut self.constants[vs.index()];
        let offset = cb.acquire(device, layout);
        (&cb.buffer, offset)
    }

    /// Starts a new frame: every variant's ring goes back to slot zero.
    pub(crate) fn reset_frame(&mut self) {
        for cb in &mut self.constants {
            cb.ring.reset();
        }
    }
}

fn compile(device: &wgpu::Device, source: ShaderSource) -> Result<wgpu::ShaderModule, GfxError> {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(source.label()),
        source: wgpu::ShaderSource::Wgsl(source.code().into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| m.message.clone())
        .collect();

    if !errors.is_empty() {
        let message = errors.join("\n");
        log::error!("{}: {message}", source.label());
        return Err(GfxError::ShaderCompile {
            label: source.label().to_string(),
            message,
        });
    }

    log::debug!("compiled {}", source.label());
    Ok(module)
}

fn constants_layout(device: &wgpu::Device, vs: VsId) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("halton constants layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(vs.constants_size()),
            },
            count: None,
        }],
    })
}

fn texture_layout(device: &wgpu::Device, count: u32) -> wgpu::BindGroupLayout {
    let entries: Vec<_> = (0..count)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("halton texture layout"),
        entries: &entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── constant blocks ──────────────────────────────────────────────────

    #[test]
    fn block_sizes_match_wgsl_layouts() {
        assert_eq!(VsId::Scene.constants_size(), 64);
        assert_eq!(VsId::Decal.constants_size(), 64);
        assert_eq!(VsId::Shadow.constants_size(), 64);
        assert_eq!(VsId::Bezier.constants_size(), 80);
        assert_eq!(VsId::Taa.constants_size(), 80);
    }

    #[test]
    fn blocks_name_their_variant() {
        assert_eq!(TaaConstants::VARIANT, VsId::Taa);
        assert_eq!(DecalConstants::VARIANT, VsId::Decal);
        assert_eq!(BezierConstants::VARIANT, VsId::Bezier);
    }

    #[test]
    fn variants_pick_vertex_layouts() {
        assert_eq!(VsId::Scene.vertex_kind(), VertexKind::Scene);
        assert_eq!(VsId::Bezier.vertex_kind(), VertexKind::Scene);
        assert_eq!(VsId::Taa.vertex_kind(), VertexKind::Decal);
        assert_eq!(PsId::Taa.texture_count(), 2);
        assert_eq!(PsId::Decal.texture_count(), 1);
        assert_eq!(PsId::SolidColor.entry_point(), "fs_solid");
    }

    #[test]
    fn hull_variants_select_partitions() {
        assert_eq!(HsId::Integer.partition(), Partition::Integer);
        assert_eq!(HsId::FracEven.partition(), Partition::FractionalEven);
        assert_eq!(HsId::FracOdd.partition(), Partition::FractionalOdd);
    }

    // ── slot ring ────────────────────────────────────────────────────────

    #[test]
    fn slots_are_aligned_and_sequential() {
        let mut ring = SlotRing::new(80, 256, 4);
        assert_eq!(ring.stride(), 256);
        assert_eq!(ring.acquire(), (0, false));
        assert_eq!(ring.acquire(), (256, false));
        assert_eq!(ring.mapped_offset(VsId::Scene).ok(), Some(256));
    }

    #[test]
    fn ring_doubles_when_full() {
        let mut ring = SlotRing::new(64, 256, 2);
        ring.acquire();
        ring.acquire();
        let (offset, grew) = ring.acquire();
        assert!(grew);
        assert_eq!(offset, 512);
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.buffer_size(), 1024);
    }

    #[test]
    fn reset_starts_the_frame_over() {
        let mut ring = SlotRing::new(64, 256, 2);
        ring.acquire();
        ring.reset();
        assert!(ring.mapped_offset(VsId::Decal).is_err());
        assert_eq!(ring.acquire(), (0, false));
    }

    #[test]
    fn draw_without_a_map_this_frame_is_an_error() {
        let mut ring = SlotRing::new(64, 256, 2);
        ring.acquire();
        ring.acquire();
        assert_eq!(ring.mapped_offset(VsId::Scene).ok(), Some(256));

        ring.reset();
        assert!(matches!(
            ring.mapped_offset(VsId::Scene),
            Err(GfxError::ConstantsNotMapped(VsId::Scene))
        ));
    }
}
