//! Drawable meshes: a closed set of variants behind one capability trait.

use std::ops::Range;
use std::path::PathBuf;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use super::bezier::{tessellate, BezierPatch, Partition};
use super::error::GfxError;
use super::import::{load_gltf, IndexRange};
use super::renderer::{Context, Geometry};
use super::shader::{DsId, VsId};
use super::target::TargetHandle;
use super::vertex::VertexKind;

/// Texture slots a triangle-list mesh can bind per draw.
pub const TEXTURE_SLOTS: usize = 8;

/// Capability interface shared by every mesh variant.
pub trait MeshOps {
    /// Creates GPU buffers. Calling it again replaces them.
    fn initialize(&mut self, device: &wgpu::Device) -> Result<(), GfxError>;

    fn draw(&mut self, ctx: &mut Context<'_>) -> Result<(), GfxError>;

    /// Releases GPU buffers; the mesh can be initialized again.
    fn destroy(&mut self);

    /// Binds a render target into a texture slot for the next draw.
    /// Variants without texture slots ignore it.
    fn bind_texture(&mut self, slot: usize, texture: Option<TargetHandle>) {
        let _ = (slot, texture);
    }
}

/// Per-draw texture bindings.
///
/// Tracks a high-water mark like a shader-resource slot range: everything
/// below `count` is rebound on draw, and `clear` empties the whole range.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlots<T> {
    slots: [Option<T>; TEXTURE_SLOTS],
    count: usize,
}

impl<T> Default for TextureSlots<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            count: 0,
        }
    }
}

impl<T: Copy> TextureSlots<T> {
    /// Returns `false` when `slot` is out of range.
    pub fn bind(&mut self, slot: usize, texture: Option<T>) -> bool {
        let Some(entry) = self.slots.get_mut(slot) else {
            log::warn!("texture slot {slot} out of range (max {TEXTURE_SLOTS})");
            return false;
        };
        *entry = texture;
        self.count = self.count.max(slot + 1);
        true
    }

    pub fn get(&self, slot: usize) -> Option<T> {
        if slot >= self.count {
            return None;
        }
        self.slots.get(slot).copied().flatten()
    }

    /// Number of slots in the bound range.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn clear(&mut self) {
        self.slots = std::array::from_fn(|_| None);
        self.count = 0;
    }

    /// Runs `draw` against the bound slots, then clears them whatever it
    /// returned.
    pub fn draw_once<R>(&mut self, draw: impl FnOnce(&Self) -> R) -> R {
        let result = draw(self);
        self.clear();
        result
    }
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, label: &str, vertices: &[u8], indices: &[u8]) -> Result<Self, GfxError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(GfxError::ResourceCreation(format!("{label}: empty geometry")));
        }

        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        // Index buffer sizes must be 4-byte aligned.
        let mut index_bytes = indices.to_vec();
        index_bytes.resize(indices.len().next_multiple_of(4), 0);
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(Self { vertex, index })
    }
}

// ── procedural patch ─────────────────────────────────────────────────────

/// Bicubic patches tessellated on the CPU by the bound hull/domain variants.
pub struct PatchMesh {
    patches: Vec<BezierPatch>,
    tess_factor: f32,
    tessellated: Option<(Partition, u32)>,
    buffers: Option<MeshBuffers>,
    index_count: u32,
}

impl PatchMesh {
    pub fn new(patches: Vec<BezierPatch>) -> Self {
        Self {
            patches,
            tess_factor: 8.0,
            tessellated: None,
            buffers: None,
            index_count: 0,
        }
    }

    pub fn control_point_count(&self) -> usize {
        self.patches.len() * 16
    }

    pub fn set_tess_factor(&mut self, factor: f32) {
        self.tess_factor = factor;
    }

    pub fn tess_factor(&self) -> f32 {
        self.tess_factor
    }

    fn rebuild(&mut self, device: &wgpu::Device, partition: Partition) -> Result<(), GfxError> {
        let segments = partition.segments(self.tess_factor);
        if self.buffers.is_some() && self.tessellated == Some((partition, segments)) {
            return Ok(());
        }

        let (vertices, indices) = tessellate(&self.patches, segments);
        self.buffers = Some(MeshBuffers::new(
            device,
            "halton patch mesh",
            bytemuck::cast_slice(&vertices),
            bytemuck::cast_slice(&indices),
        )?);
        self.index_count = indices.len() as u32;
        self.tessellated = Some((partition, segments));
        log::debug!("patch mesh tessellated: {partition:?}, {segments} segments");
        Ok(())
    }
}

impl MeshOps for PatchMesh {
    fn initialize(&mut self, device: &wgpu::Device) -> Result<(), GfxError> {
        self.tessellated = None;
        self.rebuild(device, Partition::Integer)
    }

    fn draw(&mut self, ctx: &mut Context<'_>) -> Result<(), GfxError> {
        let Some((hs, ds)) = ctx.tessellation() else {
            log::warn!("patch mesh drawn without hull and domain stages; skipped");
            return Ok(());
        };
        match ds {
            DsId::Bezier => self.rebuild(ctx.device(), hs.partition())?,
        }

        let Some(buffers) = &self.buffers else {
            return Err(GfxError::ResourceCreation("patch mesh not initialized".into()));
        };
        ctx.draw_geometry(Geometry {
            vertex_kind: VertexKind::Scene,
            vertex_buffer: &buffers.vertex,
            index_buffer: &buffers.index,
            index_format: wgpu::IndexFormat::Uint32,
            indices: 0..self.index_count,
            base_vertex: 0,
            textures: None,
        })
    }

    fn destroy(&mut self) {
        self.buffers = None;
        self.tessellated = None;
    }
}

// ── imported ─────────────────────────────────────────────────────────────

/// Static mesh loaded from a glTF file, drawn as one index range per primitive.
pub struct ImportedMesh {
    path: PathBuf,
    buffers: Option<MeshBuffers>,
    ranges: Vec<IndexRange>,
}

impl ImportedMesh {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffers: None,
            ranges: Vec::new(),
        }
    }

    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }
}

impl MeshOps for ImportedMesh {
    fn initialize(&mut self, device: &wgpu::Device) -> Result<(), GfxError> {
        let data = load_gltf(&self.path)?;
        if data.is_empty() {
            return Err(GfxError::MeshLayout(format!(
                "{} has no triangle primitives",
                self.path.display()
            )));
        }
        self.buffers = Some(MeshBuffers::new(
            device,
            "halton imported mesh",
            bytemuck::cast_slice(&data.vertices),
            bytemuck::cast_slice(&data.indices),
        )?);
        self.ranges = data.ranges;
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context<'_>) -> Result<(), GfxError> {
        let Some(buffers) = &self.buffers else {
            return Err(GfxError::ResourceCreation(format!(
                "{} not initialized",
                self.path.display()
            )));
        };

        for range in &self.ranges {
            ctx.draw_geometry(Geometry {
                vertex_kind: VertexKind::Scene,
                vertex_buffer: &buffers.vertex,
                index_buffer: &buffers.index,
                index_format: wgpu::IndexFormat::Uint32,
                indices: range.first_index..range.first_index + range.index_count,
                base_vertex: range.base_vertex,
                textures: None,
            })?;
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.buffers = None;
        self.ranges.clear();
    }
}

// ── triangle list ────────────────────────────────────────────────────────

/// Caller-supplied vertices and 16-bit indices with up to eight texture slots.
///
/// Slots are cleared after every draw; rebind them before each one.
pub struct TriangleListMesh {
    vs: VsId,
    vertices: Vec<u8>,
    indices: Vec<u16>,
    buffers: Option<MeshBuffers>,
    textures: TextureSlots<TargetHandle>,
}

impl TriangleListMesh {
    /// `V` must match the vertex layout of `vs`.
    pub fn new<V: Pod>(vs: VsId, vertices: &[V], indices: &[u16]) -> Result<Self, GfxError> {
        let expected = vs.vertex_kind().stride();
        if std::mem::size_of::<V>() != expected {
            return Err(GfxError::MeshLayout(format!(
                "{vs:?} expects {expected}-byte vertices, got {}",
                std::mem::size_of::<V>()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GfxError::MeshLayout(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        Ok(Self {
            vs,
            vertices: bytemuck::cast_slice(vertices).to_vec(),
            indices: indices.to_vec(),
            buffers: None,
            textures: TextureSlots::default(),
        })
    }

    pub fn textures(&self) -> &TextureSlots<TargetHandle> {
        &self.textures
    }

    fn index_range(&self) -> Range<u32> {
        0..self.indices.len() as u32
    }
}

impl MeshOps for TriangleListMesh {
    fn initialize(&mut self, device: &wgpu::Device) -> Result<(), GfxError> {
        self.buffers = Some(MeshBuffers::new(
            device,
            "halton triangle list",
            &self.vertices,
            bytemuck::cast_slice(&self.indices),
        )?);
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context<'_>) -> Result<(), GfxError> {
        let vertex_kind = self.vs.vertex_kind();
        let indices = self.index_range();
        let buffers = self.buffers.as_ref();
        // Stale bindings must never leak into the next draw.
        self.textures.draw_once(|textures| match buffers {
            Some(buffers) => ctx.draw_geometry(Geometry {
                vertex_kind,
                vertex_buffer: &buffers.vertex,
                index_buffer: &buffers.index,
                index_format: wgpu::IndexFormat::Uint16,
                indices,
                base_vertex: 0,
                textures: Some(textures),
            }),
            None => Err(GfxError::ResourceCreation("triangle list not initialized".into())),
        })
    }

    fn destroy(&mut self) {
        self.buffers = None;
        self.textures.clear();
    }

    fn bind_texture(&mut self, slot: usize, texture: Option<TargetHandle>) {
        self.textures.bind(slot, texture);
    }
}

// ── dispatch ─────────────────────────────────────────────────────────────

pub enum Mesh {
    Patch(PatchMesh),
    Imported(ImportedMesh),
    TriangleList(TriangleListMesh),
}

impl Mesh {
    /// Initializes the mesh and returns it ready to draw.
    pub fn initialized(mut self, device: &wgpu::Device) -> Result<Self, GfxError> {
        self.initialize(device)?;
        Ok(self)
    }

    fn ops(&mut self) -> &mut dyn MeshOps {
        match self {
            Mesh::Patch(m) => m,
            Mesh::Imported(m) => m,
            Mesh::TriangleList(m) => m,
        }
    }
}

impl MeshOps for Mesh {
    fn initialize(&mut self, device: &wgpu::Device) -> Result<(), GfxError> {
        self.ops().initialize(device)
    }

    fn draw(&mut self, ctx: &mut Context<'_>) -> Result<(), GfxError> {
        self.ops().draw(ctx)
    }

    fn destroy(&mut self) {
        self.ops().destroy()
    }

    fn bind_texture(&mut self, slot: usize, texture: Option<TargetHandle>) {
        self.ops().bind_texture(slot, texture)
    }
}

impl From<PatchMesh> for Mesh {
    fn from(m: PatchMesh) -> Self {
        Mesh::Patch(m)
    }
}

impl From<ImportedMesh> for Mesh {
    fn from(m: ImportedMesh) -> Self {
        Mesh::Imported(m)
    }
}

impl From<TriangleListMesh> for Mesh {
    fn from(m: TriangleListMesh) -> Self {
        Mesh::TriangleList(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::vertex::{DecalVertex, SceneVertex};

    // ── texture slots ────────────────────────────────────────────────────

    #[test]
    fn binding_extends_the_range() {
        let mut slots = TextureSlots::<u32>::default();
        assert!(slots.bind(2, Some(7)));
        assert_eq!(slots.count(), 3);
        assert_eq!(slots.get(0), None);
        assert_eq!(slots.get(2), Some(7));
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut slots = TextureSlots::<u32>::default();
        assert!(!slots.bind(TEXTURE_SLOTS, Some(1)));
        assert_eq!(slots.count(), 0);
    }

    #[test]
    fn cleared_slots_do_not_leak_into_smaller_binds() {
        let mut slots = TextureSlots::<u32>::default();
        slots.bind(0, Some(1));
        slots.bind(1, Some(2));
        slots.bind(5, Some(3));
        slots.clear();

        slots.bind(0, Some(9));
        assert_eq!(slots.count(), 1);
        for i in 1..TEXTURE_SLOTS {
            assert_eq!(slots.get(i), None);
        }
    }

    #[test]
    fn slots_are_cleared_after_a_draw_even_when_it_fails() {
        let mut slots = TextureSlots::<u32>::default();
        slots.bind(0, Some(1));
        slots.bind(6, Some(2));

        let result: Result<(), GfxError> = slots.draw_once(|bound| {
            assert_eq!(bound.count(), 7);
            assert_eq!(bound.get(6), Some(2));
            Err(GfxError::NoVertexShader)
        });
        assert!(result.is_err());
        assert_eq!(slots.count(), 0);

        // A later draw with one texture sees nothing from the wider one.
        slots.bind(0, Some(9));
        let seen = slots.draw_once(|bound| (0..TEXTURE_SLOTS).filter_map(|i| bound.get(i)).collect::<Vec<_>>());
        assert_eq!(seen, vec![9]);
        assert_eq!(slots.count(), 0);
    }

    #[test]
    fn unbinding_keeps_the_range() {
        let mut slots = TextureSlots::<u32>::default();
        slots.bind(1, Some(4));
        slots.bind(1, None);
        assert_eq!(slots.count(), 2);
        assert_eq!(slots.get(1), None);
    }

    // ── triangle list validation ─────────────────────────────────────────

    fn quad() -> [DecalVertex; 4] {
        [
            DecalVertex { position: [0.0, 0.0, 0.0], uv: [0.0, 0.0] },
            DecalVertex { position: [1.0, 0.0, 0.0], uv: [1.0, 0.0] },
            DecalVertex { position: [0.0, 1.0, 0.0], uv: [0.0, 1.0] },
            DecalVertex { position: [1.0, 1.0, 0.0], uv: [1.0, 1.0] },
        ]
    }

    #[test]
    fn triangle_list_accepts_matching_layout() {
        let mesh = TriangleListMesh::new(VsId::Decal, &quad(), &[0, 1, 2, 1, 3, 2]).unwrap();
        assert_eq!(mesh.index_range(), 0..6);
        assert_eq!(mesh.textures().count(), 0);
    }

    #[test]
    fn triangle_list_rejects_wrong_stride() {
        let err = TriangleListMesh::new(VsId::Scene, &quad(), &[0, 1, 2]).err();
        assert!(matches!(err, Some(GfxError::MeshLayout(_))));
    }

    #[test]
    fn triangle_list_rejects_out_of_range_index() {
        let v = [SceneVertex { position: [0.0; 3], normal: [0.0; 3], uv: [0.0; 2] }];
        let err = TriangleListMesh::new(VsId::Scene, &v, &[0, 1]).err();
        assert!(matches!(err, Some(GfxError::MeshLayout(_))));
    }

    #[test]
    fn bind_texture_dispatches_to_triangle_lists() {
        let mut mesh = Mesh::from(TriangleListMesh::new(VsId::Decal, &quad(), &[0, 1, 2]).unwrap());
        mesh.bind_texture(1, None);
        let Mesh::TriangleList(inner) = &mesh else {
            panic!("variant changed");
        };
        assert_eq!(inner.textures().count(), 2);
    }

    #[test]
    fn patch_mesh_counts_control_points() {
        let mesh = PatchMesh::new(crate::gfx::bezier::mobius_strip());
        assert_eq!(mesh.control_point_count(), 64);
    }
}
