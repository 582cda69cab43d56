use bytemuck::{Pod, Zeroable};

/// Position, normal and texture coordinate; used by the scene, shadow and
/// Bézier vertex shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SceneVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Position and texture coordinate; used by the decal and TAA vertex shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DecalVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl DecalVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DecalVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex layout families. Each vertex shader variant consumes exactly one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexKind {
    Scene,
    Decal,
}

impl VertexKind {
    pub const fn stride(self) -> usize {
        match self {
            VertexKind::Scene => std::mem::size_of::<SceneVertex>(),
            VertexKind::Decal => std::mem::size_of::<DecalVertex>(),
        }
    }

    pub const fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            VertexKind::Scene => SceneVertex::layout(),
            VertexKind::Decal => DecalVertex::layout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_packed_attributes() {
        assert_eq!(VertexKind::Scene.stride(), 32);
        assert_eq!(VertexKind::Decal.stride(), 20);
        assert_eq!(VertexKind::Scene.buffer_layout().array_stride, 32);
        assert_eq!(VertexKind::Decal.buffer_layout().attributes.len(), 2);
    }
}
