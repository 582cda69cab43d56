//! 3D rendering layer.
//!
//! A small immediate-style state machine over wgpu: callers bind shader
//! variants, fixed-function states and render targets, map a constant block,
//! then draw meshes. Pipelines are built lazily from the bound state.
//!
//! Conventions:
//! - Matrices are glam column-major and uploaded as-is; shaders compute
//!   `matrix * vector`.
//! - Group 0 holds the vertex shader's constants (dynamic offset), group 1
//!   the pixel shader's textures, group 2 the sampler.

pub mod bezier;
pub mod error;
pub mod import;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod resource;
pub mod shader;
pub mod state;
pub mod target;
pub mod vertex;

pub use error::GfxError;
pub use mesh::{ImportedMesh, Mesh, MeshOps, PatchMesh, TriangleListMesh, TEXTURE_SLOTS};
pub use renderer::{screen_projection, Constants, Context, Renderer};
pub use resource::{TargetKind, DEPTH_FORMAT, HDR_FORMAT};
pub use shader::{
    BezierConstants, ConstantBlock, DecalConstants, DsId, HsId, PsId, SceneConstants,
    ShadowConstants, TaaConstants, VsId,
};
pub use state::{DepthState, RasterState, SamplerState};
pub use target::TargetHandle;
pub use vertex::{DecalVertex, SceneVertex};
