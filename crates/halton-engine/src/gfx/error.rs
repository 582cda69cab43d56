use std::path::PathBuf;

use thiserror::Error;

use super::shader::VsId;
use super::target::TargetHandle;

/// Errors raised by the `gfx` layer.
///
/// Creation-time variants are fatal for the application; draw-time variants
/// are reported and the draw is skipped.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompile { label: String, message: String },

    #[error("resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("failed to load mesh {path}: {source}")]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("mesh layout mismatch: {0}")]
    MeshLayout(String),

    #[error("invalid or released render target {0:?}")]
    InvalidTarget(TargetHandle),

    #[error("constant block for {requested:?} mapped while {bound:?} is bound")]
    ConstantsMismatch { bound: VsId, requested: VsId },

    #[error("no vertex shader bound")]
    NoVertexShader,

    #[error("constants for {0:?} not mapped this frame")]
    ConstantsNotMapped(VsId),
}
