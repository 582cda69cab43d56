//! wgpu instance, device and swapchain for the demo window.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::{BackbufferDesc, SurfaceErrorAction};
