use crate::device::BackbufferDesc;

/// Device handles and back-buffer description for one frame's draw calls.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub backbuffer: BackbufferDesc,
}

/// The frame's command encoder and the acquired back-buffer view.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}
