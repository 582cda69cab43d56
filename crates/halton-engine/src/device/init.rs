/// Device and swapchain creation options.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB back-buffer format when the surface offers one.
    pub prefer_srgb: bool,
    /// Initial present mode. Unsupported modes fall back to `Fifo`.
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    /// Device creation fails when any of these is missing.
    pub required_features: wgpu::Features,
    /// Enabled only where the adapter has them (wireframe, border sampling).
    pub optional_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub frame_latency: u32,
    /// Run on the software adapter, the "reference" device.
    pub force_fallback_adapter: bool,
}

impl GpuInit {
    /// Same options, targeting the other adapter kind.
    pub fn with_fallback(&self, fallback: bool) -> Self {
        Self { force_fallback_adapter: fallback, ..self.clone() }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER,
            required_limits: wgpu::Limits::default(),
            frame_latency: 2,
            force_fallback_adapter: false,
        }
    }
}
