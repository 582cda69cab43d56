use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::{self, BackbufferDesc, SurfaceErrorAction};
use super::GpuInit;

/// An acquired back buffer and the encoder recording into it.
///
/// Present it promptly: the surface hands out no other texture meanwhile.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Device, queue and configured surface for one window.
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Window size in physical pixels. May be zero while `config` keeps the last non-zero size.
    size: PhysicalSize<u32>,
    fallback: bool,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).context("failed to create wgpu surface")?;

        let fallback = init.force_fallback_adapter;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: fallback,
            })
            .await
            .with_context(|| match fallback {
                true => "no reference (software) adapter available",
                false => "no suitable GPU adapter",
            })?;

        let features = init.required_features | (init.optional_features & adapter.features());
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("halton device"),
                required_features: features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::pick_format(&caps.formats, init.prefer_srgb).context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface::pick_present_mode(&caps.present_modes, init.present_mode),
            alpha_mode: surface::pick_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.frame_latency,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        log::info!(
            "device created on {} ({:?}), reference={fallback}, features={features:?}",
            info.name,
            info.backend
        );

        Ok(Self { _instance: instance, surface, adapter, device, queue, config, size, fallback })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn features(&self) -> wgpu::Features {
        self.device.features()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        self.config.present_mode
    }

    pub fn backbuffer_desc(&self) -> BackbufferDesc {
        BackbufferDesc { width: self.size.width, height: self.size.height, format: self.config.format }
    }

    pub fn set_present_mode(&mut self, mode: wgpu::PresentMode) {
        let caps = self.surface.get_capabilities(&self.adapter);
        self.config.present_mode = surface::pick_present_mode(&caps.present_modes, mode);
        self.reconfigure();
    }

    /// A zero size is recorded but leaves the surface configured at its old size.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.reconfigure();
    }

    fn reconfigure(&self) {
        if self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("halton frame encoder"),
        });
        Ok(GpuFrame { surface_texture, view, encoder })
    }

    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit([frame.encoder.finish()]);
        frame.surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = surface::error_action(err);
        if action == SurfaceErrorAction::Reconfigured {
            self.reconfigure();
        }
        action
    }
}
