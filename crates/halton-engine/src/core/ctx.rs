use winit::window::Window;

use crate::device::{BackbufferDesc, Gpu, SurfaceErrorAction};
use crate::input::InputState;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Device handles passed to the device and swapchain lifecycle callbacks.
pub struct DeviceCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub adapter: wgpu::AdapterInfo,
    pub features: wgpu::Features,
    pub backbuffer: BackbufferDesc,
    pub present_mode: wgpu::PresentMode,
    /// Running on the software fallback adapter.
    pub fallback: bool,
}

impl<'a> DeviceCtx<'a> {
    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            adapter: gpu.adapter_info(),
            features: gpu.features(),
            backbuffer: gpu.backbuffer_desc(),
            present_mode: gpu.present_mode(),
            fallback: gpu.is_fallback(),
        }
    }
}

/// Per-frame context passed to [`crate::core::App::on_frame`].
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn backbuffer(&self) -> BackbufferDesc {
        self.gpu.backbuffer_desc()
    }

    /// Acquires the back buffer, calls `draw` with a [`RenderCtx`] and
    /// [`RenderTarget`], then submits and presents.
    ///
    /// The back buffer is not cleared; `draw` owns every pass. Surface errors
    /// skip the frame, except out-of-memory which returns `Exit`.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let desc = self.gpu.backbuffer_desc();
        if desc.is_empty() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(&err);
                log::debug!("frame acquisition failed: {err:?} -> {action:?}");
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface out of memory");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            backbuffer: desc,
        };

        {
            let mut target = RenderTarget { encoder: &mut frame.encoder, color_view: &frame.view };
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
