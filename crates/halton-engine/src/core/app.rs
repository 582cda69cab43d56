use anyhow::Result;

use crate::input::{InputEvent, InputState};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::ctx::{DeviceCtx, FrameCtx};

/// Control directive returned by frame callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Whether an input event was consumed by the application.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputResponse {
    Handled,
    Ignored,
}

/// Application contract driven by [`crate::window::Runtime`].
///
/// Callbacks run on the event-loop thread and never overlap. Device and
/// swapchain callbacks are ordered as:
///
/// ```text
/// device_created -> swapchain_resized -> (frames) -> swapchain_releasing
///     -> swapchain_resized -> ... -> swapchain_releasing -> device_destroyed
/// ```
///
/// An `Err` from `on_device_created` or `on_swapchain_resized` is fatal.
pub trait App {
    /// Allocate device-lifetime resources (shaders, meshes, render targets).
    fn on_device_created(&mut self, device: &DeviceCtx<'_>) -> Result<()>;

    /// Recreate back-buffer-sized resources for `device.backbuffer`.
    fn on_swapchain_resized(&mut self, device: &DeviceCtx<'_>) -> Result<()>;

    /// Release back-buffer-sized resources.
    fn on_swapchain_releasing(&mut self) {}

    /// Release every GPU resource.
    fn on_device_destroyed(&mut self) {}

    /// One input event, after it was folded into `input`.
    fn on_input(
        &mut self,
        event: &InputEvent,
        input: &InputState,
        runtime: &mut RuntimeCtx,
    ) -> InputResponse {
        let _ = (event, input, runtime);
        InputResponse::Ignored
    }

    /// Per-frame simulation update, called before `on_frame`.
    fn on_frame_move(&mut self, time: &FrameTime) {
        let _ = time;
    }

    /// Render one frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
