//! Application-facing contracts.
//!
//! Defines the lifecycle the runtime drives (device created, swapchain
//! resized/releasing, device destroyed, input, frame move, frame) and the
//! contexts handed to each callback.

mod app;
mod ctx;

pub use app::{App, AppControl, InputResponse};
pub use ctx::{DeviceCtx, FrameCtx};
