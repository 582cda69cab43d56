//! Frame timing.
//!
//! One `FrameClock` drives the render loop; `tick()` is called once per
//! presented frame and yields a `FrameTime` for frame-move callbacks.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
