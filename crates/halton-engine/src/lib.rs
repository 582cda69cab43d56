//! Halton engine crate.
//!
//! Platform, GPU runtime and rendering pieces shared by the demo and the HUD.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod gfx;
pub mod render;
pub mod paint;
pub mod overlay;
pub mod text;
