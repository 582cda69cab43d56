//! Colour model shared between the HUD and the renderers.

pub mod color;

pub use color::{unpack_argb, Color};
