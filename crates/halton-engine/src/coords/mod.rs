//! Pixel geometry for the HUD: back-buffer pixels, origin top-left, +Y down.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
