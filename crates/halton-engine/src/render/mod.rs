//! Back-buffer overlay rendering for the HUD.
//!
//! Geometry is in back-buffer pixels with a top-left origin; the overlay
//! shader maps it to clip space from a viewport uniform.

mod atlas;
mod ctx;
mod overlay;

pub use ctx::{RenderCtx, RenderTarget};
pub use overlay::OverlayRenderer;
