//! HUD overlay commands.
//!
//! Widgets append fills and text runs to an [`OverlayList`]; the
//! [`crate::render::OverlayRenderer`] draws them over the back buffer in the
//! order they were recorded.

mod list;

pub use list::{OverlayCmd, OverlayList};
