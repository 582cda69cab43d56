//! The winit event loop and the single demo window.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
