//! Platform-agnostic input.
//!
//! The runtime translates winit window events into [`InputEvent`]s, folds
//! each into the window's [`InputState`] and then hands it to the app.

mod event;
mod state;

pub use event::{InputEvent, Key, Modifiers, MouseButton};
pub use state::InputState;
