//! Halton HUD: dialogs of buttons, sliders, labels and radio groups drawn
//! through the engine's overlay renderer.
//!
//! ```rust,ignore
//! let mut dialog = Dialog::new();
//! dialog.add_button(IDC_CHANGE, "Change device (F2)", Rect::new(0.0, 72.0, 170.0, 22.0), Some(Key::F(2)));
//!
//! // On input:
//! if let Some(ev) = HudEvent::from_input(&input) {
//!     let mut fired = Vec::new();
//!     if dialog.on_event(&ev, &mut fired).is_consumed() { /* stop routing */ }
//! }
//!
//! // Each frame:
//! dialog.paint(&mut layer.painter(pointer));
//! layer.render(rctx, target);
//! ```

pub mod dialog;
pub mod event;
pub mod layer;
pub mod painter;
pub mod widget;
pub mod widgets;

pub use dialog::Dialog;
pub use event::{ControlId, EventResult, GuiEvent, GuiEventKind, HudEvent};
pub use layer::HudLayer;
pub use painter::Painter;
