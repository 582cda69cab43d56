use halton_engine::coords::{Rect, Vec2};
use halton_engine::input::Key;
use halton_engine::paint::Color;

use crate::event::{HudEvent, Response};
use crate::painter::Painter;
use crate::widgets::{Button, RadioButton, Slider, Static};

// ── palette ───────────────────────────────────────────────────────────────

pub(crate) fn text_color() -> Color {
    Color::from_straight(1.0, 1.0, 1.0, 1.0)
}

pub(crate) fn face_color() -> Color {
    Color::from_straight(0.25, 0.27, 0.32, 0.85)
}

pub(crate) fn hover_color() -> Color {
    Color::from_straight(0.35, 0.4, 0.5, 0.9)
}

pub(crate) fn press_color() -> Color {
    Color::from_straight(0.2, 0.45, 0.8, 0.95)
}

pub(crate) fn border_color() -> Color {
    Color::from_straight(0.6, 0.65, 0.75, 1.0)
}

// ── Widget trait ──────────────────────────────────────────────────────────

/// Behaviour shared by every dialog control.
///
/// Bounds are relative to the owning dialog; `origin` is the dialog's
/// top-left in back-buffer pixels.
pub trait Widget {
    fn bounds(&self) -> Rect;

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2);

    /// Route an input event. Controls that captured the pointer see every
    /// move and release until they let go.
    fn on_event(&mut self, event: &HudEvent, origin: Vec2) -> Response {
        let _ = (event, origin);
        Response::Ignored
    }

    fn hotkey(&self) -> Option<Key> {
        None
    }

    /// Screen-space bounds.
    fn screen_bounds(&self, origin: Vec2) -> Rect {
        self.bounds().translated(origin)
    }
}

// ── Control ───────────────────────────────────────────────────────────────

/// The closed set of controls a dialog can own.
pub enum Control {
    Button(Button),
    Slider(Slider),
    Static(Static),
    Radio(RadioButton),
}

impl Control {
    pub(crate) fn widget(&self) -> &dyn Widget {
        match self {
            Control::Button(w) => w,
            Control::Slider(w) => w,
            Control::Static(w) => w,
            Control::Radio(w) => w,
        }
    }

    pub(crate) fn widget_mut(&mut self) -> &mut dyn Widget {
        match self {
            Control::Button(w) => w,
            Control::Slider(w) => w,
            Control::Static(w) => w,
            Control::Radio(w) => w,
        }
    }
}
