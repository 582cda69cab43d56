use halton_engine::coords::{Rect, Vec2};
use halton_engine::input::Key;

use crate::event::{GuiEventKind, HudEvent, Response};
use crate::painter::{Painter, TEXT_SIZE};
use crate::widget::{border_color, face_color, hover_color, press_color, text_color, Widget};

/// Push button. Fires when released over itself or when its hotkey is pressed.
pub struct Button {
    text: String,
    bounds: Rect,
    hotkey: Option<Key>,
    pressed: bool,
}

impl Button {
    pub fn new(text: impl Into<String>, bounds: Rect) -> Self {
        Self { text: text.into(), bounds, hotkey: None, pressed: false }
    }

    pub fn hotkey(mut self, key: Key) -> Self {
        self.hotkey = Some(key);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl Widget for Button {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        let rect = self.screen_bounds(origin);
        let bg = if self.pressed {
            press_color()
        } else if painter.is_hovered(rect) {
            hover_color()
        } else {
            face_color()
        };
        painter.fill_rect(rect, bg);
        painter.outline_rect(rect, 1.0, border_color());
        painter.text_centered(&self.text, TEXT_SIZE, text_color(), rect);
    }

    fn on_event(&mut self, event: &HudEvent, origin: Vec2) -> Response {
        let rect = self.screen_bounds(origin);
        match *event {
            HudEvent::PointerDown { pos } if rect.contains(pos) => {
                self.pressed = true;
                Response::Consumed
            }
            HudEvent::PointerMoved { .. } if self.pressed => Response::Consumed,
            HudEvent::PointerUp { pos } if self.pressed => {
                self.pressed = false;
                if rect.contains(pos) {
                    Response::Fired(GuiEventKind::ButtonClicked)
                } else {
                    Response::Consumed
                }
            }
            HudEvent::KeyDown { key } if self.hotkey == Some(key) => {
                Response::Fired(GuiEventKind::ButtonClicked)
            }
            _ => Response::Ignored,
        }
    }

    fn hotkey(&self) -> Option<Key> {
        self.hotkey
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> Button {
        Button::new("Toggle REF (F3)", Rect::new(0.0, 20.0, 170.0, 22.0)).hotkey(Key::F(3))
    }

    fn at(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn click_inside_fires_on_release() {
        let mut b = button();
        let origin = at(100.0, 0.0);
        assert_eq!(b.on_event(&HudEvent::PointerDown { pos: at(150.0, 30.0) }, origin), Response::Consumed);
        assert!(b.is_pressed());
        assert_eq!(
            b.on_event(&HudEvent::PointerUp { pos: at(150.0, 30.0) }, origin),
            Response::Fired(GuiEventKind::ButtonClicked)
        );
        assert!(!b.is_pressed());
    }

    #[test]
    fn release_outside_cancels() {
        let mut b = button();
        b.on_event(&HudEvent::PointerDown { pos: at(10.0, 30.0) }, Vec2::zero());
        assert_eq!(b.on_event(&HudEvent::PointerUp { pos: at(500.0, 30.0) }, Vec2::zero()), Response::Consumed);
    }

    #[test]
    fn press_outside_is_ignored() {
        let mut b = button();
        assert_eq!(b.on_event(&HudEvent::PointerDown { pos: at(10.0, 0.0) }, Vec2::zero()), Response::Ignored);
    }

    #[test]
    fn hotkey_fires_without_pointer() {
        let mut b = button();
        assert_eq!(
            b.on_event(&HudEvent::KeyDown { key: Key::F(3) }, Vec2::zero()),
            Response::Fired(GuiEventKind::ButtonClicked)
        );
        assert_eq!(b.on_event(&HudEvent::KeyDown { key: Key::F(2) }, Vec2::zero()), Response::Ignored);
    }
}
