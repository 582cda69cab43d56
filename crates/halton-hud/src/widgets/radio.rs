use halton_engine::coords::{Rect, Vec2};

use crate::event::{GuiEventKind, HudEvent, Response};
use crate::painter::{Painter, TEXT_SIZE};
use crate::widget::{border_color, face_color, hover_color, press_color, text_color, Widget};

const BOX_SIZE: f32 = 12.0;

/// One radio button. Exclusivity within `group` is enforced by the dialog.
pub struct RadioButton {
    text: String,
    bounds: Rect,
    group: u32,
    checked: bool,
    pressed: bool,
}

impl RadioButton {
    pub fn new(text: impl Into<String>, bounds: Rect, group: u32, checked: bool) -> Self {
        Self { text: text.into(), bounds, group, checked, pressed: false }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

impl Widget for RadioButton {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        let rect = self.screen_bounds(origin);
        let bx = Rect::new(
            rect.origin.x,
            rect.origin.y + (rect.size.y - BOX_SIZE) * 0.5,
            BOX_SIZE,
            BOX_SIZE,
        );
        let bg = if painter.is_hovered(rect) { hover_color() } else { face_color() };
        painter.fill_rect(bx, bg);
        painter.outline_rect(bx, 1.0, border_color());
        if self.checked {
            painter.fill_rect(bx.inset(3.0), press_color());
        }

        let label = painter.measure_text(&self.text, TEXT_SIZE);
        painter.text(
            self.text.clone(),
            TEXT_SIZE,
            text_color(),
            Vec2::new(bx.right() + 6.0, rect.origin.y + (rect.size.y - label.y) * 0.5),
        );
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
                    self.checked = true;
                    Response::Fired(GuiEventKind::RadioSelected)
                } else {
                    Response::Consumed
                }
            }
            _ => Response::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_checks_and_fires() {
        let mut r = RadioButton::new("TAA", Rect::new(0.0, 0.0, 100.0, 20.0), 1, false);
        let pos = Vec2::new(10.0, 10.0);
        r.on_event(&HudEvent::PointerDown { pos }, Vec2::zero());
        assert_eq!(
            r.on_event(&HudEvent::PointerUp { pos }, Vec2::zero()),
            Response::Fired(GuiEventKind::RadioSelected)
        );
        assert!(r.is_checked());
    }

    #[test]
    fn reclicking_a_checked_radio_fires_again() {
        let mut r = RadioButton::new("OFF", Rect::new(0.0, 0.0, 100.0, 20.0), 1, true);
        let pos = Vec2::new(1.0, 1.0);
        r.on_event(&HudEvent::PointerDown { pos }, Vec2::zero());
        assert!(matches!(r.on_event(&HudEvent::PointerUp { pos }, Vec2::zero()), Response::Fired(_)));
    }
}
