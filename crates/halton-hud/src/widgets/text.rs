use halton_engine::coords::{Rect, Vec2};
use halton_engine::paint::Color;

use crate::painter::{Painter, TEXT_SIZE};
use crate::widget::{text_color, Widget};

/// Non-interactive text label whose content can change at runtime.
pub struct Static {
    text: String,
    bounds: Rect,
    color: Color,
}

impl Static {
    pub fn new(text: impl Into<String>, bounds: Rect) -> Self {
        Self { text: text.into(), bounds, color: text_color() }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Static {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        let rect = self.screen_bounds(origin);
        let m = painter.measure_text(&self.text, TEXT_SIZE);
        let origin = Vec2::new(rect.origin.x, rect.origin.y + (rect.size.y - m.y) * 0.5);
        painter.text(self.text.clone(), TEXT_SIZE, self.color, origin);
    }
}
