use halton_engine::coords::{Rect, Vec2};

use crate::event::{GuiEventKind, HudEvent, Response};
use crate::painter::Painter;
use crate::widget::{border_color, face_color, hover_color, press_color, Widget};

const THUMB_WIDTH: f32 = 10.0;
const TRACK_HEIGHT: f32 = 4.0;

/// Horizontal integer slider over `min..=max`.
///
/// Pressing anywhere on the track jumps to that value; dragging keeps
/// updating it. Every change fires `SliderChanged`.
pub struct Slider {
    bounds: Rect,
    min: i32,
    max: i32,
    value: i32,
    dragging: bool,
}

impl Slider {
    pub fn new(bounds: Rect, min: i32, max: i32, value: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { bounds, min, max, value: value.clamp(min, max), dragging: false }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Sets the value without firing an event.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }

    fn value_at(&self, rect: Rect, x: f32) -> i32 {
        let travel = (rect.size.x - THUMB_WIDTH).max(1.0);
        let t = ((x - rect.origin.x - THUMB_WIDTH * 0.5) / travel).clamp(0.0, 1.0);
        self.min + (t * (self.max - self.min) as f32).round() as i32
    }

    fn thumb(&self, rect: Rect) -> Rect {
        let span = (self.max - self.min).max(1) as f32;
        let t = (self.value - self.min) as f32 / span;
        let x = rect.origin.x + t * (rect.size.x - THUMB_WIDTH);
        Rect::new(x, rect.origin.y, THUMB_WIDTH, rect.size.y)
    }

    fn update(&mut self, rect: Rect, x: f32) -> Response {
        let value = self.value_at(rect, x);
        if value == self.value {
            return Response::Consumed;
        }
        self.value = value;
        Response::Fired(GuiEventKind::SliderChanged(value))
    }
}

impl Widget for Slider {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        let rect = self.screen_bounds(origin);
        let cy = rect.origin.y + rect.size.y * 0.5;
        painter.fill_rect(
            Rect::new(rect.origin.x, cy - TRACK_HEIGHT * 0.5, rect.size.x, TRACK_HEIGHT),
            face_color(),
        );

        let thumb = self.thumb(rect);
        let color = if self.dragging {
            press_color()
        } else if painter.is_hovered(rect) {
            hover_color()
        } else {
            face_color()
        };
        painter.fill_rect(thumb, color);
        painter.outline_rect(thumb, 1.0, border_color());
    }

    fn on_event(&mut self, event: &HudEvent, origin: Vec2) -> Response {
        let rect = self.screen_bounds(origin);
        match *event {
            HudEvent::PointerDown { pos } if rect.contains(pos) => {
                self.dragging = true;
                self.update(rect, pos.x)
            }
            HudEvent::PointerMoved { pos } if self.dragging => self.update(rect, pos.x),
            HudEvent::PointerUp { pos } if self.dragging => {
                self.dragging = false;
                self.update(rect, pos.x)
            }
            _ => Response::Ignored,
        }
    }
}
