use halton_engine::coords::{Rect, Vec2};
use halton_engine::paint::Color;
use halton_engine::overlay::OverlayList;
use halton_engine::text::{FontId, FontSystem};

/// Default text size for dialog controls, in pixels.
pub const TEXT_SIZE: f32 = 14.0;

/// Drawing surface handed to controls.
///
/// Each call paints above the previous one. Text is skipped when no font
/// could be loaded.
pub struct Painter<'a> {
    list: &'a mut OverlayList,
    fonts: &'a FontSystem,
    font: Option<FontId>,
    /// Current pointer position, if the pointer is over the window.
    pub pointer: Option<Vec2>,
}

impl<'a> Painter<'a> {
    pub fn new(
        list: &'a mut OverlayList,
        fonts: &'a FontSystem,
        font: Option<FontId>,
        pointer: Option<Vec2>,
    ) -> Self {
        Self { list, fonts, font, pointer }
    }

    // ── input queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_hovered(&self, rect: Rect) -> bool {
        self.pointer.is_some_and(|p| rect.contains(p))
    }

    // ── text measurement ──────────────────────────────────────────────────

    pub fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        match self.font {
            Some(font) => self.fonts.measure_text(text, font, size),
            None => Vec2::new(0.0, size),
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.list.fill_rect(rect, color);
    }

    pub fn outline_rect(&mut self, rect: Rect, thickness: f32, color: Color) {
        self.list.outline_rect(rect, thickness, color);
    }

    /// Text with its first line's top-left at `origin`.
    pub fn text(&mut self, text: impl Into<String>, size: f32, color: Color, origin: Vec2) {
        let Some(font) = self.font else { return };
        self.list.text(text, font, size, color, origin);
    }

    /// Text centred in `rect`.
    pub fn text_centered(&mut self, text: &str, size: f32, color: Color, rect: Rect) {
        let m = self.measure_text(text, size);
        let origin = Vec2::new(
            rect.origin.x + (rect.size.x - m.x) * 0.5,
            rect.origin.y + (rect.size.y - m.y) * 0.5,
        );
        self.text(text, size, color, origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halton_engine::overlay::OverlayCmd;

    #[test]
    fn later_calls_paint_above_earlier_ones() {
        let mut list = OverlayList::new();
        let fonts = FontSystem::new();
        let mut p = Painter::new(&mut list, &fonts, None, None);
        p.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        p.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), Color::transparent());

        let xs: Vec<f32> = list
            .iter()
            .map(|cmd| match cmd {
                OverlayCmd::Fill { rect, .. } => rect.origin.x,
                OverlayCmd::Text { .. } => f32::NAN,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 1.0]);
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut list = OverlayList::new();
        let fonts = FontSystem::new();
        let mut p = Painter::new(&mut list, &fonts, None, None);
        p.text("hello", TEXT_SIZE, Color::transparent(), Vec2::zero());
        assert!(list.is_empty());
    }

    #[test]
    fn hover_needs_a_pointer() {
        let mut list = OverlayList::new();
        let fonts = FontSystem::new();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!Painter::new(&mut list, &fonts, None, None).is_hovered(rect));
        assert!(Painter::new(&mut list, &fonts, None, Some(Vec2::new(5.0, 5.0))).is_hovered(rect));
    }
}
