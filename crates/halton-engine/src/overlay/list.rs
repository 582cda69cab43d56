use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::FontId;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCmd {
    Fill {
        rect: Rect,
        color: Color,
    },
    /// Single line of text; `origin` is the top-left of the line box.
    Text {
        text: String,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
    },
}

/// One frame of overlay commands. Later commands paint over earlier ones.
#[derive(Debug, Default, Clone)]
pub struct OverlayList {
    cmds: Vec<OverlayCmd>,
}

impl OverlayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every command, keeping the allocation.
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayCmd> {
        self.cmds.iter()
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.cmds.push(OverlayCmd::Fill { rect, color });
    }

    /// Four fills forming a border `thickness` pixels wide inside `rect`.
    pub fn outline_rect(&mut self, rect: Rect, thickness: f32, color: Color) {
        let r = rect.normalized();
        let t = thickness.min(r.size.x * 0.5).min(r.size.y * 0.5);
        if t <= 0.0 {
            return;
        }
        let (x, y, w, h) = (r.origin.x, r.origin.y, r.size.x, r.size.y);
        self.fill_rect(Rect::new(x, y, w, t), color);
        self.fill_rect(Rect::new(x, y + h - t, w, t), color);
        self.fill_rect(Rect::new(x, y + t, t, h - 2.0 * t), color);
        self.fill_rect(Rect::new(x + w - t, y + t, t, h - 2.0 * t), color);
    }

    pub fn text(&mut self, text: impl Into<String>, font: FontId, size: f32, color: Color, origin: Vec2) {
        self.cmds.push(OverlayCmd::Text {
            text: text.into(),
            font,
            size,
            color,
            origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fills(list: &OverlayList) -> Vec<Rect> {
        list.iter()
            .filter_map(|c| match c {
                OverlayCmd::Fill { rect, .. } => Some(*rect),
                OverlayCmd::Text { .. } => None,
            })
            .collect()
    }

    #[test]
    fn commands_keep_recording_order() {
        let mut list = OverlayList::new();
        list.fill_rect(Rect::new(2.0, 0.0, 1.0, 1.0), Color::transparent());
        list.text("a", FontId(0), 12.0, Color::transparent(), Vec2::zero());
        list.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), Color::transparent());

        assert_eq!(list.len(), 3);
        assert!(matches!(list.iter().nth(1), Some(OverlayCmd::Text { .. })));
        let xs: Vec<f32> = fills(&list).iter().map(|r| r.origin.x).collect();
        assert_eq!(xs, vec![2.0, 1.0]);
    }

    #[test]
    fn outline_stays_inside_the_rect() {
        let mut list = OverlayList::new();
        list.outline_rect(Rect::new(0.0, 0.0, 10.0, 6.0), 1.0, Color::transparent());
        let edges = fills(&list);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[1], Rect::new(0.0, 5.0, 10.0, 1.0));
        assert_eq!(edges[3], Rect::new(9.0, 1.0, 1.0, 4.0));
    }

    #[test]
    fn degenerate_outline_records_nothing() {
        let mut list = OverlayList::new();
        list.outline_rect(Rect::new(0.0, 0.0, 10.0, 0.0), 1.0, Color::transparent());
        assert!(list.is_empty());
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = OverlayList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        list.clear();
        assert!(list.is_empty());
    }
}
