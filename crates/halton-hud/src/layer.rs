use halton_engine::coords::Vec2;
use halton_engine::paint::Color;
use halton_engine::overlay::OverlayList;
use halton_engine::render::{OverlayRenderer, RenderCtx, RenderTarget};
use halton_engine::text::{FontId, FontSystem};

use crate::painter::Painter;

/// Owns the fonts, overlay list and renderer that put the HUD on screen.
///
/// Each frame: [`HudLayer::painter`] to record, then [`HudLayer::render`]
/// to draw on top of the back buffer.
pub struct HudLayer {
    pub font_system: FontSystem,
    font: Option<FontId>,
    list: OverlayList,
    renderer: OverlayRenderer,
}

impl Default for HudLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl HudLayer {
    /// Loads a system font. Without one the HUD draws controls but no text.
    pub fn new() -> Self {
        let mut font_system = FontSystem::new();
        let font = match font_system.load_system_font() {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("HUD text disabled: {e}");
                None
            }
        };
        Self {
            font_system,
            font,
            list: OverlayList::new(),
            renderer: OverlayRenderer::new(),
        }
    }

    /// Clears last frame's commands and returns a painter for this frame.
    pub fn painter(&mut self, pointer: Option<Vec2>) -> Painter<'_> {
        self.list.clear();
        Painter::new(&mut self.list, &self.font_system, self.font, pointer)
    }

    /// Draws recorded commands over `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.renderer.render(ctx, target, &self.list, &self.font_system);
    }
}

/// Yellow used for frame statistics.
pub fn stats_color() -> Color {
    Color::from_straight(1.0, 1.0, 0.0, 1.0)
}
