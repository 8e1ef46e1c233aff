use crate::coords::Vec2;
use crate::paint::Color;
use crate::text::{layout_text, HorizontalAlignment, VerticalAlignment};

use super::Batcher;

impl Batcher {
    /// Draws `text` with the current font, top-left aligned at `position`.
    pub fn draw_text(&mut self, text: &str, position: Vec2, color: Color) {
        self.draw_text_aligned(
            text,
            position,
            color,
            HorizontalAlignment::Left,
            VerticalAlignment::Top,
        );
    }

    /// Draws `text` with the current font, aligned relative to `position`.
    ///
    /// Switches the active texture to the font's atlas; one quad is emitted
    /// per visible glyph.
    pub fn draw_text_aligned(
        &mut self,
        text: &str,
        position: Vec2,
        color: Color,
        h_align: HorizontalAlignment,
        v_align: VerticalAlignment,
    ) {
        let Some(font) = self.font.and_then(|id| self.fonts.get(id.0 as usize)).and_then(Option::as_ref) else {
            if !self.warned_no_font {
                log::warn!("Batcher: draw_text without a font set; skipped");
                self.warned_no_font = true;
            }
            return;
        };
        let texture = font.texture;

        let mut quads = std::mem::take(&mut self.glyph_scratch);
        quads.clear();
        layout_text(&font.atlas, text, position, h_align, v_align, &mut quads);

        self.set_texture(texture);
        if self.can_draw() {
            for q in &quads {
                let (uv_min, uv_max) = texture.uv_rect(q.source);
                self.push_quad(q.dest.corners(), uv_min, uv_max, color);
            }
        }
        self.glyph_scratch = quads;
    }
}
