use crate::batch::Batcher;
use crate::coords::Rect;
use crate::paint::Color;

impl Batcher {
    /// Draws the `source` region of the active texture (whole texture when
    /// `None`) into `dest`, tinted by `color`.
    pub fn draw_sprite(&mut self, dest: Rect, source: Option<Rect>, color: Color) {
        if !self.can_draw() {
            return;
        }
        let Some(texture) = self.texture() else {
            return;
        };
        let (uv_min, uv_max) = texture.uv_rect(source.unwrap_or_else(|| texture.bounds()));
        self.push_quad(dest.corners(), uv_min, uv_max, color);
    }
}
