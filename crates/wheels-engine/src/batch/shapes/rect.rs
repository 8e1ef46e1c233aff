use crate::batch::Batcher;
use crate::coords::Rect;
use crate::paint::Color;

use super::{FULL_UV_MAX, FULL_UV_MIN};

impl Batcher {
    /// Fills `rect` with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if !self.can_draw() {
            return;
        }
        self.push_quad(rect.normalized().corners(), FULL_UV_MIN, FULL_UV_MAX, color);
    }

    /// Outlines `rect` with a border `thickness` pixels wide, drawn inside the
    /// rect.
    ///
    /// Emits four quads, or a single filled rect when the border covers it.
    pub fn draw_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        if !self.can_draw() || thickness <= 0.0 {
            return;
        }
        let r = rect.normalized();
        let (w, h) = (r.size.x, r.size.y);
        if thickness * 2.0 >= w.min(h) {
            self.fill_rect(r, color);
            return;
        }

        let t = thickness;
        let inner_h = h - 2.0 * t;
        self.fill_rect(Rect::new(r.left(), r.top(), w, t), color);
        self.fill_rect(Rect::new(r.left(), r.bottom() - t, w, t), color);
        self.fill_rect(Rect::new(r.left(), r.top() + t, t, inner_h), color);
        self.fill_rect(Rect::new(r.right() - t, r.top() + t, t, inner_h), color);
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::batcher::tests::setup;
    use crate::coords::Rect;
    use crate::paint::Color;

    #[test]
    fn outline_is_four_quads() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.draw_rect(Rect::new(0.0, 0.0, 20.0, 10.0), Color::white(), 2.0);
        let stats = b.finish(&mut r).unwrap();
        assert_eq!((stats.vertices_submitted, stats.indices_submitted), (16, 24));

        // Left bar spans the inner height.
        let left = &b.vertices()[8..12];
        assert_eq!(left[0].position, [0.0, 2.0]);
        assert_eq!(left[2].position, [2.0, 8.0]);
    }

    #[test]
    fn thick_outline_collapses_to_fill() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.draw_rect(Rect::new(0.0, 0.0, 20.0, 10.0), Color::white(), 5.0);
        assert_eq!(b.finish(&mut r).unwrap().vertices_submitted, 4);
    }

    #[test]
    fn fill_rect_uses_full_uv_and_color() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.fill_rect(Rect::new(70.0, 35.0, 200.0, 200.0), Color::black());
        b.finish(&mut r).unwrap();

        let v = b.vertices();
        assert_eq!(v[0].uv, [0.0, 0.0]);
        assert_eq!(v[2].uv, [1.0, 1.0]);
        assert_eq!(v[2].position, [270.0, 235.0]);
        assert!(v.iter().all(|v| v.color == [0.0, 0.0, 0.0, 1.0]));
    }
}
