use crate::batch::Batcher;
use crate::coords::Vec2;
use crate::paint::Color;

use super::{FULL_UV_MAX, FULL_UV_MIN};

impl Batcher {
    /// Draws a segment from `from` to `to` as a quad `thickness` pixels wide,
    /// centered on the segment. Zero-length segments draw nothing.
    pub fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color, thickness: f32) {
        if !self.can_draw() || thickness <= 0.0 {
            return;
        }
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::zero() {
            return;
        }
        let n = dir.perp() * (thickness * 0.5);
        self.push_quad([from - n, to - n, to + n, from + n], FULL_UV_MIN, FULL_UV_MAX, color);
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::batcher::tests::setup;
    use crate::coords::Vec2;
    use crate::paint::Color;

    #[test]
    fn horizontal_line_extends_half_thickness_each_side() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.draw_line(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0), Color::white(), 4.0);
        b.draw_line(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0), Color::white(), 4.0);
        let stats = b.finish(&mut r).unwrap();

        assert_eq!(stats.vertices_submitted, 4);
        let ys: Vec<f32> = b.vertices().iter().map(|v| v.position[1]).collect();
        assert_eq!(ys, vec![8.0, 8.0, 12.0, 12.0]);
    }
}
