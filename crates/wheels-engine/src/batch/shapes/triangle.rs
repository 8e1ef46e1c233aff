use crate::batch::Batcher;
use crate::coords::Vec2;
use crate::paint::Color;

impl Batcher {
    /// Fills the triangle `a`, `b`, `c`.
    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if !self.can_draw() {
            return;
        }
        let first = self.push_vertex(a, [0.0, 0.0], color);
        self.push_vertex(b, [1.0, 0.0], color);
        self.push_vertex(c, [1.0, 1.0], color);
        self.push_indices(&[first, first + 1, first + 2]);
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::batcher::tests::setup;
    use crate::coords::Vec2;
    use crate::paint::Color;

    #[test]
    fn triangle_is_three_and_three() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.fill_rect(crate::coords::Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        b.fill_triangle(Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0), Color::white());
        let stats = b.finish(&mut r).unwrap();

        assert_eq!((stats.vertices_submitted, stats.indices_submitted), (7, 9));
        assert_eq!(&b.indices()[6..], &[4, 5, 6]);
    }
}
