use std::f32::consts::TAU;

use crate::batch::Batcher;
use crate::coords::Vec2;
use crate::paint::Color;

const MIN_SEGMENTS: u32 = 3;

impl Batcher {
    /// Fills a circle approximated by a triangle fan of `segments` slices.
    ///
    /// Emits `segments + 1` vertices and `3 * segments` indices; fewer than
    /// three segments are raised to three.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, segments: u32) {
        if !self.can_draw() || radius <= 0.0 {
            return;
        }
        let segments = segments.max(MIN_SEGMENTS);

        let hub = self.push_vertex(center, [0.5, 0.5], color);
        for i in 0..segments {
            let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
            let p = Vec2::new(center.x + cos * radius, center.y + sin * radius);
            self.push_vertex(p, [0.5 + cos * 0.5, 0.5 + sin * 0.5], color);
        }
        for i in 0..segments {
            let next = (i + 1) % segments;
            self.push_indices(&[hub, hub + 1 + i, hub + 1 + next]);
        }
    }
}
