/// Viewport size in logical pixels.
///
/// The renderer uploads this as the basis for converting logical px positions
/// to NDC in the vertex shader.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Full-viewport rectangle anchored at the origin.
    #[inline]
    pub fn bounds(self) -> super::Rect {
        super::Rect::new(0.0, 0.0, self.width, self.height)
    }
}
