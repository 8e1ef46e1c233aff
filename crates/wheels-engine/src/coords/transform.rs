use core::ops::Mul;

use super::Vec2;

/// 2D affine transform using the row-vector convention.
///
/// A point maps as `p' = p * M` with
///
/// ```text
///     | a  b |
/// M = | c  d |
///     | tx ty|
/// ```
///
/// so `x' = x*a + y*c + tx` and `y' = x*b + y*d + ty`. Composition reads left
/// to right: `t1 * t2` applies `t1` first, then `t2`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform2D {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self { tx: x, ty: y, ..Self::IDENTITY }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Rotation by `radians`. With +Y down, positive angles turn clockwise on
    /// screen.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self { a: cos, b: sin, c: -sin, d: cos, tx: 0.0, ty: 0.0 }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns the transform that applies `self` and then `next`.
    #[inline]
    pub fn then(self, next: Transform2D) -> Self {
        Self {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            tx: self.tx * next.a + self.ty * next.c + next.tx,
            ty: self.tx * next.b + self.ty * next.d + next.ty,
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.a + p.y * self.c + self.tx,
            p.x * self.b + p.y * self.d + self.ty,
        )
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform2D {
    type Output = Transform2D;
    #[inline]
    fn mul(self, rhs: Transform2D) -> Transform2D {
        self.then(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec2::new(3.0, -7.5);
        assert_eq!(Transform2D::IDENTITY.transform_point(p), p);
        assert!(Transform2D::default().is_identity());
    }

    #[test]
    fn quarter_turn_maps_x_axis_to_y_axis() {
        let p = Transform2D::rotation(FRAC_PI_2).transform_point(Vec2::new(1.0, 0.0));
        assert!(approx(p, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn translate_then_rotate_applies_left_to_right() {
        let t = Transform2D::translation(52.0, -154.0) * Transform2D::rotation(FRAC_PI_2);
        let p = t.transform_point(Vec2::zero());
        assert!(approx(p, Vec2::new(154.0, 52.0)));
    }

    #[test]
    fn rotate_then_translate_differs() {
        let t = Transform2D::rotation(FRAC_PI_2) * Transform2D::translation(52.0, -154.0);
        let p = t.transform_point(Vec2::zero());
        assert!(approx(p, Vec2::new(52.0, -154.0)));
    }

    #[test]
    fn scale_multiplies_axes() {
        let p = Transform2D::scale(2.0, 3.0).transform_point(Vec2::new(1.0, 1.0));
        assert_eq!(p, Vec2::new(2.0, 3.0));
    }
}
