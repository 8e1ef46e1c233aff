/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are expected to be multiplied by `a` (premultiplied alpha).
///
/// Colors written as sRGB bytes (hex literals, named colors) are converted to
/// linear space by [`Color::from_srgb_u8`]; the sRGB surface encodes them back
/// on output.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    #[inline]
    pub const fn black() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }

    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// `#6495ED`.
    #[inline]
    pub fn cornflower_blue() -> Self {
        Self::from_srgb_u8(100, 149, 237, 255)
    }

    #[inline]
    pub fn red() -> Self {
        Self::from_srgb_u8(255, 0, 0, 255)
    }

    #[inline]
    pub fn green() -> Self {
        Self::from_srgb_u8(0, 128, 0, 255)
    }

    #[inline]
    pub fn orange() -> Self {
        Self::from_srgb_u8(255, 165, 0, 255)
    }

    /// Creates a premultiplied linear color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
            a as f32 / 255.0,
        )
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha linear components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Scales the opacity, keeping premultiplication intact.
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let k = opacity.clamp(0.0, 1.0);
        Self { r: self.r * k, g: self.g * k, b: self.b * k, a: self.a * k }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(l: f32) -> f32 {
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts straight-alpha sRGB RGBA8 pixels into premultiplied sRGB RGBA8.
///
/// Premultiplication happens in linear space so that sampling an sRGB texture
/// yields linear premultiplied values, matching vertex colors.
pub fn premultiply_srgb8(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        let a = px[3];
        match a {
            255 => out.extend_from_slice(px),
            0 => out.extend_from_slice(&[0, 0, 0, 0]),
            _ => {
                let k = a as f32 / 255.0;
                for &c in &px[..3] {
                    let lin = srgb_to_linear(c as f32 / 255.0) * k;
                    out.push((linear_to_srgb(lin) * 255.0).round().clamp(0.0, 255.0) as u8);
                }
                out.push(a);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_extremes_map_exactly() {
        assert_eq!(Color::from_srgb_u8(255, 255, 255, 255), Color::white());
        assert_eq!(Color::from_srgb_u8(0, 0, 0, 255), Color::black());
    }

    #[test]
    fn cornflower_blue_is_linearized() {
        let c = Color::cornflower_blue();
        // 100/255 in sRGB is ~0.127 linear.
        assert!((c.r - 0.127).abs() < 0.002, "r = {}", c.r);
        assert!(c.b > c.g && c.g > c.r);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn from_straight_premultiplies() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn with_opacity_scales_all_channels() {
        let c = Color::white().with_opacity(0.25);
        assert_eq!(c.to_array(), [0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn premultiply_keeps_opaque_and_zeroes_transparent() {
        let px = [10, 20, 30, 255, 200, 100, 50, 0];
        assert_eq!(premultiply_srgb8(&px), vec![10, 20, 30, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn premultiply_half_alpha_white_in_linear_space() {
        let out = premultiply_srgb8(&[255, 255, 255, 128]);
        // Linear 0.502 re-encoded to sRGB is ~188.
        assert!((187..=189).contains(&out[0]), "got {}", out[0]);
        assert_eq!(out[3], 128);
    }
}
