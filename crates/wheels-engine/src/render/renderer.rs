use std::path::PathBuf;

use crate::coords::{Rect, Viewport};
use crate::paint::Color;

use super::Vertex;

/// Identifies a texture registered with a [`Renderer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

impl TextureId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered texture: its id plus its size in pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Converts a pixel-space source rectangle to normalized uv corners.
    #[inline]
    pub fn uv_rect(&self, source: Rect) -> ([f32; 2], [f32; 2]) {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        (
            [source.left() / w, source.top() / h],
            [source.right() / w, source.bottom() / h],
        )
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

/// Texture filtering used when sampling.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum SamplerState {
    #[default]
    LinearClamp,
    PointClamp,
}

impl SamplerState {
    pub(crate) const ALL: [SamplerState; 2] = [SamplerState::LinearClamp, SamplerState::PointClamp];

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            SamplerState::LinearClamp => 0,
            SamplerState::PointClamp => 1,
        }
    }
}

/// Everything a draw call depends on besides its geometry.
///
/// The batcher closes a batch whenever this changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GraphicsState {
    pub texture: TextureId,
    pub sampler: SamplerState,
    /// Scissor rect in logical pixels, compared bitwise.
    pub scissor: Option<ScissorRect>,
}

/// Integer scissor rect in logical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    /// Rounds `rect` outwards to whole pixels.
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.normalized();
        let x0 = r.left().floor();
        let y0 = r.top().floor();
        let x1 = r.right().ceil();
        let y1 = r.bottom().ceil();
        Self {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0).max(0.0) as u32,
            height: (y1 - y0).max(0.0) as u32,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x as f32, self.y as f32, self.width as f32, self.height as f32)
    }
}

/// Errors raised while registering textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture size {width}x{height} is empty")]
    ZeroSize { width: u32, height: u32 },

    #[error("texture data is {actual} bytes, expected {expected} for RGBA8")]
    DataLength { expected: usize, actual: usize },

    #[error("texture size {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("failed to decode image {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Checks that `rgba` holds exactly `width * height` RGBA8 pixels.
pub fn validate_texture_data(rgba: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroSize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(TextureError::DataLength { expected, actual: rgba.len() });
    }
    Ok(())
}

/// Backend seam between the batcher and whatever executes draw calls.
///
/// Per frame the batcher calls `begin_render` once per finished batch run,
/// then `draw_batch` for each state-homogeneous index range, then
/// `end_render`. `clear` may be called at any point and applies to
/// everything drawn after it.
pub trait Renderer {
    /// Registers straight-alpha sRGB RGBA8 pixels as a texture.
    fn register_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<Texture, TextureError>;

    /// Frees a texture. Later draws that reference it are skipped; the id
    /// is never handed out again.
    fn release_texture(&mut self, id: TextureId);

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)>;

    /// Current render target size in logical pixels.
    fn viewport(&self) -> Viewport;

    fn clear(&mut self, color: Color);

    fn begin_render(&mut self, vertices: &[Vertex], indices: &[u32]);

    /// Draws `index_count` indices starting at `start_index` of the data
    /// passed to the last `begin_render`.
    fn draw_batch(&mut self, state: &GraphicsState, start_index: u32, index_count: u32);

    fn end_render(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_size() {
        assert!(matches!(
            validate_texture_data(&[], 0, 4),
            Err(TextureError::ZeroSize { width: 0, height: 4 })
        ));
    }

    #[test]
    fn validate_rejects_wrong_length() {
        let err = validate_texture_data(&[255; 12], 2, 2).unwrap_err();
        assert!(matches!(err, TextureError::DataLength { expected: 16, actual: 12 }));
    }

    #[test]
    fn validate_accepts_one_white_pixel() {
        assert!(validate_texture_data(&[255, 255, 255, 255], 1, 1).is_ok());
    }

    #[test]
    fn uv_rect_normalizes_by_texture_size() {
        let tex = Texture { id: TextureId(0), width: 200, height: 100 };
        let (min, max) = tex.uv_rect(Rect::new(50.0, 25.0, 100.0, 50.0));
        assert_eq!(min, [0.25, 0.25]);
        assert_eq!(max, [0.75, 0.75]);
    }

    #[test]
    fn scissor_rounds_outwards() {
        let s = ScissorRect::from_rect(Rect::new(1.5, 2.25, 3.0, 3.0));
        assert_eq!(s, ScissorRect { x: 1, y: 2, width: 4, height: 4 });
    }
}
