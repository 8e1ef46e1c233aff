use std::path::Path;

use super::{validate_texture_data, Renderer, Texture, TextureError};

/// CPU-side straight-alpha sRGB RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Image {
    /// A `width x height` image filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(len),
        }
    }

    /// The 1x1 opaque white image used as the texture for untextured
    /// primitives.
    pub fn blank() -> Self {
        Self::filled(1, 1, [255, 255, 255, 255])
    }

    /// Decodes an image file (PNG, JPEG, BMP) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded {path:?} ({width}x{height})");
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.rgba.get_mut(i..i + 4)
    }

    /// Registers this image with `renderer`.
    pub fn register<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Result<Texture, TextureError> {
        validate_texture_data(&self.rgba, self.width, self.height)?;
        renderer.register_texture(&self.rgba, self.width, self.height)
    }
}
