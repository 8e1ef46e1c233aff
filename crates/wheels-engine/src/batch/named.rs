use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::render::{Image, Renderer, Texture};
use crate::text::{CharRange, FontAtlas, SystemFonts};

use super::{BatchError, Batcher, FontId};

/// [`Batcher`] with textures and fonts addressed by string identifiers.
///
/// Registering under an identifier that is already taken replaces the old
/// entry. The replaced texture (or font atlas) is released from the renderer,
/// and if it was active the replacement becomes active in its place.
pub struct NamedBatcher {
    batcher: Batcher,
    textures: HashMap<String, Texture>,
    fonts: HashMap<String, FontId>,
    system_fonts: Option<SystemFonts>,
}

impl Default for NamedBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedBatcher {
    pub fn new() -> Self {
        Self {
            batcher: Batcher::new(),
            textures: HashMap::new(),
            fonts: HashMap::new(),
            system_fonts: None,
        }
    }

    /// Registers `image` under `id`.
    pub fn register_texture<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        id: &str,
        image: &Image,
    ) -> Result<Texture, BatchError> {
        let texture = image.register(renderer)?;
        if let Some(old) = self.textures.insert(id.to_string(), texture) {
            log::debug!("texture {id:?} replaced");
            self.retire_texture(renderer, old, texture);
        }
        Ok(texture)
    }

    /// Decodes an image file and registers it under `id`.
    pub fn load_texture<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        id: &str,
        path: impl AsRef<Path>,
    ) -> Result<Texture, BatchError> {
        let image = Image::load(path)?;
        self.register_texture(renderer, id, &image)
    }

    /// Registers an already built font atlas under `id`.
    pub fn register_font<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        id: &str,
        atlas: FontAtlas,
        image: &Image,
    ) -> Result<FontId, BatchError> {
        let texture = image.register(renderer)?;
        let font = self.batcher.add_font(atlas, texture);
        if let Some(old) = self.fonts.insert(id.to_string(), font) {
            log::debug!("font {id:?} replaced");
            let was_current = self.batcher.font() == Some(old);
            if let Some(old_texture) = self.batcher.remove_font(old) {
                self.retire_texture(renderer, old_texture, texture);
            }
            if was_current {
                self.batcher.set_font(font)?;
            }
        }
        Ok(font)
    }

    /// Releases `old`, switching the batcher to `replacement` if `old` is active.
    fn retire_texture<R: Renderer + ?Sized>(&mut self, renderer: &mut R, old: Texture, replacement: Texture) {
        renderer.release_texture(old.id);
        if self.batcher.texture() == Some(old) {
            self.batcher.set_texture(replacement);
        }
    }

    /// Loads a font file at `size` px (basic Latin plus `fallback`) under `id`.
    pub fn load_font<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        id: &str,
        path: impl AsRef<Path>,
        size: f32,
        fallback: char,
    ) -> Result<FontId, BatchError> {
        let (atlas, image) = FontAtlas::load(path, size, &[CharRange::BASIC_LATIN], fallback)?;
        self.register_font(renderer, id, atlas, &image)
    }

    /// Loads an installed font by family name under `id`.
    pub fn load_system_font<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        family: &str,
        size: f32,
        fallback: char,
        id: &str,
    ) -> Result<FontId, BatchError> {
        self.load_first_system_font(renderer, &[family], size, fallback, id)
    }

    /// Loads the first installed family out of `families` under `id`.
    pub fn load_first_system_font<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        families: &[&str],
        size: f32,
        fallback: char,
        id: &str,
    ) -> Result<FontId, BatchError> {
        let system = self.system_fonts.get_or_insert_with(SystemFonts::load);
        let font = system.find_first(families)?;
        log::info!("using system font {:?} for {id:?}", font.family);
        let (atlas, image) =
            FontAtlas::build_face(&font.data, font.index, size, &[CharRange::BASIC_LATIN], fallback)?;
        self.register_font(renderer, id, atlas, &image)
    }

    /// Makes the texture registered under `id` active.
    pub fn set_texture(&mut self, id: &str) -> Result<(), BatchError> {
        let texture = self.texture(id)?;
        self.batcher.set_texture(texture);
        Ok(())
    }

    /// Makes the font registered under `id` current.
    pub fn set_font(&mut self, id: &str) -> Result<(), BatchError> {
        let font = self.font(id)?;
        self.batcher.set_font(font)
    }

    pub fn texture(&self, id: &str) -> Result<Texture, BatchError> {
        self.textures
            .get(id)
            .copied()
            .ok_or_else(|| BatchError::UnknownTexture(id.to_string()))
    }

    pub fn font(&self, id: &str) -> Result<FontId, BatchError> {
        self.fonts
            .get(id)
            .copied()
            .ok_or_else(|| BatchError::UnknownFont(id.to_string()))
    }
}

impl Deref for NamedBatcher {
    type Target = Batcher;

    fn deref(&self) -> &Batcher {
        &self.batcher
    }
}

impl DerefMut for NamedBatcher {
    fn deref_mut(&mut self) -> &mut Batcher {
        &mut self.batcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::render::HeadlessRenderer;
    use crate::text::TEST_FONT;

    #[test]
    fn textures_resolve_by_id() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        let blank = b.register_texture(&mut r, "blank", &Image::blank()).unwrap();

        b.set_texture("blank").unwrap();
        assert_eq!(b.texture("blank").unwrap(), blank);

        b.start().unwrap();
        b.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        assert_eq!(b.finish(&mut r).unwrap().batch_count, 1);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut b = NamedBatcher::new();
        assert!(matches!(b.set_texture("nope"), Err(BatchError::UnknownTexture(id)) if id == "nope"));
        assert!(matches!(b.set_font("font"), Err(BatchError::UnknownFont(id)) if id == "font"));
    }

    #[test]
    fn replacing_a_texture_releases_the_old_one() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        let first = b.register_texture(&mut r, "t", &Image::blank()).unwrap();
        let second = b.register_texture(&mut r, "t", &Image::filled(2, 2, [0, 0, 0, 255])).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(r.texture_count(), 1);
        assert_eq!(b.texture("t").unwrap(), second);
    }

    #[test]
    fn replacing_the_active_texture_switches_to_the_new_one() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        b.register_texture(&mut r, "t", &Image::blank()).unwrap();
        b.set_texture("t").unwrap();
        let second = b.register_texture(&mut r, "t", &Image::filled(2, 2, [0, 0, 0, 255])).unwrap();
        assert_eq!(Batcher::texture(&b), Some(second));

        b.start().unwrap();
        b.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::white());
        b.finish(&mut r).unwrap();
        let drawn = r.frame().draws[0].state.texture;
        assert_eq!(drawn, second.id);
        assert_eq!(r.texture_size(drawn), Some((2, 2)));
    }

    #[test]
    fn replacing_a_font_releases_its_atlas() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        let build = |size| FontAtlas::build(TEST_FONT, size, &[CharRange::BASIC_LATIN], '?').unwrap();

        let (atlas, image) = build(16.0);
        let first = b.register_font(&mut r, "font", atlas, &image).unwrap();
        b.set_font("font").unwrap();
        assert_eq!(r.texture_count(), 1);

        let (atlas, image) = build(32.0);
        let second = b.register_font(&mut r, "font", atlas, &image).unwrap();

        assert_ne!(first, second);
        assert_eq!(r.texture_count(), 1);
        assert_eq!(b.font("font").unwrap(), second);
        assert_eq!(Batcher::font(&b), Some(second));
        assert!(b.font_atlas(first).is_none());
        assert!(matches!(b.batcher.set_font(first), Err(BatchError::InvalidFontId(_))));
        assert_eq!(b.font_atlas(second).map(|a| a.size()), Some(32.0));
    }

    #[test]
    fn missing_image_file_is_texture_error() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        let err = b.load_texture(&mut r, "img", "/nonexistent/wheels.png").unwrap_err();
        assert!(matches!(err, BatchError::Texture(_)));
    }

    #[test]
    fn missing_system_family_is_font_error() {
        let mut r = HeadlessRenderer::default();
        let mut b = NamedBatcher::new();
        let err = b
            .load_system_font(&mut r, "No Such Family Wheels 0xdead", 24.0, '?', "font")
            .unwrap_err();
        assert!(matches!(err, BatchError::Font(crate::text::FontError::NotFound(_))));
        assert!(b.font("font").is_err());
    }
}
