use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;

use anyhow::{Context, Result};

use wheels_engine::batch::{BatchStats, NamedBatcher};
use wheels_engine::coords::{Rect, Transform2D, Vec2};
use wheels_engine::core::{App, AppControl, FrameCtx, StartCtx};
use wheels_engine::paint::Color;
use wheels_engine::render::{Image, Renderer};
use wheels_engine::text::{HorizontalAlignment, VerticalAlignment};

use crate::BLANK;

pub const TITLE: &str = "Wheels Text Rendering";

pub const FONT_ID: &str = "font";
pub const FONT_SIZE: f32 = 24.0;
pub const FALLBACK: char = '?';

/// Families tried in order when no font file is given.
pub const DEFAULT_FAMILIES: &[&str] = &[
    "Consolas",
    "DejaVu Sans",
    "DejaVu Sans Mono",
    "Liberation Sans",
    "Arial",
    "sans-serif",
];

/// Where the sample takes its font from.
#[derive(Debug, Clone)]
pub enum FontSource {
    File(PathBuf),
    Families(Vec<String>),
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::Families(DEFAULT_FAMILIES.iter().map(|f| f.to_string()).collect())
    }
}

/// Draws a rectangle, a line of text and a rotated line of text.
pub struct FontSample {
    batcher: NamedBatcher,
    source: FontSource,
}

impl FontSample {
    pub fn new(source: FontSource) -> Self {
        Self {
            batcher: NamedBatcher::new(),
            source,
        }
    }

    /// Registers the blank texture and the font, and makes the font current.
    pub fn load(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.batcher.register_texture(renderer, BLANK, &Image::blank())?;

        match &self.source {
            FontSource::File(path) => {
                self.batcher
                    .load_font(renderer, FONT_ID, path, FONT_SIZE, FALLBACK)
                    .with_context(|| format!("failed to load font {}", path.display()))?;
            }
            FontSource::Families(families) => {
                let families: Vec<&str> = families.iter().map(String::as_str).collect();
                self.batcher
                    .load_first_system_font(renderer, &families, FONT_SIZE, FALLBACK, FONT_ID)
                    .context("no usable system font; pass --font <file>")?;
            }
        }

        self.batcher.set_font(FONT_ID)?;
        Ok(())
    }

    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<BatchStats> {
        renderer.clear(Color::black());

        let b = &mut self.batcher;
        b.start()?;
        b.set_texture(BLANK)?;

        b.fill_rect(Rect::new(70.0, 35.0, 200.0, 200.0), Color::cornflower_blue());
        b.draw_text("Hello World!", Vec2::new(100.0, 100.0), Color::black());

        b.set_transform(Transform2D::translation(52.0, -154.0) * Transform2D::rotation(FRAC_PI_2));
        b.draw_text_aligned(
            "Hell  World!",
            Vec2::zero(),
            Color::black(),
            HorizontalAlignment::Left,
            VerticalAlignment::Bottom,
        );
        b.reset_transform();

        Ok(b.finish(renderer)?)
    }
}

impl App for FontSample {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> Result<()> {
        self.load(ctx.renderer)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let stats = self.draw(ctx.renderer)?;
        if ctx.time.is_first() {
            log::info!("first frame: {stats:?}");
        }
        Ok(AppControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheels_engine::render::HeadlessRenderer;

    const TEST_FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../wheels-engine/fixtures/Tuffy.ttf");

    #[test]
    fn missing_font_file_fails_to_load() {
        let mut r = HeadlessRenderer::default();
        let mut sample = FontSample::new(FontSource::File("/nonexistent/wheels.ttf".into()));
        let err = sample.load(&mut r).unwrap_err();
        assert!(format!("{err:#}").contains("wheels.ttf"));
    }

    #[test]
    fn drawing_before_load_fails_on_unknown_texture() {
        let mut r = HeadlessRenderer::default();
        let mut sample = FontSample::new(FontSource::default());
        assert!(sample.draw(&mut r).is_err());
    }

    #[test]
    fn renders_frames_headless() {
        let mut r = HeadlessRenderer::default();
        let mut sample = FontSample::new(FontSource::File(TEST_FONT.into()));
        sample.load(&mut r).unwrap();

        for _ in 0..2 {
            let stats = sample.draw(&mut r).unwrap();
            // Rect on the blank texture, then both strings on the atlas.
            assert_eq!(stats.batch_count, 2);
            assert_eq!(stats.vertices_submitted, 4 + 4 * 21);
        }
        assert_eq!(r.take_frame().clears, vec![Color::black(); 2]);
    }
}
