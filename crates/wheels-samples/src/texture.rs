use std::path::PathBuf;

use anyhow::{Context, Result};

use wheels_engine::batch::{BatchStats, NamedBatcher};
use wheels_engine::coords::{Rect, Vec2};
use wheels_engine::core::{App, AppControl, FrameCtx, StartCtx};
use wheels_engine::paint::Color;
use wheels_engine::render::Renderer;

use crate::print_stats;

pub const TITLE: &str = "Wheels Texture Sample";

const IMAGE: &str = "image";

/// Clears the window and submits one batch per frame; with an image, the
/// batch draws it as a sprite.
pub struct TextureSample {
    batcher: NamedBatcher,
    image_path: Option<PathBuf>,
    stats_printed: bool,
}

impl TextureSample {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        Self {
            batcher: NamedBatcher::new(),
            image_path,
            stats_printed: false,
        }
    }

    /// Registers the optional image.
    pub fn load(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if let Some(path) = &self.image_path {
            self.batcher
                .load_texture(renderer, IMAGE, path)
                .with_context(|| format!("failed to load image {}", path.display()))?;
        }
        Ok(())
    }

    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<BatchStats> {
        renderer.clear(Color::cornflower_blue());
        self.batcher.start()?;

        if let Ok(texture) = self.batcher.texture(IMAGE) {
            self.batcher.set_texture(IMAGE)?;
            let dest = fit_centered(
                Vec2::new(texture.width as f32, texture.height as f32),
                renderer.viewport().bounds(),
            );
            self.batcher.draw_sprite(dest, None, Color::white());
        }

        Ok(self.batcher.finish(renderer)?)
    }
}

/// Scales `size` down to fit `bounds` (never up) and centers it.
fn fit_centered(size: Vec2, bounds: Rect) -> Rect {
    let scale = (bounds.size.x / size.x).min(bounds.size.y / size.y).min(1.0);
    let fitted = size * scale;
    let origin = bounds.center() - fitted * 0.5;
    Rect::from_origin_size(origin, fitted)
}

impl App for TextureSample {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> Result<()> {
        self.load(ctx.renderer)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let stats = self.draw(ctx.renderer)?;
        if !self.stats_printed {
            print_stats(stats);
            self.stats_printed = true;
        }
        Ok(AppControl::Continue)
    }
}
