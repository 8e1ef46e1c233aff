use anyhow::Result;

use wheels_engine::batch::{BatchStats, NamedBatcher};
use wheels_engine::coords::{Rect, Transform2D, Vec2};
use wheels_engine::core::{App, AppControl, FrameCtx, StartCtx};
use wheels_engine::paint::Color;
use wheels_engine::render::{Image, Renderer};

use crate::{print_stats, BLANK};

pub const TITLE: &str = "Wheels Shapes Sample";

/// Radians per second of the spinning square.
const SPIN_SPEED: f32 = 1.5;

/// Draws every primitive the batcher offers, plus a square spinning with time.
pub struct ShapesSample {
    batcher: NamedBatcher,
    stats_printed: bool,
}

impl Default for ShapesSample {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapesSample {
    pub fn new() -> Self {
        Self {
            batcher: NamedBatcher::new(),
            stats_printed: false,
        }
    }

    pub fn load(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.batcher.register_texture(renderer, BLANK, &Image::blank())?;
        Ok(())
    }

    /// Draws one frame; `elapsed` seconds drive the spinning square.
    pub fn draw(&mut self, renderer: &mut dyn Renderer, elapsed: f32) -> Result<BatchStats> {
        renderer.clear(Color::from_srgb_u8(24, 24, 32, 255));

        let b = &mut self.batcher;
        b.start()?;
        b.set_texture(BLANK)?;

        b.fill_rect(Rect::new(40.0, 40.0, 160.0, 100.0), Color::cornflower_blue());
        b.draw_rect(Rect::new(240.0, 40.0, 160.0, 100.0), Color::orange(), 4.0);
        b.draw_line(Vec2::new(440.0, 40.0), Vec2::new(600.0, 140.0), Color::white(), 3.0);
        b.draw_line(Vec2::new(440.0, 140.0), Vec2::new(600.0, 40.0), Color::red(), 1.0);

        b.fill_triangle(
            Vec2::new(120.0, 200.0),
            Vec2::new(200.0, 340.0),
            Vec2::new(40.0, 340.0),
            Color::green(),
        );
        b.fill_circle(Vec2::new(320.0, 270.0), 70.0, Color::red().with_opacity(0.75), 48);
        b.fill_circle(Vec2::new(360.0, 300.0), 50.0, Color::cornflower_blue().with_opacity(0.5), 32);

        let center = Vec2::new(700.0, 300.0);
        let spin = Transform2D::rotation(elapsed * SPIN_SPEED) * Transform2D::translation(center.x, center.y);
        b.set_transform(spin);
        b.fill_rect(Rect::new(-50.0, -50.0, 100.0, 100.0), Color::white());
        b.draw_rect(Rect::new(-60.0, -60.0, 120.0, 120.0), Color::orange(), 2.0);
        b.reset_transform();

        Ok(b.finish(renderer)?)
    }
}

impl App for ShapesSample {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> Result<()> {
        self.load(ctx.renderer)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let stats = self.draw(ctx.renderer, ctx.time.elapsed)?;
        if !self.stats_printed {
            print_stats(stats);
            self.stats_printed = true;
        }
        Ok(AppControl::Continue)
    }
}
