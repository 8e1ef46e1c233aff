//! Font atlases and text layout.
//!
//! Glyphs are rasterized once per font size with `fontdue` into a single RGBA
//! texture (white, coverage in alpha). Layout is pen-advance with kerning;
//! no shaping.

mod error;
mod font;
mod layout;
mod packer;
mod system;

pub use error::FontError;
pub use font::{CharRange, FontAtlas, Glyph, LineMetrics};
pub use layout::{
    layout_text, measure_text, GlyphMetrics, GlyphQuad, HorizontalAlignment, VerticalAlignment,
};
pub use system::{find_first_system_font, find_system_font, SystemFont, SystemFonts};

/// Public-domain Tuffy Regular, used by tests that need real glyph outlines.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!("../../fixtures/Tuffy.ttf");

