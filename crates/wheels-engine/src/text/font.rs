use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::coords::{Rect, Vec2};
use crate::render::Image;

use super::layout::{measure_text, GlyphMetrics};
use super::packer::ShelfPacker;
use super::FontError;

const GLYPH_PADDING: u32 = 1;
const MIN_ATLAS_SIZE: u32 = 128;
const MAX_ATLAS_SIZE: u32 = 4096;

/// Inclusive range of characters to rasterize into an atlas.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CharRange {
    pub first: char,
    pub last: char,
}

impl CharRange {
    /// Printable ASCII, `' '..='~'`.
    pub const BASIC_LATIN: CharRange = CharRange { first: ' ', last: '~' };

    pub const fn new(first: char, last: char) -> Self {
        Self { first, last }
    }

    pub fn chars(self) -> impl Iterator<Item = char> {
        self.first..=self.last
    }
}

/// Placement of one glyph inside the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Atlas region in pixels; empty for whitespace.
    pub source: Rect,
    /// Offset from the pen position on the baseline to the bitmap's top-left.
    pub offset: Vec2,
    /// Horizontal pen advance in pixels.
    pub advance: f32,
}

/// Vertical font metrics at the atlas size, y down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of a line to its baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of a line (positive).
    pub descent: f32,
    pub line_gap: f32,
}

impl LineMetrics {
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }
}

/// A font rasterized at one pixel size into a single RGBA texture.
///
/// Lookups of characters that were not rasterized resolve to the fallback
/// glyph.
pub struct FontAtlas {
    face: fontdue::Font,
    size: f32,
    atlas_size: u32,
    metrics: LineMetrics,
    glyphs: HashMap<char, Glyph>,
    fallback: char,
    fallback_glyph: Glyph,
}

impl fmt::Debug for FontAtlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontAtlas")
            .field("size", &self.size)
            .field("atlas_size", &self.atlas_size)
            .field("glyphs", &self.glyphs.len())
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

struct Rasterized {
    ch: char,
    metrics: fontdue::Metrics,
    coverage: Vec<u8>,
}

impl FontAtlas {
    /// Rasterizes `ranges` plus `fallback` from font file bytes at `size` px.
    ///
    /// Returns the atlas and its image (white, coverage in alpha). Characters
    /// the font has no glyph for are left out and resolve to `fallback`.
    pub fn build(
        bytes: &[u8],
        size: f32,
        ranges: &[CharRange],
        fallback: char,
    ) -> Result<(Self, Image), FontError> {
        Self::build_face(bytes, 0, size, ranges, fallback)
    }

    /// Like [`FontAtlas::build`] for face `collection_index` of a font collection.
    pub fn build_face(
        bytes: &[u8],
        collection_index: u32,
        size: f32,
        ranges: &[CharRange],
        fallback: char,
    ) -> Result<(Self, Image), FontError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(FontError::InvalidSize(size));
        }

        let settings = fontdue::FontSettings {
            collection_index,
            scale: size,
            ..fontdue::FontSettings::default()
        };
        let face = fontdue::Font::from_bytes(bytes, settings).map_err(|e| FontError::Parse(e.to_string()))?;

        if face.lookup_glyph_index(fallback) == 0 {
            return Err(FontError::MissingFallback(fallback));
        }

        let mut chars: Vec<char> = ranges.iter().flat_map(|r| r.chars()).collect();
        chars.push(fallback);
        chars.sort_unstable();
        chars.dedup();

        let mut rasterized: Vec<Rasterized> = chars
            .into_iter()
            .filter(|&ch| ch == fallback || face.lookup_glyph_index(ch) != 0)
            .map(|ch| {
                let (metrics, coverage) = face.rasterize(ch, size);
                Rasterized { ch, metrics, coverage }
            })
            .collect();

        // Tallest first keeps shelves tight.
        rasterized.sort_by(|a, b| b.metrics.height.cmp(&a.metrics.height).then(a.ch.cmp(&b.ch)));

        let (atlas_size, positions) = pack(&rasterized)?;

        let mut image = Image::filled(atlas_size, atlas_size, [255, 255, 255, 0]);
        let mut glyphs = HashMap::with_capacity(rasterized.len());

        for (r, pos) in rasterized.iter().zip(positions) {
            let m = &r.metrics;
            let source = match pos {
                Some((x, y)) => {
                    blit_coverage(&mut image, x, y, m.width as u32, m.height as u32, &r.coverage);
                    Rect::new(x as f32, y as f32, m.width as f32, m.height as f32)
                }
                None => Rect::new(0.0, 0.0, 0.0, 0.0),
            };
            glyphs.insert(
                r.ch,
                Glyph {
                    source,
                    offset: Vec2::new(m.xmin as f32, -(m.ymin as f32 + m.height as f32)),
                    advance: m.advance_width,
                },
            );
        }

        let metrics = face
            .horizontal_line_metrics(size)
            .map(|lm| LineMetrics {
                ascent: lm.ascent,
                descent: -lm.descent,
                line_gap: lm.line_gap,
            })
            .unwrap_or(LineMetrics {
                ascent: size * 0.8,
                descent: size * 0.2,
                line_gap: 0.0,
            });

        let fallback_glyph = glyphs
            .get(&fallback)
            .copied()
            .ok_or(FontError::MissingFallback(fallback))?;

        log::debug!(
            "font atlas: {} glyphs at {size}px in {atlas_size}x{atlas_size}",
            glyphs.len()
        );

        Ok((
            Self {
                face,
                size,
                atlas_size,
                metrics,
                glyphs,
                fallback,
                fallback_glyph,
            },
            image,
        ))
    }

    /// Reads a font file and builds an atlas from it.
    pub fn load(
        path: impl AsRef<Path>,
        size: f32,
        ranges: &[CharRange],
        fallback: char,
    ) -> Result<(Self, Image), FontError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::build(&bytes, size, ranges, fallback)
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Side length of the square atlas image.
    #[inline]
    pub fn atlas_size(&self) -> u32 {
        self.atlas_size
    }

    #[inline]
    pub fn fallback(&self) -> char {
        self.fallback
    }

    #[inline]
    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Baseline-to-baseline distance.
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.metrics.line_height()
    }

    /// Size of the block `text` occupies when drawn with this font.
    pub fn measure(&self, text: &str) -> Vec2 {
        measure_text(self, text)
    }
}

impl GlyphMetrics for FontAtlas {
    fn glyph(&self, ch: char) -> (char, &Glyph) {
        match self.glyphs.get(&ch) {
            Some(g) => (ch, g),
            None => (self.fallback, &self.fallback_glyph),
        }
    }

    fn kerning(&self, left: char, right: char) -> f32 {
        self.face.horizontal_kern(left, right, self.size).unwrap_or(0.0)
    }

    fn line_metrics(&self) -> LineMetrics {
        self.metrics
    }
}

/// Finds the smallest power-of-two square that fits every non-empty bitmap.
fn pack(glyphs: &[Rasterized]) -> Result<(u32, Vec<Option<(u32, u32)>>), FontError> {
    let mut side = MIN_ATLAS_SIZE;
    while side <= MAX_ATLAS_SIZE {
        if let Some(positions) = try_pack(glyphs, side) {
            return Ok((side, positions));
        }
        side *= 2;
    }
    Err(FontError::AtlasOverflow { max: MAX_ATLAS_SIZE })
}

fn try_pack(glyphs: &[Rasterized], side: u32) -> Option<Vec<Option<(u32, u32)>>> {
    let mut packer = ShelfPacker::new(side, side, GLYPH_PADDING);
    glyphs
        .iter()
        .map(|g| {
            let (w, h) = (g.metrics.width as u32, g.metrics.height as u32);
            if w == 0 || h == 0 {
                Some(None)
            } else {
                packer.place(w, h).map(Some)
            }
        })
        .collect()
}

fn blit_coverage(image: &mut Image, x: u32, y: u32, w: u32, h: u32, coverage: &[u8]) {
    for row in 0..h {
        for col in 0..w {
            let a = coverage[(row * w + col) as usize];
            if let Some(px) = image.pixel_mut(x + col, y + row) {
                px[3] = a;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_latin_is_printable_ascii() {
        let chars: Vec<char> = CharRange::BASIC_LATIN.chars().collect();
        assert_eq!(chars.len(), 95);
        assert_eq!(chars.first(), Some(&' '));
        assert_eq!(chars.last(), Some(&'~'));
    }

    #[test]
    fn line_height_sums_metrics() {
        let m = LineMetrics { ascent: 18.0, descent: 5.0, line_gap: 2.0 };
        assert_eq!(m.line_height(), 25.0);
    }

    #[test]
    fn rejects_invalid_size_before_parsing() {
        assert!(matches!(
            FontAtlas::build(&[], 0.0, &[CharRange::BASIC_LATIN], '?'),
            Err(FontError::InvalidSize(_))
        ));
        assert!(matches!(
            FontAtlas::build(&[], f32::NAN, &[], '?'),
            Err(FontError::InvalidSize(_))
        ));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = FontAtlas::build(b"not a font", 24.0, &[CharRange::BASIC_LATIN], '?').unwrap_err();
        assert!(matches!(err, FontError::Parse(_)), "{err:?}");
    }

    #[test]
    fn missing_font_file_is_io_error() {
        let err = FontAtlas::load("/nonexistent/wheels.ttf", 24.0, &[], '?').unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn blit_writes_alpha_only() {
        let mut img = Image::filled(4, 4, [255, 255, 255, 0]);
        blit_coverage(&mut img, 1, 2, 2, 1, &[10, 20]);
        assert_eq!(img.pixel_mut(1, 2).unwrap(), &[255, 255, 255, 10]);
        assert_eq!(img.pixel_mut(2, 2).unwrap(), &[255, 255, 255, 20]);
        assert_eq!(img.pixel_mut(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn atlas_packs_and_falls_back() {
        let (atlas, image) = FontAtlas::build(super::super::TEST_FONT, 24.0, &[CharRange::BASIC_LATIN], '?').unwrap();

        assert!(atlas.atlas_size().is_power_of_two());
        assert_eq!((image.width, image.height), (atlas.atlas_size(), atlas.atlas_size()));
        assert!(atlas.has_glyph('A'));

        let (ch, g) = atlas.glyph('\u{4e2d}');
        assert_eq!(ch, '?');
        assert_eq!(*g, *atlas.glyph('?').1);

        let space = atlas.glyph(' ').1;
        assert!(space.source.is_empty());
        assert!(space.advance > 0.0);

        let a = atlas.glyph('A').1;
        assert!(!a.source.is_empty());
        assert!(a.offset.y < 0.0);
        assert!(atlas.line_height() > 0.0);
    }

    #[test]
    fn glyphs_do_not_overlap_in_the_atlas() {
        let (atlas, _) = FontAtlas::build(super::super::TEST_FONT, 32.0, &[CharRange::BASIC_LATIN], '?').unwrap();
        let rects: Vec<Rect> = CharRange::BASIC_LATIN
            .chars()
            .map(|c| atlas.glyph(c).1.source)
            .filter(|r| !r.is_empty())
            .collect();
        assert!(rects.len() > 80);
        for (i, a) in rects.iter().enumerate() {
            assert!(a.right() <= atlas.atlas_size() as f32 && a.bottom() <= atlas.atlas_size() as f32);
            for b in &rects[i + 1..] {
                assert!(a.intersect(*b).is_none(), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn fallback_missing_from_font_is_rejected() {
        let err = FontAtlas::build(super::super::TEST_FONT, 24.0, &[CharRange::BASIC_LATIN], '\u{e000}').unwrap_err();
        assert!(matches!(err, FontError::MissingFallback('\u{e000}')), "{err:?}");
    }
}
