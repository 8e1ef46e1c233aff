use crate::coords::{Rect, Vec2};

use super::{Glyph, LineMetrics};

/// Horizontal placement of each line relative to the text origin.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the text block relative to the text origin.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

impl HorizontalAlignment {
    #[inline]
    fn factor(self) -> f32 {
        match self {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => 0.5,
            HorizontalAlignment::Right => 1.0,
        }
    }
}

impl VerticalAlignment {
    #[inline]
    fn factor(self) -> f32 {
        match self {
            VerticalAlignment::Top => 0.0,
            VerticalAlignment::Center => 0.5,
            VerticalAlignment::Bottom => 1.0,
        }
    }
}

/// Glyph source for layout.
pub trait GlyphMetrics {
    /// Returns the glyph for `ch`, or the fallback glyph together with the
    /// fallback character.
    fn glyph(&self, ch: char) -> (char, &Glyph);

    fn kerning(&self, _left: char, _right: char) -> f32 {
        0.0
    }

    fn line_metrics(&self) -> LineMetrics;
}

/// One visible glyph: where it goes and which atlas region it samples.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub dest: Rect,
    pub source: Rect,
}

const TAB_WIDTH_IN_SPACES: f32 = 4.0;

fn line_width<G: GlyphMetrics + ?Sized>(font: &G, line: &str) -> f32 {
    let mut width = 0.0;
    let mut prev: Option<char> = None;
    for ch in line.chars() {
        if ch == '\r' {
            continue;
        }
        if ch == '\t' {
            width += font.glyph(' ').1.advance * TAB_WIDTH_IN_SPACES;
            prev = None;
            continue;
        }
        let (resolved, glyph) = font.glyph(ch);
        if let Some(p) = prev {
            width += font.kerning(p, resolved);
        }
        width += glyph.advance;
        prev = Some(resolved);
    }
    width
}

/// Size of the block `text` occupies: widest line by the height of all lines.
pub fn measure_text<G: GlyphMetrics + ?Sized>(font: &G, text: &str) -> Vec2 {
    let m = font.line_metrics();
    let mut lines = 0usize;
    let mut width: f32 = 0.0;
    for line in text.split('\n') {
        lines += 1;
        width = width.max(line_width(font, line));
    }
    let height = (lines - 1) as f32 * m.line_height() + m.ascent + m.descent;
    Vec2::new(width, height)
}

/// Lays out `text` at `origin`, appending one quad per visible glyph to `out`.
///
/// Lines are aligned individually; the whole block is aligned vertically.
/// Glyph positions are snapped to whole pixels before any transform.
pub fn layout_text<G: GlyphMetrics + ?Sized>(
    font: &G,
    text: &str,
    origin: Vec2,
    h_align: HorizontalAlignment,
    v_align: VerticalAlignment,
    out: &mut Vec<GlyphQuad>,
) {
    let m = font.line_metrics();
    let block = measure_text(font, text);
    let top = origin.y - block.y * v_align.factor();

    for (i, line) in text.split('\n').enumerate() {
        let baseline = (top + m.ascent + i as f32 * m.line_height()).round();
        let mut pen_x = origin.x - line_width(font, line) * h_align.factor();
        let mut prev: Option<char> = None;

        for ch in line.chars() {
            if ch == '\r' {
                continue;
            }
            if ch == '\t' {
                pen_x += font.glyph(' ').1.advance * TAB_WIDTH_IN_SPACES;
                prev = None;
                continue;
            }
            let (resolved, glyph) = font.glyph(ch);
            if let Some(p) = prev {
                pen_x += font.kerning(p, resolved);
            }
            if !glyph.source.is_empty() {
                let dest = Rect::new(
                    (pen_x + glyph.offset.x).round(),
                    baseline + glyph.offset.y,
                    glyph.source.size.x,
                    glyph.source.size.y,
                );
                out.push(GlyphQuad { dest, source: glyph.source });
            }
            pen_x += glyph.advance;
            prev = Some(resolved);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Monospace test font: every glyph is 8x10, advance 10, ascent 12,
    /// descent 4, gap 2. Only 'A'..='Z' and ' ' exist; '?' is the fallback.
    pub(crate) struct FixedFont {
        letter: Glyph,
        space: Glyph,
    }

    impl FixedFont {
        pub(crate) fn new() -> Self {
            Self {
                letter: Glyph {
                    source: Rect::new(1.0, 1.0, 8.0, 10.0),
                    offset: Vec2::new(1.0, -10.0),
                    advance: 10.0,
                },
                space: Glyph {
                    source: Rect::new(0.0, 0.0, 0.0, 0.0),
                    offset: Vec2::zero(),
                    advance: 10.0,
                },
            }
        }
    }

    impl GlyphMetrics for FixedFont {
        fn glyph(&self, ch: char) -> (char, &Glyph) {
            match ch {
                ' ' => (' ', &self.space),
                'A'..='Z' => (ch, &self.letter),
                _ => ('?', &self.letter),
            }
        }

        fn kerning(&self, left: char, right: char) -> f32 {
            if (left, right) == ('A', 'V') { -2.0 } else { 0.0 }
        }

        fn line_metrics(&self) -> LineMetrics {
            LineMetrics { ascent: 12.0, descent: 4.0, line_gap: 2.0 }
        }
    }

    fn layout(text: &str, h: HorizontalAlignment, v: VerticalAlignment) -> Vec<GlyphQuad> {
        let mut out = Vec::new();
        layout_text(&FixedFont::new(), text, Vec2::new(100.0, 100.0), h, v, &mut out);
        out
    }

    #[test]
    fn measure_single_and_multi_line() {
        let f = FixedFont::new();
        assert_eq!(measure_text(&f, "ABC"), Vec2::new(30.0, 16.0));
        // Widest line wins; one extra line height of 18.
        assert_eq!(measure_text(&f, "AB\nABCD"), Vec2::new(40.0, 34.0));
        assert_eq!(measure_text(&f, ""), Vec2::new(0.0, 16.0));
    }

    #[test]
    fn kerning_is_applied() {
        let f = FixedFont::new();
        assert_eq!(measure_text(&f, "AV").x, 18.0);
        let quads = layout("AV", HorizontalAlignment::Left, VerticalAlignment::Top);
        assert_eq!(quads[1].dest.origin.x - quads[0].dest.origin.x, 8.0);
    }

    #[test]
    fn whitespace_advances_without_quads() {
        let quads = layout("A B", HorizontalAlignment::Left, VerticalAlignment::Top);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].dest.origin.x - quads[0].dest.origin.x, 20.0);
    }

    #[test]
    fn top_left_places_glyph_below_origin() {
        let quads = layout("A", HorizontalAlignment::Left, VerticalAlignment::Top);
        // baseline = 100 + ascent; glyph top = baseline - 10.
        assert_eq!(quads[0].dest, Rect::new(101.0, 102.0, 8.0, 10.0));
    }

    #[test]
    fn alignment_offsets_follow_block_size() {
        let left = layout("AB", HorizontalAlignment::Left, VerticalAlignment::Top);
        let center = layout("AB", HorizontalAlignment::Center, VerticalAlignment::Center);
        let right = layout("AB", HorizontalAlignment::Right, VerticalAlignment::Bottom);

        // Block is 20 x 16.
        assert_eq!(center[0].dest.origin - left[0].dest.origin, Vec2::new(-10.0, -8.0));
        assert_eq!(right[0].dest.origin - left[0].dest.origin, Vec2::new(-20.0, -16.0));
    }

    #[test]
    fn lines_are_aligned_individually() {
        let quads = layout("AB\nA", HorizontalAlignment::Right, VerticalAlignment::Top);
        assert_eq!(quads.len(), 3);
        // Each line ends at the origin.
        assert_eq!(quads[1].dest.origin.x, 100.0 - 10.0 + 1.0);
        assert_eq!(quads[2].dest.origin.x, 100.0 - 10.0 + 1.0);
        assert_eq!(quads[2].dest.origin.y - quads[0].dest.origin.y, 18.0);
    }

    #[test]
    fn unknown_chars_use_fallback() {
        let quads = layout("a", HorizontalAlignment::Left, VerticalAlignment::Top);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].source, Rect::new(1.0, 1.0, 8.0, 10.0));
    }
}
