/// Shelf packer for glyph bitmaps.
///
/// Rectangles are placed left to right on the current shelf; when one does
/// not fit horizontally a new shelf starts below the tallest rectangle of the
/// previous one. `padding` pixels separate rectangles from each other and from
/// the atlas border.
#[derive(Debug, Clone)]
pub(crate) struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub(crate) fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            cursor_x: padding,
            cursor_y: padding,
            row_height: 0,
        }
    }

    /// Returns the top-left corner for a `w x h` rectangle, or `None` when the
    /// atlas is full.
    pub(crate) fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.padding * 2 + w > self.width {
            return None;
        }

        if self.cursor_x + w + self.padding > self.width {
            self.cursor_y += self.row_height + self.padding;
            self.cursor_x = self.padding;
            self.row_height = 0;
        }

        if self.cursor_y + h + self.padding > self.height {
            return None;
        }

        let pos = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
        a.0 < b.0 + b.2 && b.0 < a.0 + a.2 && a.1 < b.1 + b.3 && b.1 < a.1 + a.3
    }

    #[test]
    fn first_rect_starts_after_padding() {
        let mut p = ShelfPacker::new(64, 64, 1);
        assert_eq!(p.place(10, 10), Some((1, 1)));
        assert_eq!(p.place(10, 5), Some((12, 1)));
    }

    #[test]
    fn wraps_to_next_shelf_below_tallest() {
        let mut p = ShelfPacker::new(32, 64, 1);
        p.place(20, 12).unwrap();
        // 1 + 20 + 1 + 20 + 1 > 32 -> new shelf at y = 1 + 12 + 1.
        assert_eq!(p.place(20, 4), Some((1, 14)));
    }

    #[test]
    fn reports_full_atlas() {
        let mut p = ShelfPacker::new(16, 16, 1);
        assert!(p.place(14, 14).is_some());
        assert_eq!(p.place(14, 14), None);
        assert_eq!(ShelfPacker::new(16, 16, 1).place(15, 1), None);
    }

    #[test]
    fn placements_never_overlap_and_keep_padding() {
        let mut p = ShelfPacker::new(128, 128, 1);
        let mut placed = Vec::new();
        for i in 0..60u32 {
            let (w, h) = (3 + i % 7, 4 + i % 5);
            if let Some((x, y)) = p.place(w, h) {
                // Grow by the padding so touching rects count as overlapping.
                placed.push((x, y, w + 1, h + 1));
                assert!(x + w < 128 && y + h < 128);
            }
        }
        assert!(placed.len() > 40);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!overlaps(*a, *b), "{a:?} overlaps {b:?}");
            }
        }
    }
}
