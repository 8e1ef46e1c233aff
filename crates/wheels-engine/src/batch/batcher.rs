use crate::coords::{Rect, Transform2D, Vec2};
use crate::paint::Color;
use crate::render::{GraphicsState, Image, Renderer, SamplerState, ScissorRect, Texture, Vertex};
use crate::text::{FontAtlas, GlyphQuad};

use super::BatchError;

/// Handle to a font added to a [`Batcher`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) u32);

/// Diagnostics of the last [`Batcher::finish`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BatchStats {
    pub vertices_submitted: usize,
    pub indices_submitted: usize,
    pub batch_count: usize,
}

/// A closed, state-homogeneous index range.
#[derive(Debug, Copy, Clone, PartialEq)]
struct BatchInfo {
    state: GraphicsState,
    start_index: u32,
    index_count: u32,
}

pub(crate) struct LoadedFont {
    pub(crate) atlas: FontAtlas,
    pub(crate) texture: Texture,
}

/// Immediate-mode 2D batcher.
///
/// Primitives drawn between [`start`](Batcher::start) and
/// [`finish`](Batcher::finish) are turned into vertices and indices in
/// submission order. A new batch begins when a primitive is emitted under a
/// graphics state (texture, sampler, scissor) different from the open
/// batch's; state changes with nothing drawn in between never split.
///
/// Untextured primitives sample the active texture over uv `(0,0)..(1,1)`, so
/// callers set a 1x1 white texture before drawing plain shapes.
pub struct Batcher {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    batches: Vec<BatchInfo>,
    /// First index of the open batch.
    batch_start: u32,
    /// State the open batch was recorded with.
    batch_state: Option<GraphicsState>,

    texture: Option<Texture>,
    sampler: SamplerState,
    scissor: Option<ScissorRect>,
    /// Rect from [`set_scissor`](Batcher::set_scissor); parent of the first push.
    scissor_base: Option<Rect>,
    /// Effective scissor rects, each already intersected with its parent.
    scissor_stack: Vec<Rect>,
    transform: Transform2D,

    /// Indexed by [`FontId`]; removed fonts leave a hole.
    pub(crate) fonts: Vec<Option<LoadedFont>>,
    pub(crate) font: Option<FontId>,
    pub(crate) glyph_scratch: Vec<GlyphQuad>,

    started: bool,
    stats: BatchStats,

    warned_not_started: bool,
    warned_no_texture: bool,
    pub(crate) warned_no_font: bool,
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Batcher {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            batches: Vec::new(),
            batch_start: 0,
            batch_state: None,
            texture: None,
            sampler: SamplerState::default(),
            scissor: None,
            scissor_base: None,
            scissor_stack: Vec::new(),
            transform: Transform2D::IDENTITY,
            fonts: Vec::new(),
            font: None,
            glyph_scratch: Vec::new(),
            started: false,
            stats: BatchStats::default(),
            warned_not_started: false,
            warned_no_texture: false,
            warned_no_font: false,
        }
    }

    /// Begins recording a frame. Clears geometry from the previous frame;
    /// graphics state and transform carry over.
    pub fn start(&mut self) -> Result<(), BatchError> {
        if self.started {
            return Err(BatchError::AlreadyStarted);
        }
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
        self.batch_start = 0;
        self.batch_state = None;
        self.started = true;
        Ok(())
    }

    /// Closes the open batch and submits everything recorded since
    /// [`start`](Batcher::start) to `renderer`.
    pub fn finish<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<BatchStats, BatchError> {
        if !self.started {
            return Err(BatchError::NotStarted);
        }
        self.close_batch();
        self.started = false;

        if !self.batches.is_empty() {
            renderer.begin_render(&self.vertices, &self.indices);
            for b in &self.batches {
                renderer.draw_batch(&b.state, b.start_index, b.index_count);
            }
            renderer.end_render();
        }

        self.stats = BatchStats {
            vertices_submitted: self.vertices.len(),
            indices_submitted: self.indices.len(),
            batch_count: self.batches.len(),
        };
        log::trace!("batch finished: {:?}", self.stats);
        Ok(self.stats)
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Diagnostics of the last finished frame.
    #[inline]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Vertices recorded so far in this frame.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    // ---- graphics state -------------------------------------------------

    #[inline]
    pub fn texture(&self) -> Option<Texture> {
        self.texture
    }

    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
    }

    #[inline]
    pub fn sampler(&self) -> SamplerState {
        self.sampler
    }

    pub fn set_sampler(&mut self, sampler: SamplerState) {
        self.sampler = sampler;
    }

    #[inline]
    pub fn scissor(&self) -> Option<ScissorRect> {
        self.scissor
    }

    /// Sets the scissor rect in logical pixels; `None` disables clipping.
    /// Replaces any pushed scissor regions and becomes the parent of later
    /// pushes.
    pub fn set_scissor(&mut self, rect: Option<Rect>) {
        self.scissor_stack.clear();
        self.scissor_base = rect;
        self.scissor = rect.map(ScissorRect::from_rect);
    }

    /// Begins a nested scissor region, intersected with the current one.
    pub fn push_scissor(&mut self, rect: Rect) {
        let effective = match self.scissor_parent() {
            None => rect,
            Some(parent) => parent.intersect(rect).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
        };
        self.scissor_stack.push(effective);
        self.scissor = Some(ScissorRect::from_rect(effective));
    }

    /// Ends the most recent [`push_scissor`](Batcher::push_scissor) region.
    pub fn pop_scissor(&mut self) {
        debug_assert!(!self.scissor_stack.is_empty(), "pop_scissor without push_scissor");
        self.scissor_stack.pop();
        self.scissor = self.scissor_parent().map(ScissorRect::from_rect);
    }

    fn scissor_parent(&self) -> Option<Rect> {
        self.scissor_stack.last().copied().or(self.scissor_base)
    }

    #[inline]
    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    /// Sets the transform applied to every vertex emitted afterwards.
    #[inline]
    pub fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
    }

    #[inline]
    pub fn reset_transform(&mut self) {
        self.transform = Transform2D::IDENTITY;
    }

    /// Current graphics state, if a texture is set.
    pub fn graphics_state(&self) -> Option<GraphicsState> {
        self.texture.map(|t| GraphicsState {
            texture: t.id,
            sampler: self.sampler,
            scissor: self.scissor,
        })
    }

    // ---- fonts ----------------------------------------------------------

    /// Adds a font whose atlas image is already registered as `texture`.
    pub fn add_font(&mut self, atlas: FontAtlas, texture: Texture) -> FontId {
        let id = FontId(self.fonts.len() as u32);
        self.fonts.push(Some(LoadedFont { atlas, texture }));
        id
    }

    /// Registers the atlas image with `renderer` and adds the font.
    pub fn register_font<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        atlas: FontAtlas,
        image: &Image,
    ) -> Result<FontId, BatchError> {
        let texture = image.register(renderer)?;
        Ok(self.add_font(atlas, texture))
    }

    /// Selects the font used by [`draw_text`](Batcher::draw_text).
    pub fn set_font(&mut self, id: FontId) -> Result<(), BatchError> {
        if self.loaded_font(id).is_none() {
            return Err(BatchError::InvalidFontId(id));
        }
        self.font = Some(id);
        Ok(())
    }

    /// Removes a font and returns its atlas texture, which the caller
    /// releases. Clears the current font if it was `id`.
    pub fn remove_font(&mut self, id: FontId) -> Option<Texture> {
        let removed = self.fonts.get_mut(id.0 as usize).and_then(Option::take)?;
        if self.font == Some(id) {
            self.font = None;
        }
        Some(removed.texture)
    }

    #[inline]
    pub fn font(&self) -> Option<FontId> {
        self.font
    }

    pub fn font_atlas(&self, id: FontId) -> Option<&FontAtlas> {
        self.loaded_font(id).map(|f| &f.atlas)
    }

    pub(crate) fn loaded_font(&self, id: FontId) -> Option<&LoadedFont> {
        self.fonts.get(id.0 as usize).and_then(Option::as_ref)
    }

    // ---- emission -------------------------------------------------------

    /// Closes the open batch if it holds any indices.
    fn close_batch(&mut self) {
        let end = self.indices.len() as u32;
        if end == self.batch_start {
            return;
        }
        if let Some(state) = self.batch_state {
            self.batches.push(BatchInfo {
                state,
                start_index: self.batch_start,
                index_count: end - self.batch_start,
            });
        }
        self.batch_start = end;
    }

    /// Starts a new batch if the current state differs from the open one.
    fn sync_batch_state(&mut self) {
        let state = self.graphics_state();
        if state != self.batch_state {
            self.close_batch();
            self.batch_state = state;
        }
    }

    /// Checks that drawing is possible right now, warning once otherwise.
    pub(crate) fn can_draw(&mut self) -> bool {
        if !self.started {
            if !self.warned_not_started {
                log::warn!("Batcher: draw call outside start()/finish(); skipped");
                self.warned_not_started = true;
            }
            return false;
        }
        if self.texture.is_none() {
            if !self.warned_no_texture {
                log::warn!("Batcher: no texture set; draw skipped (set a blank texture for plain shapes)");
                self.warned_no_texture = true;
            }
            return false;
        }
        self.sync_batch_state();
        true
    }

    /// Pushes a transformed vertex and returns its index.
    #[inline]
    pub(crate) fn push_vertex(&mut self, position: Vec2, uv: [f32; 2], color: Color) -> u32 {
        let p = self.transform.transform_point(position);
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new([p.x, p.y], uv, color.to_array()));
        index
    }

    #[inline]
    pub(crate) fn push_indices(&mut self, indices: &[u32]) {
        self.indices.extend_from_slice(indices);
    }

    /// Pushes a quad given clockwise corners starting top-left.
    pub(crate) fn push_quad(&mut self, corners: [Vec2; 4], uv_min: [f32; 2], uv_max: [f32; 2], color: Color) {
        let uvs = [
            uv_min,
            [uv_max[0], uv_min[1]],
            uv_max,
            [uv_min[0], uv_max[1]],
        ];
        let first = self.push_vertex(corners[0], uvs[0], color);
        for (c, uv) in corners.iter().zip(uvs).skip(1) {
            self.push_vertex(*c, uv, color);
        }
        self.push_indices(&[first, first + 1, first + 2, first, first + 2, first + 3]);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;

    pub(crate) fn setup() -> (Batcher, HeadlessRenderer, Texture, Texture) {
        let mut r = HeadlessRenderer::default();
        let blank = Image::blank().register(&mut r).unwrap();
        let other = Image::filled(2, 2, [255, 0, 0, 255]).register(&mut r).unwrap();
        (Batcher::new(), r, blank, other)
    }

    fn unit() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn start_twice_and_finish_without_start_fail() {
        let (mut b, mut r, ..) = setup();
        assert!(matches!(b.finish(&mut r), Err(BatchError::NotStarted)));
        b.start().unwrap();
        assert!(matches!(b.start(), Err(BatchError::AlreadyStarted)));
        b.finish(&mut r).unwrap();
        assert!(matches!(b.finish(&mut r), Err(BatchError::NotStarted)));
    }

    #[test]
    fn empty_frame_submits_nothing() {
        let (mut b, mut r, ..) = setup();
        b.start().unwrap();
        let stats = b.finish(&mut r).unwrap();
        assert_eq!(stats, BatchStats::default());
        assert_eq!(r.frame().renders, 0);
    }

    #[test]
    fn quad_counts_and_submission() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.fill_rect(unit(), Color::white());
        let stats = b.finish(&mut r).unwrap();

        assert_eq!(stats, BatchStats { vertices_submitted: 4, indices_submitted: 6, batch_count: 1 });
        let frame = r.take_frame();
        assert_eq!(frame.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.draws[0].state.texture, blank.id);
        assert_eq!(frame.draws[0].index_count, 6);
    }

    #[test]
    fn state_changes_split_batches() {
        let (mut b, mut r, blank, other) = setup();
        b.start().unwrap();
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        b.set_texture(other);
        b.fill_rect(unit(), Color::white());
        b.set_sampler(SamplerState::PointClamp);
        b.fill_rect(unit(), Color::white());
        b.set_scissor(Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        b.fill_rect(unit(), Color::white());
        let stats = b.finish(&mut r).unwrap();

        assert_eq!(stats.batch_count, 4);
        let draws = &r.frame().draws;
        assert_eq!(draws.iter().map(|d| d.first_index).collect::<Vec<_>>(), vec![0, 6, 12, 18]);
        assert_eq!(draws[0].state.texture, blank.id);
        assert_eq!(draws[1].state.texture, other.id);
        assert_eq!(draws[2].state.sampler, SamplerState::PointClamp);
        assert_eq!(draws[3].state.scissor, Some(ScissorRect { x: 0, y: 0, width: 5, height: 5 }));
    }

    #[test]
    fn redundant_or_empty_state_changes_do_not_split() {
        let (mut b, mut r, blank, other) = setup();
        b.start().unwrap();
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        b.set_texture(blank);
        b.set_sampler(SamplerState::LinearClamp);
        b.fill_rect(unit(), Color::white());
        // Changes with nothing drawn in between collapse.
        b.set_texture(other);
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        assert_eq!(b.finish(&mut r).unwrap().batch_count, 1);
    }

    #[test]
    fn returning_to_the_open_state_keeps_one_batch() {
        let (mut b, mut r, blank, other) = setup();
        b.start().unwrap();
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        b.set_texture(other);
        b.set_sampler(SamplerState::PointClamp);
        b.set_scissor(Some(unit()));
        b.set_scissor(None);
        b.set_sampler(SamplerState::LinearClamp);
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        b.set_texture(other);
        let stats = b.finish(&mut r).unwrap();

        assert_eq!(stats.batch_count, 1);
        let draws = &r.frame().draws;
        assert_eq!(draws[0].state.texture, blank.id);
        assert_eq!(draws[0].index_count, 12);
    }

    #[test]
    fn transform_is_applied_to_vertices() {
        let (mut b, _r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.set_transform(Transform2D::translation(5.0, 7.0));
        b.fill_rect(unit(), Color::white());
        b.reset_transform();
        b.fill_rect(unit(), Color::white());
        assert_eq!(b.vertices()[0].position, [5.0, 7.0]);
        assert_eq!(b.vertices()[2].position, [15.0, 17.0]);
        assert_eq!(b.vertices()[4].position, [0.0, 0.0]);
    }

    #[test]
    fn draws_without_texture_or_start_are_skipped() {
        let (mut b, mut r, blank, _) = setup();
        b.fill_rect(unit(), Color::white());
        b.start().unwrap();
        b.fill_rect(unit(), Color::white());
        assert!(b.vertices().is_empty());
        b.set_texture(blank);
        b.fill_rect(unit(), Color::white());
        assert_eq!(b.finish(&mut r).unwrap().vertices_submitted, 4);
    }

    #[test]
    fn stats_reset_each_frame() {
        let (mut b, mut r, blank, _) = setup();
        b.set_texture(blank);
        b.start().unwrap();
        b.fill_rect(unit(), Color::white());
        b.fill_rect(unit(), Color::white());
        assert_eq!(b.finish(&mut r).unwrap().indices_submitted, 12);

        b.start().unwrap();
        b.fill_rect(unit(), Color::white());
        let stats = b.finish(&mut r).unwrap();
        assert_eq!(stats.indices_submitted, 6);
        assert_eq!(b.stats(), stats);
        // Texture persists across frames.
        assert_eq!(r.frame().draws[1].state.texture, blank.id);
    }

    #[test]
    fn nested_scissors_intersect_and_restore() {
        let (mut b, _r, ..) = setup();
        b.push_scissor(Rect::new(0.0, 0.0, 100.0, 100.0));
        b.push_scissor(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(b.scissor(), Some(ScissorRect { x: 50, y: 50, width: 50, height: 50 }));
        b.pop_scissor();
        assert_eq!(b.scissor(), Some(ScissorRect { x: 0, y: 0, width: 100, height: 100 }));
        b.pop_scissor();
        assert_eq!(b.scissor(), None);
    }

    #[test]
    fn pushed_scissor_intersects_with_set_scissor() {
        let (mut b, _r, ..) = setup();
        b.set_scissor(Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        b.push_scissor(Rect::new(5.0, 5.0, 100.0, 100.0));
        assert_eq!(b.scissor(), Some(ScissorRect { x: 5, y: 5, width: 5, height: 5 }));
        b.pop_scissor();
        assert_eq!(b.scissor(), Some(ScissorRect { x: 0, y: 0, width: 10, height: 10 }));

        b.set_scissor(None);
        b.push_scissor(Rect::new(5.0, 5.0, 100.0, 100.0));
        assert_eq!(b.scissor(), Some(ScissorRect { x: 5, y: 5, width: 100, height: 100 }));
        b.pop_scissor();
        assert_eq!(b.scissor(), None);
    }

    #[test]
    fn set_font_rejects_foreign_ids() {
        let mut b = Batcher::new();
        assert!(matches!(b.set_font(FontId(3)), Err(BatchError::InvalidFontId(FontId(3)))));
    }
}
