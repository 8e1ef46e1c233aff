use crate::coords::Viewport;
use crate::paint::Color;

use super::{validate_texture_data, GraphicsState, Renderer, Texture, TextureError, TextureId, Vertex};

/// One `draw_batch` call as seen by the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RecordedDraw {
    pub state: GraphicsState,
    /// Index into [`RecordedFrame::indices`].
    pub first_index: u32,
    pub index_count: u32,
    /// Offset added to every index of this draw.
    pub base_vertex: u32,
}

/// Everything submitted since the last [`HeadlessRenderer::take_frame`].
#[derive(Debug, Default, Clone)]
pub struct RecordedFrame {
    pub clears: Vec<Color>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub draws: Vec<RecordedDraw>,
    /// Number of `begin_render`/`end_render` pairs.
    pub renders: usize,
}

/// Renderer that records submissions instead of touching a GPU.
///
/// Used by tests and headless smoke runs of the samples.
#[derive(Debug)]
pub struct HeadlessRenderer {
    viewport: Viewport,
    textures: Vec<Option<(u32, u32)>>,
    frame: RecordedFrame,
    base: Option<(u32, u32)>,
}

impl HeadlessRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            textures: Vec::new(),
            frame: RecordedFrame::default(),
            base: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn frame(&self) -> &RecordedFrame {
        &self.frame
    }

    /// Returns the recorded frame and starts a new one.
    pub fn take_frame(&mut self) -> RecordedFrame {
        debug_assert!(self.base.is_none(), "take_frame inside begin_render/end_render");
        std::mem::take(&mut self.frame)
    }

    /// Number of live (not released) textures.
    pub fn texture_count(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(Viewport::new(960.0, 540.0))
    }
}

impl Renderer for HeadlessRenderer {
    fn register_texture(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<Texture, TextureError> {
        validate_texture_data(rgba, width, height)?;
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Some((width, height)));
        Ok(Texture { id, width, height })
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(slot) = self.textures.get_mut(id.index()) {
            *slot = None;
        }
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id.index()).copied().flatten()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self, color: Color) {
        self.frame.clears.push(color);
    }

    fn begin_render(&mut self, vertices: &[Vertex], indices: &[u32]) {
        debug_assert!(self.base.is_none(), "begin_render called twice");
        self.base = Some((self.frame.vertices.len() as u32, self.frame.indices.len() as u32));
        self.frame.vertices.extend_from_slice(vertices);
        self.frame.indices.extend_from_slice(indices);
    }

    fn draw_batch(&mut self, state: &GraphicsState, start_index: u32, index_count: u32) {
        let Some((base_vertex, base_index)) = self.base else {
            log::warn!("HeadlessRenderer: draw_batch outside begin_render; ignored");
            return;
        };
        self.frame.draws.push(RecordedDraw {
            state: *state,
            first_index: base_index + start_index,
            index_count,
            base_vertex,
        });
    }

    fn end_render(&mut self) {
        self.base = None;
        self.frame.renders += 1;
    }
}
