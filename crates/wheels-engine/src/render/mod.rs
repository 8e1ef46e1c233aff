//! Rendering backends.
//!
//! The batcher talks to a [`Renderer`]: it registers textures and submits
//! vertex/index data plus per-batch [`GraphicsState`]. [`WgpuRenderer`] draws
//! to the window surface; [`HeadlessRenderer`] only records.
//!
//! Convention:
//! - geometry is in logical pixels (top-left origin, +Y down)
//! - the vertex shader converts to NDC using a viewport uniform

mod batch_renderer;
mod common;
mod headless;
mod image_data;
mod renderer;
mod vertex;

pub use batch_renderer::{FrameOutcome, WgpuRenderer};
pub use headless::{HeadlessRenderer, RecordedDraw, RecordedFrame};
pub use image_data::Image;
pub use renderer::{
    validate_texture_data, GraphicsState, Renderer, SamplerState, ScissorRect, Texture,
    TextureError, TextureId,
};
pub use vertex::Vertex;
