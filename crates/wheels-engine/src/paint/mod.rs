//! Color model shared by the batcher and the renderers.
//!
//! Vertex colors are linear premultiplied alpha; texture pixels come in as
//! straight-alpha sRGB bytes and are premultiplied on upload.

pub mod color;

pub use color::{premultiply_srgb8, Color};
