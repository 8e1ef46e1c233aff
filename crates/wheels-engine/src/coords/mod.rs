//! Coordinate and geometry types shared by the batcher and the renderers.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The renderer converts to NDC in the vertex shader using a viewport uniform.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use transform::Transform2D;
pub use vec2::Vec2;
pub use viewport::Viewport;
