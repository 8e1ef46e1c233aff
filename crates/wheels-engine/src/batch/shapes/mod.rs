mod circle;
mod line;
mod rect;
mod sprite;
mod triangle;

/// uv span sampled by untextured primitives.
pub(crate) const FULL_UV_MIN: [f32; 2] = [0.0, 0.0];
pub(crate) const FULL_UV_MAX: [f32; 2] = [1.0, 1.0];
