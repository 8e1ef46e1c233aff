//! Wheels engine crate.
//!
//! An immediate-mode 2D batching renderer: a single-window runtime on
//! `winit`, a `wgpu` graphics device, a batcher that turns shapes, sprites and
//! text into state-sorted draw calls, and font atlases built with `fontdue`.

pub mod batch;
pub mod core;
pub mod device;
pub mod render;
pub mod text;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
