use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::render::WgpuRenderer;
use crate::time::FrameTime;

/// Window handle and metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the window size in logical pixels.
    pub fn logical_size(&self) -> Viewport {
        logical_viewport(self.window)
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

pub(crate) fn logical_viewport(window: &Window) -> Viewport {
    let logical: winit::dpi::LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    Viewport::new(logical.width as f32, logical.height as f32)
}

/// Context passed to [`App::on_start`](super::App::on_start).
pub struct StartCtx<'a> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut WgpuRenderer,
    pub adapter: wgpu::AdapterInfo,
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Work submitted to `renderer` is presented when the callback returns.
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut WgpuRenderer,
    pub time: FrameTime,
}
