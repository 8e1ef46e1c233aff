use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once after the window, device and renderer exist. Register
    /// textures and fonts here. An error stops the runtime.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame, before the frame is presented. An error stops
    /// the runtime and is returned from `Runtime::run`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl>;
}
