use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{logical_viewport, App, AppControl, FrameCtx, StartCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::render::{FrameOutcome, WgpuRenderer};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Outer position in logical pixels; platform default when `None`.
    pub position: Option<LogicalPosition<f64>>,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "wheels".to_string(),
            position: None,
            initial_size: LogicalSize::new(960.0, 540.0),
            resizable: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until the window closes or the app
    /// exits.
    ///
    /// Each redraw: tick the clock, run `on_frame`, present ("swap buffers"),
    /// then block until the device is idle. The first fatal error (window,
    /// device or renderer creation, `on_start`, `on_frame`, presentation) ends
    /// the loop and is returned.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything that lives as long as the window.
struct Session {
    entry: WindowEntry,
    renderer: WgpuRenderer,
    clock: FrameClock,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    session: Option<Session>,
    fatal: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            session: None,
            fatal: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Records the first fatal error and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.session = None;
        self.request_exit(event_loop);
    }

    fn create_session(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);
        if let Some(pos) = self.config.position {
            attrs = attrs.with_position(pos);
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let mut renderer = entry.with_gpu(|gpu| {
            WgpuRenderer::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format())
        });
        let (viewport, scale) = entry.with_window(|w| (logical_viewport(w), w.scale_factor() as f32));
        renderer.set_viewport(viewport, scale);

        log::info!(
            "window {:?} created ({}x{} logical)",
            self.config.title,
            viewport.width,
            viewport.height
        );

        Ok(Session {
            entry,
            renderer,
            clock: FrameClock::new(),
        })
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut session = self.create_session(event_loop)?;

        let app = &mut self.app;
        let Session { entry, renderer, clock } = &mut session;
        let adapter = entry.with_gpu(|gpu| gpu.adapter_info());
        entry
            .with_window(|window| {
                let mut ctx = StartCtx {
                    window: WindowCtx { id: window.id(), window },
                    renderer,
                    adapter,
                };
                app.on_start(&mut ctx)
            })
            .context("application start failed")?;

        // Loading time does not count as the first frame's delta.
        clock.reset();
        entry.with_window(|w| w.request_redraw());

        self.session = Some(session);
        Ok(())
    }

    /// Runs one frame: app callback, present, wait for idle.
    fn frame(&mut self) -> Result<AppControl> {
        let app = &mut self.app;
        let Some(Session { entry, renderer, clock }) = self.session.as_mut() else {
            return Ok(AppControl::Continue);
        };

        entry.with_mut(|fields| -> Result<AppControl> {
            let window: &Window = fields.window;
            if is_minimized(window.inner_size()) {
                return Ok(AppControl::Continue);
            }

            renderer.set_viewport(logical_viewport(window), window.scale_factor() as f32);
            let time = clock.tick();

            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx { id: window.id(), window },
                    renderer: &mut *renderer,
                    time,
                };
                app.on_frame(&mut ctx)?
            };

            window.pre_present_notify();
            if renderer.present(fields.gpu)? == FrameOutcome::Skipped {
                log::debug!("frame {} skipped", time.frame_index);
            }
            fields.gpu.wait_idle()?;

            Ok(control)
        })
    }

    fn resize_to_window(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.entry.with_mut(|fields| {
                fields.gpu.resize(fields.window.inner_size());
                fields.window.request_redraw();
            });
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw, paused while minimized; the restoring resize
        // requests the next frame.
        if let Some(session) = self.session.as_ref() {
            session.entry.with_window(|w| {
                if !is_minimized(w.inner_size()) {
                    w.request_redraw();
                }
            });
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.session = None;
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.session = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize_to_window();
            }

            WindowEvent::RedrawRequested => match self.frame() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => {
                    self.session = None;
                    self.request_exit(event_loop);
                }
                Err(e) => self.fail(event_loop, e),
            },

            _ => {}
        }
    }
}

/// A minimized window reports a zero-sized surface on most platforms.
fn is_minimized(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}
