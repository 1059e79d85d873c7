//! Window + event pump.
//!
//! Owns the `winit` event loop and window and brings the device context up
//! once the window exists.

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::{AppConfig, WindowConfig};
use crate::device_context::DeviceContext;

/// Opens the window, brings up the device context and polls events until the
/// window is closed. The context is torn down before the window.
pub fn run(window_config: WindowConfig, app_config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = AppState::new(window_config, app_config);
    event_loop
        .run_app(&mut state)
        .context("winit event loop terminated with error")?;

    match state.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    window_config: WindowConfig,
    app_config: AppConfig,

    // Declared before `window` so the surface goes first.
    context: Option<DeviceContext>,
    window: Option<Window>,

    error: Option<anyhow::Error>,
}

impl AppState {
    fn new(window_config: WindowConfig, app_config: AppConfig) -> Self {
        Self {
            window_config,
            app_config,
            context: None,
            window: None,
            error: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_config.width as f64,
                self.window_config.height as f64,
            ))
            .with_resizable(self.window_config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let mut context = DeviceContext::with_window(&self.app_config, &window)?;
        context.enter_running();

        self.context = Some(context);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(context) = self.context.take() {
            context.wait();
            drop(context);
        }
        self.window = None;
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }

        if let Err(err) = self.open(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            log::debug!("close requested");
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
