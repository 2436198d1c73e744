use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    error::OsError,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

use crate::event::SystemEvent;

/// Window-system liveness and event delivery, as the run loop sees it.
///
/// The loop controller polls these explicitly each update tick instead of
/// subscribing to window callbacks, which keeps control flow single-threaded
/// and easy to trace: a closed window surfaces as `is_open()` returning
/// `false` on the next poll, never as a callback mutating loop state from a
/// nested call.
pub trait WindowHost {
    /// Whether the window still exists and has not been asked to close.
    fn is_open(&self) -> bool;

    /// Delivers any queued window-system events without blocking.
    fn pump_events(&mut self);
}

/// A wrapper around a winit window, providing controlled access and
/// engine-specific utilities.
#[derive(Debug, Clone)]
pub struct TempoWindow {
    inner: Arc<Window>,
}

impl TempoWindow {
    /// Creates a new TempoWindow wrapper by building and wrapping a winit
    /// window.
    pub(crate) fn new(
        event_loop: &ActiveEventLoop,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, OsError> {
        log::info!("Creating application window via TempoWindow wrapper...");

        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width, height))
            .with_visible(true);

        let window = event_loop.create_window(window_attributes)?;

        log::info!("Window created successfully (id: {:?}).", window.id());
        Ok(Self {
            inner: Arc::new(window),
        })
    }

    /// Returns the unique identifier of the underlying window.
    pub fn id(&self) -> WindowId {
        self.inner.id()
    }

    /// Requests that a redraw event be emitted for this window.
    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }

    /// Returns the physical size of the window's client area.
    pub fn inner_size(&self) -> PhysicalSize<u32> {
        self.inner.inner_size()
    }

    /// Returns the display scale factor associated with this window.
    pub fn scale_factor(&self) -> f64 {
        self.inner.scale_factor()
    }
}

/// Winit-backed [`WindowHost`].
///
/// Owns the event loop and drives it in pump mode: each `pump_events` call
/// delivers whatever the window system has queued and returns immediately,
/// so the engine's own `while running` loop stays in charge. Close requests
/// flip the liveness flag; resizes are forwarded to the engine's system bus
/// for application inside an update tick.
pub struct WinitWindowHost {
    event_loop: EventLoop<()>,
    driver: WindowDriver,
}

struct WindowDriver {
    title: String,
    width: u32,
    height: u32,
    window: Option<TempoWindow>,
    open: bool,
    system_events: flume::Sender<SystemEvent>,
}

impl ApplicationHandler for WindowDriver {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match TempoWindow::new(event_loop, &self.title, self.width, self.height) {
            Ok(window) => self.window = Some(window),
            Err(error) => {
                log::error!("failed to create window: {error}");
                self.open = false;
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if Some(window_id) != self.window.as_ref().map(TempoWindow::id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.open = false;
            }
            WindowEvent::Resized(size) => {
                if self
                    .system_events
                    .send(SystemEvent::WindowResized {
                        width: size.width,
                        height: size.height,
                    })
                    .is_err()
                {
                    log::error!("failed to forward resize: system bus disconnected");
                }
            }
            _ => {}
        }
    }
}

impl WinitWindowHost {
    /// Builds the event loop and prepares a window with the given title and
    /// logical size. The window itself is created lazily on the first pump,
    /// when the platform reports the application as resumed.
    ///
    /// `system_events` receives resize notifications for the engine to drain
    /// inside update ticks.
    pub fn new(
        title: impl Into<String>,
        width: u32,
        height: u32,
        system_events: flume::Sender<SystemEvent>,
    ) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop,
            driver: WindowDriver {
                title: title.into(),
                width,
                height,
                window: None,
                open: true,
                system_events,
            },
        })
    }

    /// The wrapped window, once the platform has created it.
    pub fn window(&self) -> Option<&TempoWindow> {
        self.driver.window.as_ref()
    }
}

impl WindowHost for WinitWindowHost {
    fn is_open(&self) -> bool {
        self.driver.open
    }

    fn pump_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.driver);
        if let PumpStatus::Exit(code) = status {
            log::info!("window event loop exited (status {code})");
            self.driver.open = false;
        }

        if let Some(window) = &self.driver.window {
            window.request_redraw();
        }
    }
}
