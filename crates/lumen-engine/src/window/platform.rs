use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as NativeWindow, WindowAttributes, WindowId};

use crate::error::EngineError;

use super::{Event, WindowClass, WindowLifecycle, WindowState};

/// Upper bound on loop iterations spent waiting for a window request to be served.
const CREATE_PUMP_LIMIT: usize = 64;

/// Window creation parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Desired client-area width in physical pixels.
    pub width: u32,
    /// Desired client-area height in physical pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lumen".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Owns the OS event loop and hands out windows.
///
/// Events are collected by pumping the loop with a zero timeout, so polling
/// never blocks and everything pending is drained in one call.
pub struct Platform {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    class: WindowClass,
}

impl Platform {
    pub fn new() -> Result<Self, EngineError> {
        let event_loop = EventLoop::new().map_err(|e| {
            log::error!("failed to create event loop: {e}");
            EngineError::Platform(format!("failed to create event loop: {e}"))
        })?;

        Ok(Self {
            event_loop,
            collector: EventCollector::default(),
            class: WindowClass::default(),
        })
    }

    /// Creates a hidden window whose client area is `config.width` x `config.height`.
    ///
    /// The outer frame size is derived by the windowing layer from the client size.
    pub fn create_window(&mut self, config: &WindowConfig) -> Result<Window, EngineError> {
        if self.class.acquire() {
            log::debug!("first window; class `{}` now registered", WindowClass::NAME);
        }

        let attrs = NativeWindow::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_visible(false);

        match self.open(attrs) {
            Ok(native) => {
                let size = native.inner_size();
                let (width, height) = if size.width > 0 && size.height > 0 {
                    (size.width, size.height)
                } else {
                    (config.width, config.height)
                };

                let mut lifecycle = WindowLifecycle::default();
                lifecycle.created();

                log::info!(
                    "window `{}` created ({width}x{height}, {} live)",
                    config.title,
                    self.class.window_count()
                );
                Ok(Window {
                    native: Arc::new(native),
                    lifecycle,
                    width,
                    height,
                })
            }
            Err(e) => {
                self.class.release();
                log::error!("{e}");
                Err(e)
            }
        }
    }

    /// Destroys `window` and unregisters the window class if it was the last one.
    ///
    /// Anything still holding the native handle (a device surface) must be dropped first.
    pub fn destroy_window(&mut self, mut window: Window) {
        let (width, height) = window.client_size();
        log::debug!("destroying window in state {:?} at {width}x{height}", window.state());

        window.mark_closed();
        window.native.set_visible(false);
        self.collector.events.retain(|(id, _)| *id != window.id());
        drop(window);

        if self.class.release() {
            log::info!("last window destroyed");
        }
    }

    /// Drains all pending OS messages and returns the events addressed to `window`.
    ///
    /// Events for other windows stay queued for their own poll.
    pub fn poll_events(&mut self, window: &Window) -> Vec<Event> {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.collector)
        {
            log::debug!("event loop exited with code {code}");
            self.collector.exited = true;
        }

        let id = window.id();
        let mut events = Vec::new();
        self.collector.events.retain(|(target, event)| {
            if *target == id {
                events.push(*event);
                false
            } else {
                true
            }
        });

        if self.collector.exited {
            events.push(Event::Close);
        }
        events
    }

    fn open(&mut self, attrs: WindowAttributes) -> Result<NativeWindow, EngineError> {
        self.collector.pending = Some(attrs);

        // Windows can only be created from inside the running loop.
        for _ in 0..CREATE_PUMP_LIMIT {
            let status = self
                .event_loop
                .pump_app_events(Some(Duration::ZERO), &mut self.collector);

            if let Some(result) = self.collector.created.take() {
                return result
                    .map_err(|e| EngineError::Platform(format!("failed to create window: {e}")));
            }

            if let PumpStatus::Exit(code) = status {
                self.collector.pending = None;
                return Err(EngineError::Platform(format!(
                    "event loop exited with code {code} during window creation"
                )));
            }
        }

        self.collector.pending = None;
        Err(EngineError::Platform(
            "window creation request was never served".to_string(),
        ))
    }
}

/// A native window plus the state the engine tracks for it.
pub struct Window {
    native: Arc<NativeWindow>,
    lifecycle: WindowLifecycle,
    width: u32,
    height: u32,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.native.id()
    }

    /// Shared handle used to bind a GPU surface.
    pub fn native(&self) -> Arc<NativeWindow> {
        Arc::clone(&self.native)
    }

    /// Last known client size in physical pixels.
    pub fn client_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn state(&self) -> WindowState {
        self.lifecycle.state()
    }

    pub fn show(&mut self) {
        self.native.set_visible(true);
        self.lifecycle.running();
    }

    pub fn hide(&self) {
        self.native.set_visible(false);
    }

    /// Enters `Resizing` and records the new client size.
    pub fn begin_resize(&mut self, width: u32, height: u32) {
        self.lifecycle.resizing();
        self.width = width;
        self.height = height;
    }

    pub fn end_resize(&mut self) {
        self.lifecycle.running();
    }

    fn mark_closed(&mut self) {
        self.lifecycle.closed();
    }
}

#[derive(Default)]
struct EventCollector {
    pending: Option<WindowAttributes>,
    created: Option<Result<NativeWindow, OsError>>,
    events: Vec<(WindowId, Event)>,
    exited: bool,
}

impl EventCollector {
    fn serve_pending(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attrs) = self.pending.take() {
            self.created = Some(event_loop.create_window(attrs));
        }
    }
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        self.serve_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.events.push((window_id, Event::Close)),
            WindowEvent::Resized(size) => self.events.push((
                window_id,
                Event::Resize {
                    width: size.width,
                    height: size.height,
                },
            )),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Covers requests made after the loop has already resumed.
        self.serve_pending(event_loop);
    }
}
