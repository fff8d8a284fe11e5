use crate::config::EngineConfig;
use crate::device::GraphicsDevice;
use crate::error::EngineError;
use crate::memory::MemoryContext;
use crate::render::RenderPipeline;
use crate::resources::Resources;
use crate::window::{dispatch_events, Platform, Window, WindowCallbacks};

/// Why the main loop ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShutdownReason {
    /// The window was closed.
    Closed,
    /// A runtime failure (resize, surface loss) stopped rendering.
    Fatal,
}

/// Initializes every subsystem, runs the frame loop and tears down in reverse order.
///
/// Init order: memory, platform + window, device, resources, pipeline.
/// An initialization failure is returned after everything created before it
/// has been released. Runtime failures end the loop and are reported as
/// [`ShutdownReason::Fatal`].
pub fn run(config: &EngineConfig) -> Result<ShutdownReason, EngineError> {
    let mut memory = MemoryContext::new(&config.memory)?;
    let mut platform = Platform::new()?;
    let mut window = platform.create_window(&config.window)?;

    let result = run_window(&mut platform, &mut window, &mut memory, config);

    platform.destroy_window(window);
    log::info!("shutdown complete");
    result
}

fn run_window(
    platform: &mut Platform,
    window: &mut Window,
    memory: &mut MemoryContext,
    config: &EngineConfig,
) -> Result<ShutdownReason, EngineError> {
    // Dropped in reverse: pipeline, resources, device. The device releases
    // its surface before the window is destroyed by the caller.
    let mut device = GraphicsDevice::create(window.native(), &config.gpu)?;
    let resources = Resources::load(device.device(), &mut memory.persistent, &config.assets)?;
    let mut pipeline = RenderPipeline::new(&device, &resources)?;

    window.show();
    log::info!("entering main loop");

    let mut running = true;
    let mut fatal = false;
    while running {
        let events = platform.poll_events(window);

        let mut callbacks = FrameCallbacks {
            window: &mut *window,
            device: &mut device,
            pipeline: &mut pipeline,
            fatal: false,
        };
        dispatch_events(events, &mut callbacks, &mut running);
        fatal |= callbacks.fatal;

        if !fatal {
            if let Err(e) = pipeline.render_frame(
                &mut device,
                &resources,
                &mut memory.transient,
                config.render.intensity,
            ) {
                log::error!("frame failed: {e}");
                fatal = true;
                running = false;
            }
        }

        memory.end_frame();
    }

    window.hide();

    let reason = if fatal {
        ShutdownReason::Fatal
    } else {
        ShutdownReason::Closed
    };
    log::info!("main loop ended ({reason:?})");
    Ok(reason)
}

/// Event handlers for one loop iteration.
struct FrameCallbacks<'a> {
    window: &'a mut Window,
    device: &'a mut GraphicsDevice,
    pipeline: &'a mut RenderPipeline,
    fatal: bool,
}

impl WindowCallbacks for FrameCallbacks<'_> {
    fn on_close(&mut self) -> bool {
        log::info!("close requested");
        true
    }

    fn on_resize(&mut self, width: u32, height: u32) -> bool {
        self.window.begin_resize(width, height);
        let result = self.pipeline.resize(self.device, width, height);
        self.window.end_resize();

        match result {
            Ok(outcome) => {
                log::debug!("resize to {width}x{height}: {outcome:?}");
                false
            }
            Err(e) => {
                log::error!("{e}");
                self.fatal = true;
                true
            }
        }
    }
}
