use std::sync::Arc;

use winit::window::Window as NativeWindow;

use crate::error::EngineError;

use super::scope::{capture, log_uncaptured_errors};
use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Owns the wgpu device, queue (immediate context) and the window surface (swapchain).
///
/// Field order is release order: surface state, surface, queue, device,
/// adapter, instance. A failed construction drops whatever was already
/// created in reverse order.
pub struct GraphicsDevice {
    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Format of the per-frame back-buffer view.
    view_format: wgpu::TextureFormat,

    /// Last requested size in physical pixels. May be zero while minimized.
    size: (u32, u32),

    /// Whether the surface is configured for `size` and frames may be acquired.
    back_buffer_ready: bool,

    surface: wgpu::Surface<'static>,
    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    instance: wgpu::Instance,
}

impl GraphicsDevice {
    /// Creates a device and a double-buffered swapchain bound to `window`.
    pub fn create(window: Arc<NativeWindow>, init: &GpuInit) -> Result<Self, EngineError> {
        pollster::block_on(Self::create_async(window, init.clone()))
            .inspect_err(|e| log::error!("{e}"))
    }

    async fn create_async(window: Arc<NativeWindow>, init: GpuInit) -> Result<Self, EngineError> {
        let inner = window.inner_size();
        if inner.width == 0 || inner.height == 0 {
            return Err(EngineError::DeviceCreation("window has zero size".to_string()));
        }

        let GpuInit {
            prefer_srgb,
            power_preference,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::from_build_config(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| EngineError::DeviceCreation(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::DeviceCreation(format!("no suitable GPU adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| EngineError::DeviceCreation(format!("failed to create device/queue: {e}")))?;
        log_uncaptured_errors(&device);

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps)
            .ok_or_else(|| EngineError::DeviceCreation("no supported surface formats".to_string()))?;
        let view_format = surface::view_format(format, prefer_srgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: inner.width,
            height: inner.height,
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: if view_format == format {
                vec![]
            } else {
                vec![view_format]
            },
            desired_maximum_frame_latency,
        };

        capture(&device, || surface.configure(&device, &config))
            .map_err(|e| EngineError::DeviceCreation(format!("failed to configure swapchain: {e}")))?;

        log::info!(
            "graphics device created on {} ({:?}, back buffer {:?} viewed as {:?})",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            view_format
        );

        Ok(Self {
            config,
            view_format,
            size: (inner.width, inner.height),
            back_buffer_ready: true,
            surface,
            queue,
            device,
            adapter,
            instance,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Format render passes must target when drawing to the back buffer.
    pub fn back_buffer_format(&self) -> wgpu::TextureFormat {
        self.view_format
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// `false` after a failed resize, or while the window has zero area.
    pub fn has_back_buffer(&self) -> bool {
        self.back_buffer_ready
    }

    /// Rebuilds the swapchain buffers at the new size.
    ///
    /// Device and queue are untouched. A zero-sized request is recorded and
    /// deferred until the next non-zero one. On failure no back buffer is
    /// available and the caller must stop rendering.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.back_buffer_ready = false;
        self.size = (width, height);

        if width == 0 || height == 0 {
            log::debug!("swapchain resize to {width}x{height} deferred");
            return Ok(());
        }

        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            let err = EngineError::Resize {
                width,
                height,
                reason: format!("exceeds the device texture limit of {max}"),
            };
            log::error!("{err}");
            return Err(err);
        }

        self.config.width = width;
        self.config.height = height;
        capture(&self.device, || self.surface.configure(&self.device, &self.config)).map_err(|e| {
            let err = EngineError::Resize {
                width,
                height,
                reason: e.to_string(),
            };
            log::error!("{err}");
            err
        })?;
        self.back_buffer_ready = true;

        log::debug!("swapchain resized to {width}x{height}");
        Ok(())
    }

    /// Acquires the next back buffer, creates its view and a command encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("lumen back buffer view"),
            format: Some(self.view_format),
            ..Default::default()
        });

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded frame and presents it.
    ///
    /// With a FIFO present mode the next acquisition waits for vsync.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a surface error into an action, reconfiguring when required.
    ///
    /// A reconfigure that fails is fatal.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = surface::map_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured if self.back_buffer_ready => {
                if let Err(e) = capture(&self.device, || self.surface.configure(&self.device, &self.config)) {
                    log::error!("surface reconfigure after `{err}` failed: {e}");
                    self.back_buffer_ready = false;
                    return SurfaceErrorAction::Fatal;
                }
            }
            SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
            _ => log::debug!("surface error: {err}"),
        }
        action
    }
}

impl AsRef<wgpu::Device> for GraphicsDevice {
    fn as_ref(&self) -> &wgpu::Device {
        &self.device
    }
}

impl Drop for GraphicsDevice {
    fn drop(&mut self) {
        log::info!("graphics device on {} released", self.adapter.get_info().name);
    }
}
