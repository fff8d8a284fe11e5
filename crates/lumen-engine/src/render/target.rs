use crate::device::{create_resource, GraphicsDevice};
use crate::error::EngineError;

use super::TargetId;

/// Storage format of every off-screen render target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Something with a pixel extent.
pub trait TargetExtent {
    fn extent(&self) -> (u32, u32);
}

/// Creates render targets. Implemented by the graphics device.
pub trait TargetFactory {
    type Target: TargetExtent;

    fn create_target(&self, id: TargetId, width: u32, height: u32) -> Result<Self::Target, EngineError>;
}

/// An off-screen HDR texture with a writable and a readable view.
///
/// The three GPU objects are created and released as a unit; field order is
/// release order (render view, sample view, texture).
pub struct RenderTarget {
    /// Bound as a color attachment by the pass that writes this target.
    pub render_view: wgpu::TextureView,
    /// Bound as a texture input by passes that read this target.
    pub sample_view: wgpu::TextureView,
    pub texture: wgpu::Texture,
    width: u32,
    height: u32,
}

impl RenderTarget {
    pub fn create(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Result<Self, EngineError> {
        let max = device.limits().max_texture_dimension_2d;
        validate_extent(width, height, max).map_err(|reason| {
            log::error!("render target `{label}`: {reason}");
            EngineError::resource(format!("render target `{label}`"), reason)
        })?;

        let (texture, render_view, sample_view) = create_resource(device, &format!("render target `{label}`"), || {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TARGET_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });

            let render_view = texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(label),
                usage: Some(wgpu::TextureUsages::RENDER_ATTACHMENT),
                ..Default::default()
            });
            let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(label),
                usage: Some(wgpu::TextureUsages::TEXTURE_BINDING),
                ..Default::default()
            });
            (texture, render_view, sample_view)
        })?;

        Ok(Self {
            render_view,
            sample_view,
            texture,
            width,
            height,
        })
    }
}

impl TargetExtent for RenderTarget {
    fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl TargetFactory for wgpu::Device {
    type Target = RenderTarget;

    fn create_target(&self, id: TargetId, width: u32, height: u32) -> Result<RenderTarget, EngineError> {
        RenderTarget::create(self, id.label(), width, height)
    }
}

impl TargetFactory for GraphicsDevice {
    type Target = RenderTarget;

    fn create_target(&self, id: TargetId, width: u32, height: u32) -> Result<RenderTarget, EngineError> {
        self.device().create_target(id, width, height)
    }
}

fn validate_extent(width: u32, height: u32, max: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("zero extent {width}x{height}"));
    }
    if width > max || height > max {
        return Err(format!("extent {width}x{height} exceeds the device limit of {max}"));
    }
    Ok(())
}
