/// One acquired back buffer plus the encoder recording into it.
///
/// Holding the surface texture blocks acquisition of the next one, so the
/// frame must be handed back to [`GraphicsDevice::present`](super::GraphicsDevice::present) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    /// Render-target view over the back buffer.
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
