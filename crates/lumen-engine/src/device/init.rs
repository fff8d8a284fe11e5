/// Initialization parameters for the graphics device.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Render the back buffer through an sRGB view when the surface allows it.
    pub prefer_srgb: bool,

    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    /// Present mode. FIFO is vsync-locked and supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Number of frames the swapchain may queue; 2 is double buffering.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
