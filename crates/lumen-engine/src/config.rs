//! Engine configuration, one plain struct per subsystem.

use crate::device::GpuInit;
use crate::logging::LoggingConfig;
use crate::memory::MemoryConfig;
use crate::resources::AssetConfig;
use crate::window::WindowConfig;

/// Per-frame rendering parameters.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Multiplier applied to the scene color; values above 1 feed the bloom.
    pub intensity: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { intensity: 4.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub window: WindowConfig,
    pub gpu: GpuInit,
    pub memory: MemoryConfig,
    pub assets: AssetConfig,
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Defaults with environment overrides applied (`LUMEN_SHADER_DIR`).
    pub fn from_env() -> Self {
        Self {
            assets: AssetConfig::from_env(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.window.title, "Lumen");
        assert_eq!(config.gpu.present_mode, wgpu::PresentMode::Fifo);
        assert_eq!(config.gpu.desired_maximum_frame_latency, 2);
        assert_eq!(config.memory.persistent_capacity, 1 << 20);
        assert!(config.render.intensity > 1.0);
    }
}
