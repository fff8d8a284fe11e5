//! Startup resources: shader modules and the static scene mesh.
//!
//! Everything here is loaded once, from files under [`AssetConfig::shader_dir`],
//! with file contents kept in the persistent arena. Nothing is reloaded.

pub mod file_io;
mod mesh;
mod shaders;

use std::path::PathBuf;

use crate::error::EngineError;
use crate::memory::Arena;

pub use mesh::{
    create_input_layout, create_vertex_buffer, InputElement, InputLayout, Mesh, MeshTable, Vertex,
    TRIANGLE_VERTICES, VERTEX_LAYOUT, VERTEX_STRIDE,
};
pub use shaders::{
    load_pixel_shader, load_vertex_shader, PixelShader, ShaderRole, ShaderTable, VertexShader,
    FRAGMENT_ENTRY, VERTEX_ENTRY,
};

/// Environment variable overriding [`AssetConfig::shader_dir`].
pub const SHADER_DIR_ENV: &str = "LUMEN_SHADER_DIR";

#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub shader_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("assets/shaders"),
        }
    }
}

impl AssetConfig {
    /// Default paths, with `LUMEN_SHADER_DIR` taking precedence when set.
    pub fn from_env() -> Self {
        match std::env::var_os(SHADER_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self {
                shader_dir: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }
}

/// Shader and mesh tables used by the pipeline.
pub struct Resources {
    pub shaders: ShaderTable,
    pub meshes: MeshTable,
}

impl Resources {
    pub fn load(device: &wgpu::Device, arena: &mut Arena, config: &AssetConfig) -> Result<Self, EngineError> {
        let shaders = ShaderTable::load(device, &config.shader_dir, arena)?;

        let vs_source = std::str::from_utf8(arena.bytes(&shaders.basic_vs_source)?)
            .map_err(|e| EngineError::resource("input layout", format!("vertex shader source: {e}")))?;
        let meshes = MeshTable::create(device, vs_source)?;

        log::info!("resources loaded ({} bytes of persistent memory in use)", arena.used());
        Ok(Self { shaders, meshes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_dir() {
        assert_eq!(AssetConfig::default().shader_dir, PathBuf::from("assets/shaders"));
    }
}
