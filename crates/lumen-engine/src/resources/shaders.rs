use std::path::Path;

use crate::device::create_resource;
use crate::error::EngineError;
use crate::memory::{Allocation, Arena};

use super::file_io;

/// Every shader file the pipeline loads. One fixed set, loaded once.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderRole {
    BasicVs,
    BasicPs,
    CopyVs,
    CopyPs,
    BrightPassPs,
    BloomPs,
}

impl ShaderRole {
    pub const ALL: [ShaderRole; 6] = [
        ShaderRole::BasicVs,
        ShaderRole::BasicPs,
        ShaderRole::CopyVs,
        ShaderRole::CopyPs,
        ShaderRole::BrightPassPs,
        ShaderRole::BloomPs,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            ShaderRole::BasicVs => "basic_vs.wgsl",
            ShaderRole::BasicPs => "basic_ps.wgsl",
            ShaderRole::CopyVs => "copy_vs.wgsl",
            ShaderRole::CopyPs => "copy_ps.wgsl",
            ShaderRole::BrightPassPs => "brightpass_ps.wgsl",
            ShaderRole::BloomPs => "bloom_ps.wgsl",
        }
    }

    pub const fn is_vertex(self) -> bool {
        matches!(self, ShaderRole::BasicVs | ShaderRole::CopyVs)
    }

    pub const fn entry_point(self) -> &'static str {
        if self.is_vertex() {
            VERTEX_ENTRY
        } else {
            FRAGMENT_ENTRY
        }
    }
}

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub struct VertexShader {
    module: wgpu::ShaderModule,
}

impl VertexShader {
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn entry_point(&self) -> &'static str {
        VERTEX_ENTRY
    }
}

pub struct PixelShader {
    module: wgpu::ShaderModule,
}

impl PixelShader {
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn entry_point(&self) -> &'static str {
        FRAGMENT_ENTRY
    }
}

/// Loads a vertex shader and returns it with its source, kept in `arena` for
/// input-layout validation.
pub fn load_vertex_shader(
    device: &wgpu::Device,
    path: &Path,
    arena: &mut Arena,
) -> Result<(VertexShader, Allocation), EngineError> {
    let (module, source) = load_module(device, path, arena, "@vertex", VERTEX_ENTRY)?;
    Ok((VertexShader { module }, source))
}

/// Loads a pixel (fragment) shader. Its source is not needed after creation.
pub fn load_pixel_shader(device: &wgpu::Device, path: &Path, arena: &mut Arena) -> Result<PixelShader, EngineError> {
    let (module, _) = load_module(device, path, arena, "@fragment", FRAGMENT_ENTRY)?;
    Ok(PixelShader { module })
}

fn load_module(
    device: &wgpu::Device,
    path: &Path,
    arena: &mut Arena,
    stage: &str,
    entry: &str,
) -> Result<(wgpu::ShaderModule, Allocation), EngineError> {
    let allocation = file_io::read_file(path, arena)?;
    let source = validate_source(arena.bytes(&allocation)?, stage, entry).map_err(|reason| {
        log::error!("shader `{}`: {reason}", path.display());
        EngineError::resource(format!("shader `{}`", path.display()), reason)
    })?;

    let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("shader");
    let module = create_resource(device, &format!("shader `{}`", path.display()), || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })?;

    log::debug!("shader `{label}` created");
    Ok((module, allocation))
}

/// Cheap checks before the device parses and validates the WGSL.
fn validate_source<'a>(bytes: &'a [u8], stage: &str, entry: &str) -> Result<&'a str, String> {
    let source = std::str::from_utf8(bytes).map_err(|e| format!("source is not UTF-8: {e}"))?;
    if source.trim().is_empty() {
        return Err("source is empty".to_string());
    }
    if !source.contains(stage) {
        return Err(format!("no `{stage}` stage"));
    }
    if !source.contains(&format!("fn {entry}(")) {
        return Err(format!("missing entry point `{entry}`"));
    }
    Ok(source)
}

/// The six shader modules, by role.
pub struct ShaderTable {
    pub basic_vs: VertexShader,
    pub basic_ps: PixelShader,
    pub copy_vs: VertexShader,
    pub copy_ps: PixelShader,
    pub brightpass_ps: PixelShader,
    pub bloom_ps: PixelShader,
    /// Source of `basic_vs`, in the persistent arena.
    pub basic_vs_source: Allocation,
}

impl ShaderTable {
    pub fn load(device: &wgpu::Device, shader_dir: &Path, arena: &mut Arena) -> Result<Self, EngineError> {
        let path = |role: ShaderRole| shader_dir.join(role.file_name());

        let (basic_vs, basic_vs_source) = load_vertex_shader(device, &path(ShaderRole::BasicVs), arena)?;
        let basic_ps = load_pixel_shader(device, &path(ShaderRole::BasicPs), arena)?;
        let (copy_vs, _) = load_vertex_shader(device, &path(ShaderRole::CopyVs), arena)?;
        let copy_ps = load_pixel_shader(device, &path(ShaderRole::CopyPs), arena)?;
        let brightpass_ps = load_pixel_shader(device, &path(ShaderRole::BrightPassPs), arena)?;
        let bloom_ps = load_pixel_shader(device, &path(ShaderRole::BloomPs), arena)?;

        log::info!("{} shaders loaded from `{}`", ShaderRole::ALL.len(), shader_dir.display());
        Ok(Self {
            basic_vs,
            basic_ps,
            copy_vs,
            copy_ps,
            brightpass_ps,
            bloom_ps,
            basic_vs_source,
        })
    }
}
