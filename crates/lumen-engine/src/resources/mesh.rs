use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::create_resource;
use crate::error::EngineError;

/// Scene vertex: clip-space position + linear RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

pub const VERTEX_STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

const _: () = assert!(VERTEX_STRIDE == 24);

/// The test triangle drawn by the scene pass.
pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5],
        color: [1.0, 0.2, 0.2, 1.0],
    },
    Vertex {
        position: [0.5, -0.5],
        color: [0.2, 1.0, 0.2, 1.0],
    },
    Vertex {
        position: [-0.5, -0.5],
        color: [0.2, 0.2, 1.0, 1.0],
    },
];

/// One attribute of a vertex, addressed by semantic name and shader location.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputElement {
    pub semantic: &'static str,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

pub const VERTEX_LAYOUT: [InputElement; 2] = [
    InputElement {
        semantic: "POSITION",
        location: 0,
        format: wgpu::VertexFormat::Float32x2,
        offset: 0,
    },
    InputElement {
        semantic: "COLOR",
        location: 1,
        format: wgpu::VertexFormat::Float32x4,
        offset: 8,
    },
];

/// A validated vertex-buffer layout.
#[derive(Debug, Clone)]
pub struct InputLayout {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

impl InputLayout {
    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Builds an input layout for `elements` and checks it against the vertex shader source.
///
/// Each element must fit inside `stride` without overlapping another, and
/// every location must be declared by the shader.
pub fn create_input_layout(elements: &[InputElement], stride: u64, vs_source: &str) -> Result<InputLayout, EngineError> {
    validate_layout(elements, stride, vs_source).map_err(|reason| {
        log::error!("input layout: {reason}");
        EngineError::resource("input layout", reason)
    })?;

    Ok(InputLayout {
        attributes: elements
            .iter()
            .map(|e| wgpu::VertexAttribute {
                format: e.format,
                offset: e.offset,
                shader_location: e.location,
            })
            .collect(),
        stride,
    })
}

fn validate_layout(elements: &[InputElement], stride: u64, vs_source: &str) -> Result<(), String> {
    if elements.is_empty() {
        return Err("no input elements".to_string());
    }

    let mut spans: Vec<(u64, u64, &str)> = Vec::with_capacity(elements.len());
    for (i, e) in elements.iter().enumerate() {
        let end = e.offset + e.format.size();
        if end > stride {
            return Err(format!("{} ends at byte {end}, past the {stride}-byte stride", e.semantic));
        }
        if elements[..i].iter().any(|o| o.location == e.location) {
            return Err(format!("location {} used twice", e.location));
        }
        if !vs_source.contains(&format!("@location({})", e.location)) {
            return Err(format!(
                "vertex shader has no input at location {} ({})",
                e.location, e.semantic
            ));
        }
        spans.push((e.offset, end, e.semantic));
    }

    spans.sort_unstable_by_key(|s| s.0);
    for pair in spans.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(format!("{} overlaps {}", pair[1].2, pair[0].2));
        }
    }
    Ok(())
}

/// Creates an immutable vertex buffer initialized with `data`.
pub fn create_vertex_buffer(device: &wgpu::Device, label: &str, data: &[u8]) -> Result<wgpu::Buffer, EngineError> {
    let max = device.limits().max_buffer_size;
    if data.is_empty() || data.len() as u64 > max {
        let reason = format!("size {} outside 1..={max}", data.len());
        log::error!("vertex buffer `{label}`: {reason}");
        return Err(EngineError::resource(format!("vertex buffer `{label}`"), reason));
    }

    create_resource(device, &format!("vertex buffer `{label}`"), || {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: data,
            usage: wgpu::BufferUsages::VERTEX,
        })
    })
}

/// Static geometry with its layout.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub layout: InputLayout,
    pub vertex_count: u32,
}

pub struct MeshTable {
    pub triangle: Mesh,
}

impl MeshTable {
    pub fn create(device: &wgpu::Device, basic_vs_source: &str) -> Result<Self, EngineError> {
        let layout = create_input_layout(&VERTEX_LAYOUT, VERTEX_STRIDE, basic_vs_source)?;
        let vertex_buffer = create_vertex_buffer(
            device,
            "lumen triangle vbo",
            bytemuck::cast_slice(&TRIANGLE_VERTICES),
        )?;

        Ok(Self {
            triangle: Mesh {
                vertex_buffer,
                layout,
                vertex_count: TRIANGLE_VERTICES.len() as u32,
            },
        })
    }
}
