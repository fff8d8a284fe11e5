use crate::device::{create_resource, GraphicsDevice, SurfaceErrorAction};
use crate::error::EngineError;
use crate::memory::Arena;
use crate::resources::{PixelShader, Resources, VertexShader};

use super::params::{uniform_binding_size, BloomParams, IntensityParams};
use super::passes::{BloomPass, Destination, Program, FRAME_PASSES, FULLSCREEN_VERTEX_COUNT};
use super::resize::{apply_resize, ResizeOutcome, SwapchainResize, TargetSet};
use super::table::RenderTargetTable;
use super::target::{RenderTarget, TargetFactory, TARGET_FORMAT};

/// Texture inputs occupy bindings `0..n`; the sampler and parameters follow.
const SAMPLER_BINDING: u32 = 3;
const PARAMS_BINDING: u32 = 4;

const PROGRAM_COUNT: usize = 4;

/// Texture inputs per program slot (see [`program_slot`]).
const PROGRAM_TEXTURES: [u32; PROGRAM_COUNT] = [0, 1, 1, 3];

const fn program_slot(program: Program) -> usize {
    match program {
        Program::Scene => 0,
        Program::BrightPass => 1,
        Program::Bloom(_) => 2,
        Program::Composite => 3,
    }
}

fn params_binding_type(program: Program) -> Option<wgpu::BindingType> {
    let min_binding_size = match program {
        Program::Scene => uniform_binding_size::<IntensityParams>(),
        Program::Bloom(_) => uniform_binding_size::<BloomParams>(),
        Program::BrightPass | Program::Composite => return None,
    };
    Some(wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size,
    })
}

/// Result of one [`RenderPipeline::render_frame`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// No back buffer this frame (zero-area window or a transient surface error).
    Skipped,
}

/// What a frame does after the back buffer could not be acquired.
fn skip_or_fail(action: SurfaceErrorAction, reason: String) -> Result<FrameOutcome, EngineError> {
    match action {
        SurfaceErrorAction::Fatal => Err(EngineError::Surface(reason)),
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(FrameOutcome::Skipped),
    }
}

/// Layouts, sampler and parameter buffers. Independent of the window size.
struct Bindings {
    layouts: [wgpu::BindGroupLayout; PROGRAM_COUNT],
    sampler: wgpu::Sampler,
    intensity_ubo: wgpu::Buffer,
    bloom_ubos: [wgpu::Buffer; BloomPass::COUNT],
}

impl Bindings {
    fn new(device: &wgpu::Device) -> Result<Self, EngineError> {
        create_resource(device, "pipeline bindings", || Self::create(device))
    }

    fn create(device: &wgpu::Device) -> Self {
        let layout = |label: &str, program: Program| {
            let textures = PROGRAM_TEXTURES[program_slot(program)];
            let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..textures)
                .map(|binding| wgpu::BindGroupLayoutEntry {
                    binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                })
                .collect();

            if textures > 0 {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                });
            }
            if let Some(ty) = params_binding_type(program) {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: PARAMS_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty,
                    count: None,
                });
            }

            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &entries,
            })
        };

        let layouts = [
            layout("lumen scene bgl", Program::Scene),
            layout("lumen bright-pass bgl", Program::BrightPass),
            layout("lumen bloom bgl", Program::Bloom(BloomPass::LargeHorizontal)),
            layout("lumen composite bgl", Program::Composite),
        ];

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen linear clamp sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        let intensity_ubo = uniform("lumen intensity ubo", std::mem::size_of::<IntensityParams>());
        let bloom_ubos = std::array::from_fn(|i| {
            uniform(
                &format!("lumen bloom ubo {:?}", BloomPass::ALL[i]),
                std::mem::size_of::<BloomParams>(),
            )
        });

        Self {
            layouts,
            sampler,
            intensity_ubo,
            bloom_ubos,
        }
    }

    /// One bind group per entry of [`FRAME_PASSES`], over the current target views.
    fn build(
        &self,
        device: &wgpu::Device,
        targets: &RenderTargetTable<RenderTarget>,
    ) -> Result<Vec<wgpu::BindGroup>, EngineError> {
        FRAME_PASSES
            .iter()
            .map(|desc| -> Result<wgpu::BindGroup, EngineError> {
                let views = desc
                    .inputs
                    .iter()
                    .map(|&id| targets.require(id).map(|t| &t.sample_view))
                    .collect::<Result<Vec<_>, _>>()?;

                let mut entries: Vec<wgpu::BindGroupEntry<'_>> = views
                    .iter()
                    .enumerate()
                    .map(|(slot, view)| wgpu::BindGroupEntry {
                        binding: slot as u32,
                        resource: wgpu::BindingResource::TextureView(view),
                    })
                    .collect();

                if !views.is_empty() {
                    entries.push(wgpu::BindGroupEntry {
                        binding: SAMPLER_BINDING,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    });
                }
                let params = match desc.program {
                    Program::Scene => Some(&self.intensity_ubo),
                    Program::Bloom(pass) => Some(&self.bloom_ubos[pass.index()]),
                    Program::BrightPass | Program::Composite => None,
                };
                if let Some(buffer) = params {
                    entries.push(wgpu::BindGroupEntry {
                        binding: PARAMS_BINDING,
                        resource: buffer.as_entire_binding(),
                    });
                }

                create_resource(device, desc.label, || {
                    device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some(desc.label),
                        layout: &self.layouts[program_slot(desc.program)],
                        entries: &entries,
                    })
                })
            })
            .collect()
    }
}

fn create_program(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    vs: &VertexShader,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    fs: &PixelShader,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, EngineError> {
    create_resource(device, label, || {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[layout],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: vs.module(),
                entry_point: Some(vs.entry_point()),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: fs.module(),
                entry_point: Some(fs.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    })
}

/// The four programs, indexed by [`program_slot`].
fn create_programs(
    device: &wgpu::Device,
    bindings: &Bindings,
    resources: &Resources,
    back_buffer_format: wgpu::TextureFormat,
) -> Result<[wgpu::RenderPipeline; PROGRAM_COUNT], EngineError> {
    let shaders = &resources.shaders;
    let mesh_layout = resources.meshes.triangle.layout.buffer_layout();

    Ok([
        create_program(
            device,
            "lumen scene pipeline",
            &bindings.layouts[program_slot(Program::Scene)],
            &shaders.basic_vs,
            &[mesh_layout],
            &shaders.basic_ps,
            TARGET_FORMAT,
        )?,
        create_program(
            device,
            "lumen bright-pass pipeline",
            &bindings.layouts[program_slot(Program::BrightPass)],
            &shaders.copy_vs,
            &[],
            &shaders.brightpass_ps,
            TARGET_FORMAT,
        )?,
        create_program(
            device,
            "lumen bloom pipeline",
            &bindings.layouts[program_slot(Program::Bloom(BloomPass::LargeHorizontal))],
            &shaders.copy_vs,
            &[],
            &shaders.bloom_ps,
            TARGET_FORMAT,
        )?,
        create_program(
            device,
            "lumen composite pipeline",
            &bindings.layouts[program_slot(Program::Composite)],
            &shaders.copy_vs,
            &[],
            &shaders.copy_ps,
            back_buffer_format,
        )?,
    ])
}

/// The fixed HDR + bloom frame.
///
/// Owns the render-target table and viewport table (through [`TargetSet`]),
/// the four programs and their bindings. The back buffer stays owned by the
/// device and is only borrowed for the composite pass.
pub struct RenderPipeline {
    /// Rebuilt whenever the targets are.
    bind_groups: Vec<wgpu::BindGroup>,
    targets: TargetSet<RenderTarget>,
    bindings: Bindings,
    programs: [wgpu::RenderPipeline; PROGRAM_COUNT],
}

impl RenderPipeline {
    pub fn new(device: &GraphicsDevice, resources: &Resources) -> Result<Self, EngineError> {
        let (width, height) = device.size();
        Self::create(device.device(), width, height, device.back_buffer_format(), resources)
    }

    fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        back_buffer_format: wgpu::TextureFormat,
        resources: &Resources,
    ) -> Result<Self, EngineError> {
        let targets = TargetSet::create(device, width, height)?;
        let bindings = Bindings::new(device)?;
        let programs = create_programs(device, &bindings, resources, back_buffer_format)?;
        let bind_groups = bindings.build(device, targets.targets())?;

        log::info!("render pipeline created at {width}x{height}");
        Ok(Self {
            bind_groups,
            targets,
            bindings,
            programs,
        })
    }

    pub fn targets(&self) -> &TargetSet<RenderTarget> {
        &self.targets
    }

    /// Runs the resize protocol, then rebinds the new target views.
    pub fn resize<D>(&mut self, device: &mut D, width: u32, height: u32) -> Result<ResizeOutcome, EngineError>
    where
        D: SwapchainResize + TargetFactory<Target = RenderTarget> + AsRef<wgpu::Device>,
    {
        let outcome = apply_resize(device, &mut self.targets, width, height)?;
        if outcome == ResizeOutcome::Applied {
            self.bind_groups = self
                .bindings
                .build(device.as_ref(), self.targets.targets())
                .map_err(|e| EngineError::Resize {
                    width,
                    height,
                    reason: e.to_string(),
                })?;
        }
        Ok(outcome)
    }

    /// Records every pass of [`FRAME_PASSES`] and presents.
    ///
    /// Constant-buffer contents are staged in `transient` before upload; the
    /// caller resets it at the end of the frame.
    pub fn render_frame(
        &self,
        device: &mut GraphicsDevice,
        resources: &Resources,
        transient: &mut Arena,
        intensity: f32,
    ) -> Result<FrameOutcome, EngineError> {
        if !device.has_back_buffer() {
            return Ok(FrameOutcome::Skipped);
        }

        self.upload_params(device.queue(), transient, intensity)?;

        let mut frame = match device.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let reason = err.to_string();
                return skip_or_fail(device.handle_surface_error(err), reason);
            }
        };

        let mesh = &resources.meshes.triangle;
        for (index, desc) in FRAME_PASSES.iter().enumerate() {
            let view = match desc.destination {
                Destination::Target(id) => &self.targets.targets().require(id)?.render_view,
                Destination::BackBuffer => &frame.view,
            };
            let viewport = self.targets.viewports().get(desc.viewport);
            debug_assert!(viewport.is_valid(), "{}", desc.label);

            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(desc.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            viewport.apply(&mut rpass);
            rpass.set_pipeline(&self.programs[program_slot(desc.program)]);
            rpass.set_bind_group(0, &self.bind_groups[index], &[]);

            match desc.program {
                Program::Scene => {
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.draw(0..mesh.vertex_count, 0..1);
                }
                Program::BrightPass | Program::Bloom(_) | Program::Composite => {
                    rpass.draw(0..FULLSCREEN_VERTEX_COUNT, 0..1);
                }
            }
        }

        device.present(frame);
        Ok(FrameOutcome::Presented)
    }

    fn upload_params(&self, queue: &wgpu::Queue, transient: &mut Arena, intensity: f32) -> Result<(), EngineError> {
        let staged = transient.push_pod(&IntensityParams::new(intensity))?;
        queue.write_buffer(&self.bindings.intensity_ubo, 0, transient.bytes(&staged)?);

        for pass in BloomPass::ALL {
            let dest = pass.destination();
            let (width, height) = self
                .targets
                .targets()
                .extent(dest)
                .ok_or_else(|| EngineError::resource(dest.label(), "target is not allocated"))?;

            let staged = transient.push_pod(&BloomParams::new(pass.direction(), width, height))?;
            queue.write_buffer(&self.bindings.bloom_ubos[pass.index()], 0, transient.bytes(&staged)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::device::noop_device;
    use crate::render::TargetId;
    use crate::resources::AssetConfig;

    const BACK_BUFFER: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    /// A noop-backend device with a swapchain that only records its size.
    struct Offscreen {
        device: wgpu::Device,
        queue: wgpu::Queue,
        swapchain: (u32, u32),
    }

    impl Offscreen {
        fn new(width: u32, height: u32) -> Self {
            let (device, queue) = noop_device();
            Self {
                device,
                queue,
                swapchain: (width, height),
            }
        }
    }

    impl SwapchainResize for Offscreen {
        fn resize_swapchain(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
            self.swapchain = (width, height);
            Ok(())
        }
    }

    impl TargetFactory for Offscreen {
        type Target = RenderTarget;

        fn create_target(&self, id: TargetId, width: u32, height: u32) -> Result<RenderTarget, EngineError> {
            self.device.create_target(id, width, height)
        }
    }

    impl AsRef<wgpu::Device> for Offscreen {
        fn as_ref(&self) -> &wgpu::Device {
            &self.device
        }
    }

    fn shipped_resources(device: &wgpu::Device) -> Resources {
        let mut arena = Arena::new(64 * 1024).unwrap();
        let config = AssetConfig {
            shader_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/shaders"),
        };
        Resources::load(device, &mut arena, &config).unwrap()
    }

    fn pipeline_at(gpu: &Offscreen, resources: &Resources, width: u32, height: u32) -> RenderPipeline {
        match RenderPipeline::create(&gpu.device, width, height, BACK_BUFFER, resources) {
            Ok(pipeline) => pipeline,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn builds_against_shipped_shaders() {
        let gpu = Offscreen::new(1280, 720);
        let resources = shipped_resources(&gpu.device);
        let pipeline = pipeline_at(&gpu, &resources, 1280, 720);

        assert_eq!(pipeline.bind_groups.len(), FRAME_PASSES.len());
        assert!(pipeline.targets().is_consistent());
        assert_eq!(pipeline.targets().targets().extent(TargetId::LargeBloom), Some((640, 360)));
    }

    #[test]
    fn resize_rebuilds_every_bind_group() {
        let mut gpu = Offscreen::new(1280, 720);
        let resources = shipped_resources(&gpu.device);
        let mut pipeline = pipeline_at(&gpu, &resources, 1280, 720);
        let before = pipeline.bind_groups.clone();

        let outcome = pipeline.resize(&mut gpu, 640, 480).unwrap();

        assert_eq!(outcome, ResizeOutcome::Applied);
        assert_eq!(gpu.swapchain, (640, 480));
        assert!(pipeline.targets().is_consistent());
        assert_eq!(
            pipeline.targets().targets().extent(TargetId::LargeBloomIntermediate),
            Some((320, 240))
        );
        assert_eq!(pipeline.bind_groups.len(), before.len());
        for (old, new) in before.iter().zip(&pipeline.bind_groups) {
            assert_ne!(old, new);
        }
    }

    #[test]
    fn minimized_resize_keeps_bindings() {
        let mut gpu = Offscreen::new(1280, 720);
        let resources = shipped_resources(&gpu.device);
        let mut pipeline = pipeline_at(&gpu, &resources, 1280, 720);
        let before = pipeline.bind_groups.clone();

        assert_eq!(pipeline.resize(&mut gpu, 0, 0).unwrap(), ResizeOutcome::Deferred);
        assert_eq!(pipeline.bind_groups, before);
        assert_eq!(pipeline.targets().targets().extent(TargetId::Hdr), Some((1280, 720)));
    }

    #[test]
    fn layout_mismatch_is_a_creation_error() {
        let gpu = Offscreen::new(64, 64);
        let resources = shipped_resources(&gpu.device);
        let bindings = Bindings::new(&gpu.device).unwrap();

        // The composite layout has no parameter buffer at binding 4.
        let err = create_program(
            &gpu.device,
            "mismatched bloom pipeline",
            &bindings.layouts[program_slot(Program::Composite)],
            &resources.shaders.copy_vs,
            &[],
            &resources.shaders.bloom_ps,
            TARGET_FORMAT,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ResourceCreation { .. }), "{err}");
    }

    #[test]
    fn parameters_are_staged_in_transient_arena() {
        let gpu = Offscreen::new(1280, 720);
        let resources = shipped_resources(&gpu.device);
        let pipeline = pipeline_at(&gpu, &resources, 1280, 720);
        let mut transient = Arena::new(4096).unwrap();

        pipeline.upload_params(&gpu.queue, &mut transient, 4.0).unwrap();

        let expected = std::mem::size_of::<IntensityParams>() + BloomPass::COUNT * std::mem::size_of::<BloomParams>();
        assert_eq!(transient.used(), expected);
    }

    #[test]
    fn pass_inputs_fit_program_layouts() {
        for desc in &FRAME_PASSES {
            let textures = PROGRAM_TEXTURES[program_slot(desc.program)];
            assert_eq!(desc.inputs.len() as u32, textures, "{}", desc.label);
            assert!(textures <= SAMPLER_BINDING);
        }
    }

    #[test]
    fn only_scene_and_bloom_take_parameters() {
        assert!(params_binding_type(Program::Scene).is_some());
        assert!(params_binding_type(Program::Bloom(BloomPass::MediumVertical)).is_some());
        assert!(params_binding_type(Program::BrightPass).is_none());
        assert!(params_binding_type(Program::Composite).is_none());
    }

    #[test]
    fn lost_surface_is_a_surface_failure() {
        let err = skip_or_fail(SurfaceErrorAction::Fatal, "out of memory".to_string()).unwrap_err();
        assert!(matches!(err, EngineError::Surface(ref r) if r == "out of memory"));

        for action in [SurfaceErrorAction::Reconfigured, SurfaceErrorAction::SkipFrame] {
            assert_eq!(skip_or_fail(action, String::new()).unwrap(), FrameOutcome::Skipped);
        }
    }

    #[test]
    fn program_slots_are_distinct() {
        let mut slots: Vec<usize> = FRAME_PASSES.iter().map(|p| program_slot(p.program)).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }
}
