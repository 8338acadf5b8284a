//! Shader program construction: compile each stage, link the pair, then
//! build the GPU pipeline.
//!
//! Compiling and linking run on the CPU through naga, the same front end
//! wgpu uses, so a broken shader is rejected with a readable log before any
//! GPU object exists. Pipeline creation then runs inside a validation error
//! scope and any error it reports is treated as a link failure.

use std::collections::BTreeMap;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, BuiltIn, Handle, Module, Scalar, Type, TypeInner, VectorSize};

use crate::shaders::{FRAGMENT_ENTRY, FRAGMENT_SHADER, VERTEX_ENTRY, VERTEX_SHADER};
use crate::uniforms::{InstanceData, LightUniforms, TransformUniforms};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex attribute locations supplied by the pipeline's vertex buffers:
/// position and normal streams, then the four world-matrix columns.
const SUPPLIED_VERTEX_INPUTS: [(u32, VectorSize); 6] = [
    (0, VectorSize::Tri),
    (1, VectorSize::Tri),
    (2, VectorSize::Quad),
    (3, VectorSize::Quad),
    (4, VectorSize::Quad),
    (5, VectorSize::Quad),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => VERTEX_ENTRY,
            Self::Fragment => FRAGMENT_ENTRY,
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors from building the shader program. Both are fatal to init.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    ProgramLink { log: String },
}

impl ProgramError {
    fn link(log: impl Into<String>) -> Self {
        Self::ProgramLink { log: log.into() }
    }
}

/// One successfully compiled and validated stage.
#[derive(Debug)]
pub struct CompiledShader {
    pub stage: ShaderStage,
    pub source: String,
    module: Module,
}

/// Parse and validate one stage.
pub fn compile_shader(stage: ShaderStage, source: &str) -> Result<CompiledShader, ProgramError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ProgramError::ShaderCompile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|e| ProgramError::ShaderCompile {
            stage,
            log: e.emit_to_string(source),
        })?;

    Ok(CompiledShader {
        stage,
        source: source.to_string(),
        module,
    })
}

/// Location-bound inputs or outputs of an entry point.
#[derive(Debug, Default)]
struct Interface {
    locations: BTreeMap<u32, TypeInner>,
    writes_position: bool,
}

impl Interface {
    fn collect(&mut self, module: &Module, ty: Handle<Type>, binding: Option<&Binding>) {
        match binding {
            Some(Binding::Location { location, .. }) => {
                self.locations.insert(*location, module.types[ty].inner.clone());
            }
            Some(Binding::BuiltIn(BuiltIn::Position { .. })) => self.writes_position = true,
            Some(Binding::BuiltIn(_)) => {}
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                    for member in members {
                        self.collect(module, member.ty, member.binding.as_ref());
                    }
                }
            }
        }
    }
}

fn find_entry<'a>(shader: &'a CompiledShader) -> Result<&'a naga::EntryPoint, ProgramError> {
    let name = shader.stage.entry_point();
    shader
        .module
        .entry_points
        .iter()
        .find(|ep| ep.name == name && ep.stage == shader.stage.naga_stage())
        .ok_or_else(|| {
            ProgramError::link(format!(
                "{} shader has no @{} entry point named `{name}`",
                shader.stage, shader.stage
            ))
        })
}

fn inputs(module: &Module, entry: &naga::EntryPoint) -> Interface {
    let mut iface = Interface::default();
    for arg in &entry.function.arguments {
        iface.collect(module, arg.ty, arg.binding.as_ref());
    }
    iface
}

fn outputs(module: &Module, entry: &naga::EntryPoint) -> Interface {
    let mut iface = Interface::default();
    if let Some(result) = &entry.function.result {
        iface.collect(module, result.ty, result.binding.as_ref());
    }
    iface
}

/// A vertex/fragment pair whose interfaces agree with each other and with
/// the vertex buffer layout.
#[derive(Debug)]
pub struct LinkedProgram {
    pub vertex: CompiledShader,
    pub fragment: CompiledShader,
}

/// Check that the two stages fit together.
pub fn link_program(
    vertex: CompiledShader,
    fragment: CompiledShader,
) -> Result<LinkedProgram, ProgramError> {
    let vs = find_entry(&vertex)?;
    let fs = find_entry(&fragment)?;

    let vs_in = inputs(&vertex.module, vs);
    for (location, inner) in &vs_in.locations {
        let supplied = SUPPLIED_VERTEX_INPUTS
            .iter()
            .find(|(loc, _)| loc == location)
            .map(|&(_, size)| TypeInner::Vector {
                size,
                scalar: Scalar::F32,
            });
        if supplied.as_ref() != Some(inner) {
            return Err(ProgramError::link(format!(
                "vertex input @location({location}) is not supplied by the vertex buffers"
            )));
        }
    }

    let vs_out = outputs(&vertex.module, vs);
    if !vs_out.writes_position {
        return Err(ProgramError::link(
            "vertex shader does not write @builtin(position)",
        ));
    }

    let fs_in = inputs(&fragment.module, fs);
    for (location, inner) in &fs_in.locations {
        match vs_out.locations.get(location) {
            None => {
                return Err(ProgramError::link(format!(
                    "fragment input @location({location}) is not written by the vertex shader"
                )));
            }
            Some(produced) if produced != inner => {
                return Err(ProgramError::link(format!(
                    "fragment input @location({location}) is {inner:?} but the vertex shader writes {produced:?}"
                )));
            }
            Some(_) => {}
        }
    }

    Ok(LinkedProgram { vertex, fragment })
}

/// WGSL sources for the two stages.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for ProgramSource<'static> {
    fn default() -> Self {
        Self {
            vertex: VERTEX_SHADER,
            fragment: FRAGMENT_SHADER,
        }
    }
}

impl ProgramSource<'_> {
    /// Compile both stages and link them. Failures are logged with the full
    /// compiler or linker output before being returned.
    pub fn build(&self) -> Result<LinkedProgram, ProgramError> {
        let result = compile_shader(ShaderStage::Vertex, self.vertex).and_then(|vs| {
            let fs = compile_shader(ShaderStage::Fragment, self.fragment)?;
            link_program(vs, fs)
        });
        if let Err(e) = &result {
            tracing::error!("{e}");
        }
        result
    }
}

/// The GPU side of a linked program: render pipeline plus the layout of its
/// uniform bind group.
pub struct ShaderProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl ShaderProgram {
    pub fn create(
        device: &wgpu::Device,
        program: &LinkedProgram,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ProgramError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, size_of::<TransformUniforms>()),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, size_of::<LightUniforms>()),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_vertex_shader"),
            source: wgpu::ShaderSource::Wgsl(program.vertex.source.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_fragment_shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment.source.as_str().into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            let err = ProgramError::link(err.to_string());
            tracing::error!("{err}");
            return Err(err);
        }

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSTHROUGH_FS: &str = r#"
@fragment
fn fs_main(@location(0) n: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(n, 1.0);
}
"#;

    fn build(vertex: &str, fragment: &str) -> Result<LinkedProgram, ProgramError> {
        ProgramSource { vertex, fragment }.build()
    }

    #[test]
    fn builtin_program_compiles_and_links() {
        let program = ProgramSource::default().build().expect("built-in program");
        assert_eq!(program.vertex.stage, ShaderStage::Vertex);
        assert_eq!(program.fragment.stage, ShaderStage::Fragment);
    }

    #[test]
    fn malformed_vertex_source_fails_compile() {
        let err = build("fn vs_main( {", FRAGMENT_SHADER).unwrap_err();
        match err {
            ProgramError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_fragment_source_fails_compile() {
        let bad = FRAGMENT_SHADER.replace("normalize(normal)", "normalize(missing)");
        let err = build(VERTEX_SHADER, &bad).unwrap_err();
        assert!(matches!(
            err,
            ProgramError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn missing_entry_point_fails_link() {
        let vs = VERTEX_SHADER.replace("fn vs_main", "fn main");
        let err = build(&vs, FRAGMENT_SHADER).unwrap_err();
        match err {
            ProgramError::ProgramLink { log } => assert!(log.contains("vs_main")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn unwritten_fragment_input_fails_link() {
        let vs = r#"
@vertex
fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 1.0);
}
"#;
        let err = build(vs, PASSTHROUGH_FS).unwrap_err();
        assert!(matches!(err, ProgramError::ProgramLink { .. }));
    }

    #[test]
    fn mismatched_interface_type_fails_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) n: vec4<f32>) -> @location(0) vec4<f32> {
    return n;
}
"#;
        let err = build(VERTEX_SHADER, fs).unwrap_err();
        assert!(matches!(err, ProgramError::ProgramLink { .. }));
    }

    #[test]
    fn unsupplied_vertex_input_fails_link() {
        let vs = r#"
struct Out {
    @builtin(position) pos: vec4<f32>,
    @location(0) n: vec3<f32>,
};

@vertex
fn vs_main(@location(7) p: vec3<f32>) -> Out {
    var out: Out;
    out.pos = vec4<f32>(p, 1.0);
    out.n = p;
    return out;
}
"#;
        let err = build(vs, PASSTHROUGH_FS).unwrap_err();
        match err {
            ProgramError::ProgramLink { log } => assert!(log.contains("location(7)")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn compile_error_reports_stage_in_message() {
        let err = compile_shader(ShaderStage::Fragment, "@fragment fn fs_main(").unwrap_err();
        assert!(err.to_string().starts_with("fragment shader failed to compile"));
    }
}
