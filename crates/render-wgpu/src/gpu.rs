use std::time::Instant;

use cubefield_input::KeyEvent;
use cubefield_scene::{
    CameraConfig, DIR_TO_LIGHT, FIXED_PROJECTION, FrameState, GridLayout, RotationRates,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::mesh::MeshBuffers;
use crate::program::{DEPTH_FORMAT, ProgramError, ProgramSource, ShaderProgram};
use crate::uniforms::{InstanceData, LightUniforms, TransformUniforms, UniformSlots};

/// Number of initial frames announced in the log.
const LOGGED_FRAMES: u64 = 5;

/// Renderer tunables. Defaults reproduce the demo as designed.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub clear_color: wgpu::Color,
    /// Clear depth at the start of every frame. Off by default: depth is
    /// cleared once after the depth target is created and then only loaded.
    pub clear_depth_each_frame: bool,
    pub camera: CameraConfig,
    pub rotation: RotationRates,
    pub grid: GridLayout,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            clear_depth_each_frame: false,
            camera: CameraConfig::default(),
            rotation: RotationRates::default(),
            grid: GridLayout::default(),
        }
    }
}

/// Renders the rotating cube grid. Owns the shader program, the static
/// mesh and instance buffers, and all per-frame state.
pub struct CubeRenderer {
    program: ShaderProgram,
    transform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slots: UniformSlots,
    mesh: MeshBuffers,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    depth_texture: wgpu::TextureView,
    depth_needs_clear: bool,
    frame: FrameState,
    config: RenderConfig,
    frames_rendered: u64,
}

impl CubeRenderer {
    /// Build the renderer with the built-in shaders.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self, ProgramError> {
        Self::with_program(
            device,
            surface_format,
            width,
            height,
            config,
            ProgramSource::default(),
        )
    }

    /// Build the renderer from the given shader sources. Nothing is kept if
    /// either stage fails to compile or the pair fails to link.
    pub fn with_program(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: RenderConfig,
        source: ProgramSource<'_>,
    ) -> Result<Self, ProgramError> {
        let linked = source.build()?;
        let program = ShaderProgram::create(device, &linked, surface_format)?;

        let slots = UniformSlots::resolve();
        tracing::info!(
            view = slots.view,
            projection = slots.projection,
            rotation_x = slots.rotation_x,
            rotation_y = slots.rotation_y,
            "uniform slots resolved"
        );

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("transform_uniform_buffer"),
            contents: bytemuck::bytes_of(&TransformUniforms::with_projection(FIXED_PROJECTION)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light_uniform_buffer"),
            contents: bytemuck::bytes_of(&LightUniforms::new(DIR_TO_LIGHT)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cube_bind_group"),
            layout: &program.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let mesh = MeshBuffers::upload_cube(device);

        let instances: Vec<InstanceData> = config
            .grid
            .world_matrices()
            .into_iter()
            .map(InstanceData::from)
            .collect();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_instance_buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_count = instances.len() as u32;

        let depth_texture = Self::create_depth_texture(device, width, height);
        let frame = FrameState::with_config(Instant::now(), config.camera, config.rotation);

        tracing::info!(
            instances = instance_count,
            indices = mesh.index_count,
            ?surface_format,
            "cube renderer initialized"
        );

        Ok(Self {
            program,
            transform_buffer,
            uniform_bind_group,
            slots,
            mesh,
            instance_buffer,
            instance_count,
            depth_texture,
            depth_needs_clear: true,
            frame,
            config,
            frames_rendered: 0,
        })
    }

    /// Key handler for the host's input source. Returns whether the event
    /// was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.frame.handle_key(event)
    }

    /// Forget held keys, e.g. on focus loss.
    pub fn release_keys(&mut self) {
        self.frame.input.release_all();
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
        self.depth_needs_clear = true;
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Render one frame into `target`: update rotation and view, clear
    /// color, then draw every cube instance with its own draw call.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        now: Instant,
    ) {
        if self.frames_rendered < LOGGED_FRAMES {
            tracing::debug!(frame = self.frames_rendered, "rendering frame");
        }

        let transforms = self.frame.advance(now);
        self.write_matrix(queue, self.slots.rotation_x, &transforms.rotation.x);
        self.write_matrix(queue, self.slots.rotation_y, &transforms.rotation.y);
        self.write_matrix(queue, self.slots.view, &transforms.view);

        let depth_load = if self.depth_needs_clear || self.config.clear_depth_each_frame {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        self.depth_needs_clear = false;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cube_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.program.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.mesh.positions.slice(..));
            pass.set_vertex_buffer(1, self.mesh.normals.slice(..));
            pass.set_vertex_buffer(2, self.instance_buffer.slice(..));
            pass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint32);

            for instance in 0..self.instance_count {
                pass.draw_indexed(0..self.mesh.index_count, 0, instance..instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        self.frames_rendered += 1;
    }

    fn write_matrix(&self, queue: &wgpu::Queue, slot: u64, matrix: &Mat4) {
        queue.write_buffer(
            &self.transform_buffer,
            slot,
            bytemuck::bytes_of(&matrix.to_cols_array()),
        );
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_demo() {
        let config = RenderConfig::default();
        assert_eq!(config.clear_color, wgpu::Color::BLACK);
        assert!(!config.clear_depth_each_frame);
        assert_eq!(config.grid.instance_count(), 200);
        assert_eq!(config.camera.speed, 4.0);
        assert_eq!(config.rotation.y, 0.9);
    }
}
