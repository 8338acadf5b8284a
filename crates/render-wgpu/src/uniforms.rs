use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Matrices bound at `@group(0) @binding(0)` of the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TransformUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub rotation_x: [[f32; 4]; 4],
    pub rotation_y: [[f32; 4]; 4],
}

impl TransformUniforms {
    /// Initial contents: the given projection, everything else identity.
    pub fn with_projection(projection: Mat4) -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            view: identity,
            projection: projection.to_cols_array_2d(),
            rotation_x: identity,
            rotation_y: identity,
        }
    }
}

/// Light bound at `@group(0) @binding(1)` of the fragment stage.
/// `vec3<f32>` in a uniform struct rounds the struct up to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightUniforms {
    pub dir_to_light: [f32; 3],
    _pad: f32,
}

impl LightUniforms {
    pub fn new(dir_to_light: Vec3) -> Self {
        Self {
            dir_to_light: dir_to_light.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-instance world matrix, one column per vertex attribute (locations 2..5).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct InstanceData {
    pub world_0: [f32; 4],
    pub world_1: [f32; 4],
    pub world_2: [f32; 4],
    pub world_3: [f32; 4],
}

impl From<Mat4> for InstanceData {
    fn from(world: Mat4) -> Self {
        let cols = world.to_cols_array_2d();
        Self {
            world_0: cols[0],
            world_1: cols[1],
            world_2: cols[2],
            world_3: cols[3],
        }
    }
}

/// Byte offsets of each matrix inside the transform uniform buffer.
/// Resolved once; per-frame updates write straight to these slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlots {
    pub view: u64,
    pub projection: u64,
    pub rotation_x: u64,
    pub rotation_y: u64,
}

impl UniformSlots {
    pub const fn resolve() -> Self {
        Self {
            view: offset_of!(TransformUniforms, view) as u64,
            projection: offset_of!(TransformUniforms, projection) as u64,
            rotation_x: offset_of!(TransformUniforms, rotation_x) as u64,
            rotation_y: offset_of!(TransformUniforms, rotation_y) as u64,
        }
    }
}
