use glam::{Mat4, Vec3};

use crate::transform::world_matrix;

/// Layout of the cube instances: `layers` vertical slices of `rows` (depth)
/// by `columns` (horizontal) cubes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub layers: u32,
    pub rows: u32,
    pub columns: u32,
    /// Spacing between neighbouring cubes along X and Z.
    pub pitch: f32,
    /// Spacing between the vertical layers.
    pub layer_pitch: f32,
    /// Translation of the instance at index (0, 0, 0).
    pub origin: Vec3,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            layers: 2,
            rows: 10,
            columns: 10,
            pitch: 4.0,
            layer_pitch: 6.0,
            origin: Vec3::new(-20.0, -3.0, -5.0),
        }
    }
}

impl GridLayout {
    pub fn instance_count(&self) -> u32 {
        self.layers * self.rows * self.columns
    }

    /// Instance translations, layer-major then row then column.
    pub fn translations(&self) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(self.instance_count() as usize);
        for y in 0..self.layers {
            let ty = self.origin.y + y as f32 * self.layer_pitch;
            for z in 0..self.rows {
                let tz = self.origin.z + z as f32 * self.pitch;
                for x in 0..self.columns {
                    let tx = self.origin.x + x as f32 * self.pitch;
                    out.push(Vec3::new(tx, ty, tz));
                }
            }
        }
        out
    }

    pub fn world_matrices(&self) -> Vec<Mat4> {
        self.translations().into_iter().map(world_matrix).collect()
    }
}
