use glam::{Mat4, Vec3};

/// Tunables for the translating camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Units per second at full velocity.
    pub speed: f32,
    /// Constant offset added to the camera's z translation.
    pub eye_offset_z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            eye_offset_z: 5.0,
        }
    }
}

/// Accumulated camera offset. The camera only translates; it never rotates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraState {
    pub x: f32,
    pub z: f32,
}

impl CameraState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by velocities in {-1, 0, 1} over `dt` seconds.
    pub fn advance(&mut self, forward: f32, side: f32, dt: f32, config: &CameraConfig) {
        self.x += forward * dt * config.speed;
        self.z += side * dt * config.speed;
    }

    /// Translation-only view matrix. Its translation column is
    /// `(x, 0, z + eye_offset_z)`: the scene is pushed along +z away from a
    /// camera fixed at the origin.
    pub fn view_matrix(&self, config: &CameraConfig) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.x, 0.0, self.z + config.eye_offset_z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn zero_velocity_is_idempotent() {
        let config = CameraConfig::default();
        let mut cam = CameraState { x: 1.5, z: -2.0 };
        for dt in [0.0, 0.016, 1.0, 250.0] {
            cam.advance(0.0, 0.0, dt, &config);
        }
        assert_eq!(cam, CameraState { x: 1.5, z: -2.0 });
    }

    #[test]
    fn forward_moves_x_at_configured_speed() {
        let config = CameraConfig::default();
        let mut cam = CameraState::new();
        for _ in 0..10 {
            cam.advance(1.0, 0.0, 0.25, &config);
        }
        assert!((cam.x - 10.0).abs() < 1e-4);
        assert_eq!(cam.z, 0.0);
    }

    #[test]
    fn side_moves_z() {
        let config = CameraConfig::default();
        let mut cam = CameraState::new();
        cam.advance(0.0, -1.0, 0.5, &config);
        assert!((cam.z + 2.0).abs() < 1e-6);
        assert_eq!(cam.x, 0.0);
    }

    #[test]
    fn view_matrix_translation_column() {
        let config = CameraConfig::default();
        let cam = CameraState { x: 3.0, z: -1.0 };
        let view = cam.view_matrix(&config);
        assert_eq!(view.w_axis, Vec4::new(3.0, 0.0, 4.0, 1.0));
        assert_eq!(view.x_axis, Vec4::X);
        assert_eq!(view.y_axis, Vec4::Y);
        assert_eq!(view.z_axis, Vec4::Z);
    }
}
