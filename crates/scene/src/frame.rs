use std::time::Instant;

use cubefield_input::{InputState, KeyEvent};
use glam::Mat4;

use crate::camera::{CameraConfig, CameraState};
use crate::clock::FrameClock;
use crate::transform::{ModelRotation, RotationRates};

/// Per-frame transforms handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub rotation: ModelRotation,
    pub view: Mat4,
}

/// Everything that changes between frames: camera, held keys and timing.
///
/// Owned by a single renderer. Input and render callbacks are serialized by
/// the host, so no synchronization is needed.
#[derive(Debug, Clone)]
pub struct FrameState {
    pub camera: CameraState,
    pub input: InputState,
    pub camera_config: CameraConfig,
    pub rotation_rates: RotationRates,
    clock: FrameClock,
}

impl FrameState {
    pub fn new(now: Instant) -> Self {
        Self::with_config(now, CameraConfig::default(), RotationRates::default())
    }

    pub fn with_config(
        now: Instant,
        camera_config: CameraConfig,
        rotation_rates: RotationRates,
    ) -> Self {
        Self {
            camera: CameraState::new(),
            input: InputState::new(),
            camera_config,
            rotation_rates,
            clock: FrameClock::new(now),
        }
    }

    /// Forward a key event to the input state. Returns whether it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.input.handle_key(event)
    }

    /// Model rotation for the time elapsed since start.
    pub fn rotation(&self, now: Instant) -> ModelRotation {
        ModelRotation::at(self.clock.elapsed(now).as_secs_f64(), self.rotation_rates)
    }

    /// Advance the camera by the time since the previous update and return
    /// the new view matrix.
    pub fn update_view(&mut self, now: Instant) -> Mat4 {
        let dt = self.clock.tick(now);
        self.camera.advance(
            self.input.forward(),
            self.input.side(),
            dt,
            &self.camera_config,
        );
        tracing::trace!(
            dt,
            camera_x = self.camera.x,
            camera_z = self.camera.z,
            "camera updated"
        );
        self.camera.view_matrix(&self.camera_config)
    }

    /// Rotation first, then the view update, both against the same `now`.
    pub fn advance(&mut self, now: Instant) -> FrameTransforms {
        let rotation = self.rotation(now);
        let view = self.update_view(now);
        FrameTransforms { rotation, view }
    }
}
