//! Scene state for the cube field: instance layout, model rotation, the
//! translating camera and frame timing.
//!
//! # Invariants
//! - No GPU types here; everything is plain math driven by explicit `Instant`s.
//! - Rotation depends only on time since start; the camera only on held keys
//!   and time since the previous frame.

pub mod camera;
pub mod clock;
pub mod frame;
pub mod grid;
pub mod transform;

pub use camera::{CameraConfig, CameraState};
pub use clock::FrameClock;
pub use frame::{FrameState, FrameTransforms};
pub use grid::GridLayout;
pub use transform::{
    DIR_TO_LIGHT, FIXED_PROJECTION, ModelRotation, RotationRates, rotation_x, rotation_y,
    world_matrix, wrapped_angle,
};
