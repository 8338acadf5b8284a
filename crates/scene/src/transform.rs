use glam::{Mat4, Vec3, Vec4};
use std::f64::consts::TAU;

/// Fixed perspective projection. Maps view-space depth 0.1..100 onto 0..1.
pub const FIXED_PROJECTION: Mat4 = Mat4::from_cols(
    Vec4::new(1.81, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 2.41, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.001, 1.0),
    Vec4::new(0.0, 0.0, -0.1001, 0.0),
);

/// Normalized direction towards the single directional light.
pub const DIR_TO_LIGHT: Vec3 = Vec3::new(0.262705, 0.938233, 0.225176);

/// Angular rates (radians per second) of the model rotation about local X and Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationRates {
    pub x: f64,
    pub y: f64,
}

impl Default for RotationRates {
    fn default() -> Self {
        Self { x: 1.0, y: 0.9 }
    }
}

/// Wrap `rate * t` into `[0, 2π)`. Computed in f64 so long sessions keep
/// their precision before narrowing.
pub fn wrapped_angle(elapsed_secs: f64, rate: f64) -> f32 {
    let a = (elapsed_secs * rate).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a as f32 }
}

/// Rotation about the model's local X axis.
pub fn rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, c, s, 0.0),
        Vec4::new(0.0, -s, c, 0.0),
        Vec4::W,
    )
}

/// Rotation about the model's local Y axis.
pub fn rotation_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols(
        Vec4::new(c, 0.0, -s, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(s, 0.0, c, 0.0),
        Vec4::W,
    )
}

/// The pair of model rotations applied to every cube for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRotation {
    pub angle_x: f32,
    pub angle_y: f32,
    pub x: Mat4,
    pub y: Mat4,
}

impl ModelRotation {
    pub fn at(elapsed_secs: f64, rates: RotationRates) -> Self {
        let angle_x = wrapped_angle(elapsed_secs, rates.x);
        let angle_y = wrapped_angle(elapsed_secs, rates.y);
        Self {
            angle_x,
            angle_y,
            x: rotation_x(angle_x),
            y: rotation_y(angle_y),
        }
    }
}

/// Translation-only world matrix for one cube instance.
pub fn world_matrix(translation: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn angles_wrap_into_full_turn() {
        for t in [0.0, 0.5, 3.0, 6.5, 100.0, 12345.678] {
            let r = ModelRotation::at(t, RotationRates::default());
            assert!((0.0..TAU as f32).contains(&r.angle_x), "t={t}");
            assert!((0.0..TAU as f32).contains(&r.angle_y), "t={t}");
            assert!((r.angle_x - (t % TAU) as f32).abs() < 1e-4, "t={t}");
            assert!((r.angle_y - ((0.9 * t) % TAU) as f32).abs() < 1e-4, "t={t}");
        }
    }

    #[test]
    fn angle_just_past_full_turn() {
        let a = wrapped_angle(TAU + 0.25, 1.0);
        assert!((a - 0.25).abs() < EPS);
    }

    #[test]
    fn rotation_x_matches_glam() {
        for a in [0.0_f32, 0.3, 1.7, 4.0] {
            assert!(rotation_x(a).abs_diff_eq(Mat4::from_rotation_x(a), EPS));
        }
    }

    #[test]
    fn rotation_y_matches_glam() {
        for a in [0.0_f32, 0.3, 1.7, 4.0] {
            assert!(rotation_y(a).abs_diff_eq(Mat4::from_rotation_y(a), EPS));
        }
    }

    #[test]
    fn rotations_are_identity_at_start() {
        let r = ModelRotation::at(0.0, RotationRates::default());
        assert_eq!(r.x, Mat4::IDENTITY);
        assert_eq!(r.y, Mat4::IDENTITY);
    }

    #[test]
    fn light_direction_is_normalized() {
        assert!((DIR_TO_LIGHT.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn projection_maps_depth_range_to_unit_interval() {
        let near = FIXED_PROJECTION * Vec4::new(0.0, 0.0, 0.1, 1.0);
        let far = FIXED_PROJECTION * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn world_matrix_is_translation_only() {
        let m = world_matrix(Vec3::new(4.0, -3.0, 7.0));
        assert_eq!(m.w_axis, Vec4::new(4.0, -3.0, 7.0, 1.0));
        assert_eq!(m.x_axis, Vec4::X);
        assert_eq!(m.y_axis, Vec4::Y);
        assert_eq!(m.z_axis, Vec4::Z);
    }
}
