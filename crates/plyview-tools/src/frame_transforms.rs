//! Per-frame matrices.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::config::{MotionConfig, ProjectionConfig, WindowConfig};

/// Model-view matrix at `seconds` since start.
///
/// The model is stood up with a quarter turn about X then Y, spun about its
/// own Z axis and pushed `distance` units in front of the eye.
pub fn model_matrix(seconds: f32, motion: &MotionConfig) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -motion.distance))
        * Mat4::from_rotation_z(seconds * motion.spin_rate)
        * Mat4::from_rotation_y(FRAC_PI_2)
        * Mat4::from_rotation_x(FRAC_PI_2)
}

pub fn projection_matrix(projection: &ProjectionConfig, window: &WindowConfig) -> Mat4 {
    Mat4::perspective_rh_gl(
        projection.fov_y_degrees.to_radians(),
        window.aspect_ratio(),
        projection.near,
        projection.far,
    )
}
