//! Viewer configuration.
//!
//! Defaults reproduce the reference viewer: a 1024x768 window with 16x MSAA,
//! a 55° perspective, Lambert shading with 0.32 ambient and a model spinning
//! at 1.2 rad/s two units in front of the camera.

use std::path::PathBuf;

use glam::Vec3;
use plyview_core::geometry_buffers::MAX_ELEMENTS;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Multisample count requested for the framebuffer.
    pub msaa_samples: u32,
    pub vsync: bool,
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "PLY Viewer".to_string(),
            msaa_samples: 16,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 55.0,
            near: 0.01,
            far: 64.0,
        }
    }
}

/// Uniforms of the fixed per-vertex Lambert shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertParams {
    pub ambient: f32,
    pub saturate: f32,
    pub opacity: f32,
    /// Light position in view space.
    pub light_position: Vec3,
}

impl Default for LambertParams {
    fn default() -> Self {
        Self {
            ambient: 0.32,
            saturate: 1.0,
            opacity: 1.0,
            light_position: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Rotation about the model's Z axis, in radians per second.
    pub spin_rate: f32,
    /// Distance from the eye along -Z.
    pub distance: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spin_rate: 1.2,
            distance: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub model_path: PathBuf,
    /// Staging capacity, in elements, of each geometry buffer.
    pub capacity: usize,
    pub window: WindowConfig,
    pub projection: ProjectionConfig,
    pub lighting: LambertParams,
    pub motion: MotionConfig,
    /// Stop after this many frames; `None` runs until interrupted.
    pub max_frames: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("test.ply"),
            capacity: MAX_ELEMENTS,
            window: WindowConfig::default(),
            projection: ProjectionConfig::default(),
            lighting: LambertParams::default(),
            motion: MotionConfig::default(),
            max_frames: None,
        }
    }
}

impl ViewerConfig {
    pub fn with_model(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    pub fn with_msaa(mut self, samples: u32) -> Self {
        self.window.msaa_samples = samples;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }
}
