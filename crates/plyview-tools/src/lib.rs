//! Viewer front end for the PLY ingestion pipeline.
//!
//! [`Viewer`] owns the staging arena and the model slots, loads models
//! through any [`RenderBackend`] and draws slot 0 every frame with the
//! transforms from [`frame_transforms`]. [`HeadlessGpu`] is the backend used
//! by the `plyview` binary and the tests.

pub mod cli;
pub mod config;
pub mod frame_transforms;
pub mod headless;
pub mod render_loop;

pub use cli::CliArgs;
pub use config::{LambertParams, MotionConfig, ProjectionConfig, ViewerConfig, WindowConfig};
pub use headless::{HeadlessGpu, MeshHandle};
pub use render_loop::{DrawCall, RenderBackend, RunSummary, Viewer};
