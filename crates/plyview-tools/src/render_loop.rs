//! The viewer: one staging arena, a list of model slots and a frame loop
//! that draws slot 0.

use std::fmt;
use std::path::Path;

use glam::Mat4;
use log::debug;

use plyview_core::geometry_buffers::GeometryBuffers;
use plyview_core::vertex_layout::{IndexType, VertexLayout};
use plyview_mesh::{load_model, GpuUpload, LoadedModel, ModelSlots};

use crate::config::{LambertParams, ViewerConfig};
use crate::frame_transforms::{model_matrix, projection_matrix};

/// Everything the Lambert shader needs for one indexed draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall<H> {
    pub handle: H,
    pub index_count: usize,
    pub index_type: IndexType,
    pub layout: VertexLayout,
    pub model: Mat4,
    pub projection: Mat4,
    pub lighting: LambertParams,
}

/// A GPU that can also draw what it uploaded.
pub trait RenderBackend: GpuUpload {
    /// Clear color and depth.
    fn begin_frame(&mut self);

    fn draw(&mut self, call: DrawCall<Self::Handle>);

    /// Swap buffers.
    fn end_frame(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub draws: u64,
    pub indices_drawn: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} draws, {} indices",
            self.frames, self.draws, self.indices_drawn
        )
    }
}

pub struct Viewer<B: RenderBackend> {
    config: ViewerConfig,
    backend: B,
    buffers: GeometryBuffers,
    slots: ModelSlots<B::Handle>,
    projection: Mat4,
    summary: RunSummary,
}

impl<B> Viewer<B>
where
    B: RenderBackend,
    B::Handle: Clone,
{
    pub fn new(config: ViewerConfig, backend: B) -> Self {
        let projection = projection_matrix(&config.projection, &config.window);
        Self {
            buffers: GeometryBuffers::with_capacity(config.capacity),
            slots: ModelSlots::new(),
            config,
            backend,
            projection,
            summary: RunSummary::default(),
        }
    }

    /// Load a model into the next slot.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> usize {
        load_model(path, &mut self.buffers, &mut self.backend, &mut self.slots)
    }

    /// Load the model named by the configuration.
    pub fn load_configured(&mut self) -> usize {
        let path = self.config.model_path.clone();
        self.load(path)
    }

    /// The model drawn every frame, if slot 0 holds one.
    pub fn active_model(&self) -> Option<&LoadedModel<B::Handle>> {
        self.slots.get(0).and_then(|slot| slot.model())
    }

    /// Render one frame at `seconds` since start. Returns whether anything
    /// was drawn.
    pub fn render_frame(&mut self, seconds: f32) -> bool {
        self.backend.begin_frame();
        let call = self.active_model().map(|model| DrawCall {
            handle: model.handle.clone(),
            index_count: model.index_count,
            index_type: model.index_type,
            layout: model.layout.clone(),
            model: model_matrix(seconds, &self.config.motion),
            projection: self.projection,
            lighting: self.config.lighting,
        });
        let drew = match call {
            Some(call) => {
                self.summary.draws += 1;
                self.summary.indices_drawn += call.index_count as u64;
                self.backend.draw(call);
                true
            }
            None => false,
        };
        self.backend.end_frame();
        self.summary.frames += 1;
        drew
    }

    /// Render `frames` frames spaced `frame_time` seconds apart.
    pub fn run(&mut self, frames: u64, frame_time: f32) -> RunSummary {
        debug!("Rendering {} frames at {:.4}s per frame", frames, frame_time);
        let start = self.summary.frames;
        for frame in 0..frames {
            self.render_frame((start + frame) as f32 * frame_time);
        }
        self.summary
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn slots(&self) -> &ModelSlots<B::Handle> {
        &self.slots
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
