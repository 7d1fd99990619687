//! Model loading: decode, assemble, upload, record.
//!
//! Every load attempt appends exactly one [`ModelSlot`] to a [`ModelSlots`]
//! collection, whether it succeeded or not. A failed attempt never reaches
//! the GPU collaborator.

use std::path::Path;

use log::{info, warn};

use plyview_core::geometry_buffers::GeometryBuffers;
use plyview_core::status::{PlyError, Status};
use plyview_core::vertex_layout::{IndexType, VertexLayout};
use plyview_io::ply_reader::PlyReader;
use plyview_io::traits::{ElementCounts, PropertyStream};

use crate::mesh_assembler::MeshAssembler;

/// Staged model handed to the GPU collaborator.
#[derive(Debug, Clone, Copy)]
pub struct StagedMesh<'a> {
    /// Interleaved vertex scalars, `layout.stride()` per vertex.
    pub vertices: &'a [f32],
    pub indices: &'a [u16],
    pub layout: &'a VertexLayout,
    pub index_type: IndexType,
    /// Counts declared by the header.
    pub counts: ElementCounts,
}

/// Turns staged data into renderable GPU objects.
///
/// Implementations must copy what they need: the staging arena is reused by
/// the next load.
pub trait GpuUpload {
    type Handle;

    fn upload(&mut self, mesh: &StagedMesh<'_>) -> Status<Self::Handle>;
}

/// A successfully uploaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel<H> {
    pub handle: H,
    pub index_count: usize,
    pub index_type: IndexType,
    pub layout: VertexLayout,
    pub vertex_len: usize,
    pub counts: ElementCounts,
    /// Set when a staging buffer filled up before the body ended.
    pub truncated: bool,
}

#[derive(Debug)]
pub enum ModelSlot<H> {
    Loaded(LoadedModel<H>),
    Failed(PlyError),
}

impl<H> ModelSlot<H> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }

    pub fn model(&self) -> Option<&LoadedModel<H>> {
        match self {
            ModelSlot::Loaded(model) => Some(model),
            ModelSlot::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PlyError> {
        match self {
            ModelSlot::Loaded(_) => None,
            ModelSlot::Failed(err) => Some(err),
        }
    }
}

/// Load attempts in the order they were made.
#[derive(Debug)]
pub struct ModelSlots<H> {
    slots: Vec<ModelSlot<H>>,
}

impl<H> ModelSlots<H> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot the next load attempt will occupy.
    pub fn next_slot(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&ModelSlot<H>> {
        self.slots.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSlot<H>> {
        self.slots.iter()
    }

    pub fn loaded(&self) -> impl Iterator<Item = &LoadedModel<H>> {
        self.slots.iter().filter_map(ModelSlot::model)
    }

    fn record(&mut self, result: Status<LoadedModel<H>>, source: &dyn std::fmt::Display) -> usize {
        let slot = self.slots.len();
        match result {
            Ok(model) => {
                info!("Loaded PLY: {} {} {}", slot + 1, model.vertex_len, model.index_count);
                self.slots.push(ModelSlot::Loaded(model));
            }
            Err(err) => {
                warn!("Failed to load {} into slot {}: {}", source, slot + 1, err);
                self.slots.push(ModelSlot::Failed(err));
            }
        }
        slot
    }
}

impl<H> Default for ModelSlots<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a PLY file into the next slot and return that slot's index.
///
/// Failures are recorded in the slot rather than returned.
pub fn load_model<P, U>(
    path: P,
    buffers: &mut GeometryBuffers,
    uploader: &mut U,
    slots: &mut ModelSlots<U::Handle>,
) -> usize
where
    P: AsRef<Path>,
    U: GpuUpload,
{
    let path = path.as_ref();
    buffers.reset();
    let result = PlyReader::open(path)
        .and_then(|reader| stage_and_upload(reader.into_events(), buffers, uploader));
    slots.record(result, &path.display())
}

/// Load from an already decoded event stream into the next slot.
pub fn load_stream<S, U>(
    stream: S,
    buffers: &mut GeometryBuffers,
    uploader: &mut U,
    slots: &mut ModelSlots<U::Handle>,
) -> usize
where
    S: PropertyStream,
    U: GpuUpload,
{
    let result = stage_and_upload(stream, buffers, uploader);
    slots.record(result, &"event stream")
}

fn stage_and_upload<S, U>(
    stream: S,
    buffers: &mut GeometryBuffers,
    uploader: &mut U,
) -> Status<LoadedModel<U::Handle>>
where
    S: PropertyStream,
    U: GpuUpload,
{
    let counts = stream.declared_counts();
    let mut assembler = MeshAssembler::new(buffers);
    assembler.consume(stream)?;
    let report = assembler.finish();

    if report.non_triangular_faces > 0 {
        warn!(
            "{} faces are not triangles; their indices were appended without triangulation",
            report.non_triangular_faces
        );
    }
    if report.truncated() {
        warn!(
            "Staging capacity {} reached: dropped {} vertex scalars and {} indices",
            buffers.capacity(),
            report.dropped_scalars,
            report.dropped_indices
        );
    }

    let staged = StagedMesh {
        vertices: buffers.vertices(),
        indices: buffers.indices(),
        layout: &report.layout,
        index_type: IndexType::U16,
        counts,
    };
    let handle = uploader.upload(&staged)?;

    Ok(LoadedModel {
        handle,
        index_count: report.index_len,
        index_type: IndexType::U16,
        vertex_len: report.vertex_len,
        truncated: report.truncated(),
        layout: report.layout,
        counts,
    })
}
