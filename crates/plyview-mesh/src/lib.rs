//! Mesh ingestion for the PLY viewer.
//!
//! [`MeshAssembler`] turns property events into interleaved vertex data and
//! a `u16` index list inside a caller-owned
//! [`GeometryBuffers`](plyview_core::GeometryBuffers) arena.
//! [`load_model`] drives one whole attempt: it opens the file, assembles the
//! mesh, hands it to a [`GpuUpload`] collaborator and records the outcome in
//! [`ModelSlots`].
//!
//! ```ignore
//! use plyview_core::GeometryBuffers;
//! use plyview_mesh::{load_model, ModelSlots};
//!
//! let mut buffers = GeometryBuffers::new();
//! let mut slots = ModelSlots::new();
//! let slot = load_model("test.ply", &mut buffers, &mut gpu, &mut slots);
//! if let Some(model) = slots.get(slot).and_then(|s| s.model()) {
//!     println!("{} indices", model.index_count);
//! }
//! ```

pub mod mesh_assembler;
pub mod model_loader;

pub use mesh_assembler::{AssemblyReport, MeshAssembler};
pub use model_loader::{
    load_model, load_stream, GpuUpload, LoadedModel, ModelSlot, ModelSlots, StagedMesh,
};
