//! PLY viewer core
//!
//! Shared data types for the mesh-ingestion pipeline: the error taxonomy,
//! PLY scalar types, the interleaved vertex layout and the staging arena the
//! assembler writes into.

pub mod geometry_buffers;
pub mod ply_types;
pub mod status;
pub mod vertex_layout;

pub use geometry_buffers::{GeometryBuffers, MAX_ELEMENTS};
pub use ply_types::ScalarType;
pub use status::{LoadStage, PlyError, Status};
pub use vertex_layout::{AttributeKind, IndexType, VertexLayout, VertexProperty, COLOR_RANGE};
