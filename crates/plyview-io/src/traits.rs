//! Event types and the stream trait shared by decoders and the assembler.
//!
//! A decoder turns a PLY body into a flat sequence of [`PlyEvent`]s in file
//! order. Anything implementing [`PropertyStream`] can drive a model load,
//! which lets the assembler be exercised without a file:
//!
//! ```ignore
//! use plyview_io::{PlyReader, PropertyStream};
//!
//! let reader = PlyReader::open("model.ply")?;
//! let events = reader.into_events();
//! let counts = events.declared_counts();
//! for event in events {
//!     println!("{:?}", event?);
//! }
//! ```

use plyview_core::status::Status;
use plyview_core::vertex_layout::VertexProperty;

/// Element counts declared by a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementCounts {
    pub vertices: usize,
    pub faces: usize,
}

/// One decoded value the assembler cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlyEvent {
    /// A scalar vertex property. `end_of_record` is set on the last consumed
    /// property of each vertex.
    VertexScalar {
        property: VertexProperty,
        value: f64,
        end_of_record: bool,
    },
    /// One entry of a face index list.
    FaceIndex {
        value: u32,
        position: usize,
        length: usize,
    },
}

/// A fallible, lazily decoded sequence of property events.
///
/// After yielding an `Err` a stream yields nothing more.
pub trait PropertyStream: Iterator<Item = Status<PlyEvent>> {
    /// Counts declared by the header, not the number of records decoded.
    fn declared_counts(&self) -> ElementCounts;
}
