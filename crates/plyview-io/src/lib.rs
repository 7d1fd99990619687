//! PLY input for the viewer.
//!
//! The header is parsed eagerly by [`PlyReader`]; the body is decoded lazily
//! into [`PlyEvent`]s by [`PropertyEvents`].
//!
//! # Supported encodings
//!
//! | Format                 | Read |
//! |------------------------|------|
//! | `ascii`                | ✓    |
//! | `binary_little_endian` | ✓    |
//! | `binary_big_endian`    | ✓    |
//!
//! # Consumed properties
//!
//! Only the `vertex` properties `x y z nx ny nz red green blue` and the
//! `face` list `vertex_indices` (or `vertex_index`) produce events. Every
//! other element and property is decoded and discarded.
//!
//! ```ignore
//! use plyview_io::{PlyEvent, PlyReader};
//!
//! let reader = PlyReader::open("model.ply")?;
//! println!("{} vertices", reader.header().vertex_count());
//! for event in reader.into_events() {
//!     if let PlyEvent::FaceIndex { value, .. } = event? {
//!         println!("index {value}");
//!     }
//! }
//! ```

pub mod ply_header;
pub mod ply_reader;
pub mod traits;

pub use ply_header::{ElementDef, PlyFormat, PlyHeader, PropertyDef, PropertyKind};
pub use ply_reader::{read_ply_events, PlyReader, PropertyEvents};
pub use traits::{ElementCounts, PlyEvent, PropertyStream};
