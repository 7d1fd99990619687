//! Mesh assembly from property events.
//!
//! The assembler writes vertex scalars and face indices into a borrowed
//! [`GeometryBuffers`] arena in the order they arrive. Color channels are
//! divided by [`COLOR_RANGE`]; every other property is stored unmodified.
//! Running out of capacity is not an error: further values are dropped and
//! the handler answers with `ControlFlow::Break`.

use std::ops::ControlFlow;

use plyview_core::geometry_buffers::GeometryBuffers;
use plyview_core::status::{stream_error, Status};
use plyview_core::vertex_layout::{VertexLayout, VertexProperty, COLOR_RANGE};
use plyview_io::traits::PlyEvent;

/// Outcome of assembling one model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblyReport {
    pub vertex_len: usize,
    pub index_len: usize,
    pub layout: VertexLayout,
    pub dropped_scalars: usize,
    pub dropped_indices: usize,
    /// Faces whose index list is not exactly three long. Their indices are
    /// appended as-is. Faces with an empty list carry no index events and
    /// are not counted.
    pub non_triangular_faces: usize,
}

impl AssemblyReport {
    pub fn truncated(&self) -> bool {
        self.dropped_scalars > 0 || self.dropped_indices > 0
    }
}

pub struct MeshAssembler<'a> {
    buffers: &'a mut GeometryBuffers,
    attribute_cursor: usize,
    layout: Vec<VertexProperty>,
    layout_complete: bool,
    dropped_scalars: usize,
    dropped_indices: usize,
    non_triangular_faces: usize,
}

impl<'a> MeshAssembler<'a> {
    /// Rewinds the arena's write cursors and starts a new model.
    pub fn new(buffers: &'a mut GeometryBuffers) -> Self {
        buffers.reset();
        Self {
            buffers,
            attribute_cursor: 0,
            layout: Vec::new(),
            layout_complete: false,
            dropped_scalars: 0,
            dropped_indices: 0,
            non_triangular_faces: 0,
        }
    }

    /// Position of the next scalar within the current vertex record.
    pub fn attribute_cursor(&self) -> usize {
        self.attribute_cursor
    }

    pub fn on_vertex_scalar(
        &mut self,
        property: VertexProperty,
        value: f64,
        end_of_record: bool,
    ) -> ControlFlow<()> {
        if !self.layout_complete {
            self.layout.push(property);
            self.layout_complete = end_of_record;
        }

        let flow = if self.buffers.is_vertex_full() {
            self.dropped_scalars += 1;
            ControlFlow::Break(())
        } else {
            let value = if property.is_color() {
                value / COLOR_RANGE
            } else {
                value
            };
            self.buffers.push_vertex_scalar(value as f32);
            ControlFlow::Continue(())
        };

        // The cursor keeps cycling after the buffer fills up so that it
        // stays bounded by the record length.
        self.attribute_cursor += 1;
        if end_of_record {
            self.attribute_cursor = 0;
        }
        flow
    }

    /// Appends one face index regardless of its position in the list.
    ///
    /// Polygons are not triangulated.
    pub fn on_face_index(
        &mut self,
        value: u32,
        position: usize,
        length: usize,
    ) -> Status<ControlFlow<()>> {
        if position == 0 && length != 3 {
            self.non_triangular_faces += 1;
        }
        if self.buffers.is_index_full() {
            self.dropped_indices += 1;
            return Ok(ControlFlow::Break(()));
        }
        let index = u16::try_from(value)
            .map_err(|_| stream_error(format!("Face index {value} does not fit in 16 bits")))?;
        self.buffers.push_index(index);
        Ok(ControlFlow::Continue(()))
    }

    /// Feed every event of a stream through the handlers.
    ///
    /// A `Break` from a full buffer does not end the loop: the rest of the
    /// body is still decoded so that faces are collected and later decoding
    /// errors are still reported.
    pub fn consume<I>(&mut self, events: I) -> Status<()>
    where
        I: IntoIterator<Item = Status<PlyEvent>>,
    {
        for event in events {
            match event? {
                PlyEvent::VertexScalar {
                    property,
                    value,
                    end_of_record,
                } => {
                    let _ = self.on_vertex_scalar(property, value, end_of_record);
                }
                PlyEvent::FaceIndex {
                    value,
                    position,
                    length,
                } => {
                    self.on_face_index(value, position, length)?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> AssemblyReport {
        AssemblyReport {
            vertex_len: self.buffers.vertex_len(),
            index_len: self.buffers.index_len(),
            layout: VertexLayout::new(self.layout),
            dropped_scalars: self.dropped_scalars,
            dropped_indices: self.dropped_indices,
            non_triangular_faces: self.non_triangular_faces,
        }
    }
}
