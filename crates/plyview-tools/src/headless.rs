//! A GPU stand-in that keeps uploads in host memory and records draws.

use plyview_core::status::{PlyError, Status};
use plyview_mesh::{GpuUpload, StagedMesh};

use crate::render_loop::{DrawCall, RenderBackend};

/// Buffer object names of one uploaded model. Name 0 is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    pub vertex_buffer: u32,
    pub index_buffer: u32,
}

#[derive(Debug, Default)]
pub struct HeadlessGpu {
    vertex_buffers: Vec<Vec<f32>>,
    index_buffers: Vec<Vec<u16>>,
    frames_presented: u64,
    in_frame: bool,
    current_frame: Vec<DrawCall<MeshHandle>>,
    last_frame: Vec<DrawCall<MeshHandle>>,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_buffer(&self, name: u32) -> Option<&[f32]> {
        Self::lookup(&self.vertex_buffers, name)
    }

    pub fn index_buffer(&self, name: u32) -> Option<&[u16]> {
        Self::lookup(&self.index_buffers, name)
    }

    pub fn buffer_count(&self) -> usize {
        self.vertex_buffers.len() + self.index_buffers.len()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Draws of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCall<MeshHandle>] {
        &self.last_frame
    }

    fn lookup<T>(buffers: &[Vec<T>], name: u32) -> Option<&[T]> {
        let index = (name as usize).checked_sub(1)?;
        buffers.get(index).map(Vec::as_slice)
    }

    fn next_name<T>(buffers: &[Vec<T>]) -> Status<u32> {
        u32::try_from(buffers.len() + 1)
            .map_err(|_| PlyError::Upload("out of buffer names".to_string()))
    }
}

impl GpuUpload for HeadlessGpu {
    type Handle = MeshHandle;

    fn upload(&mut self, mesh: &StagedMesh<'_>) -> Status<MeshHandle> {
        let stride = mesh.layout.stride();
        if stride == 0 && !mesh.vertices.is_empty() {
            return Err(PlyError::Upload(
                "vertex data without a layout".to_string(),
            ));
        }
        let handle = MeshHandle {
            vertex_buffer: Self::next_name(&self.vertex_buffers)?,
            index_buffer: Self::next_name(&self.index_buffers)?,
        };
        self.vertex_buffers.push(mesh.vertices.to_vec());
        self.index_buffers.push(mesh.indices.to_vec());
        Ok(handle)
    }
}

impl RenderBackend for HeadlessGpu {
    fn begin_frame(&mut self) {
        self.current_frame.clear();
        self.in_frame = true;
    }

    fn draw(&mut self, call: DrawCall<MeshHandle>) {
        if self.in_frame {
            self.current_frame.push(call);
        }
    }

    fn end_frame(&mut self) {
        if self.in_frame {
            std::mem::swap(&mut self.current_frame, &mut self.last_frame);
            self.frames_presented += 1;
            self.in_frame = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plyview_core::vertex_layout::{IndexType, VertexLayout, VertexProperty};
    use plyview_io::traits::ElementCounts;

    fn position_layout() -> VertexLayout {
        VertexLayout::new(vec![VertexProperty::X, VertexProperty::Y, VertexProperty::Z])
    }

    fn staged<'a>(vertices: &'a [f32], indices: &'a [u16], layout: &'a VertexLayout) -> StagedMesh<'a> {
        StagedMesh {
            vertices,
            indices,
            layout,
            index_type: IndexType::U16,
            counts: ElementCounts {
                vertices: vertices.len() / 3,
                faces: indices.len() / 3,
            },
        }
    }

    #[test]
    fn test_upload_copies_buffers() {
        let layout = position_layout();
        let mut gpu = HeadlessGpu::new();
        let mut vertices = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let indices = [0u16, 1, 2];

        let handle = gpu.upload(&staged(&vertices, &indices, &layout)).unwrap();
        vertices.fill(-1.0);

        assert_eq!(handle, MeshHandle { vertex_buffer: 1, index_buffer: 1 });
        assert_eq!(gpu.vertex_buffer(1).unwrap()[8], 8.0);
        assert_eq!(gpu.index_buffer(1).unwrap(), &[0, 1, 2]);
        assert!(gpu.vertex_buffer(0).is_none());
        assert_eq!(gpu.buffer_count(), 2);
    }

    #[test]
    fn test_upload_rejects_unlaid_vertices() {
        let layout = VertexLayout::default();
        let mut gpu = HeadlessGpu::new();
        let err = gpu.upload(&staged(&[1.0], &[], &layout)).unwrap_err();
        assert!(matches!(err, PlyError::Upload(_)));
        assert_eq!(gpu.buffer_count(), 0);
    }

    #[test]
    fn test_frames_keep_last_draws() {
        let layout = position_layout();
        let mut gpu = HeadlessGpu::new();
        let handle = gpu.upload(&staged(&[0.0; 9], &[0, 1, 2], &layout)).unwrap();
        let call = DrawCall {
            handle,
            index_count: 3,
            index_type: IndexType::U16,
            layout: layout.clone(),
            model: glam::Mat4::IDENTITY,
            projection: glam::Mat4::IDENTITY,
            lighting: Default::default(),
        };

        gpu.begin_frame();
        gpu.draw(call.clone());
        gpu.end_frame();
        gpu.begin_frame();
        gpu.end_frame();

        assert_eq!(gpu.frames_presented(), 2);
        assert!(gpu.last_frame().is_empty());

        gpu.draw(call);
        assert!(gpu.last_frame().is_empty());
    }
}
