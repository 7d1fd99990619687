//! Fixed-capacity staging arena for one model load.

/// Capacity of each staging buffer, in elements.
pub const MAX_ELEMENTS: usize = 2_097_152;

/// Vertex and index staging storage.
///
/// Storage is allocated once and reused by every load: [`reset`](Self::reset)
/// rewinds the write cursors without touching the contents, and writes past
/// the capacity are dropped.
#[derive(Debug, Clone)]
pub struct GeometryBuffers {
    vertices: Box<[f32]>,
    indices: Box<[u16]>,
    vertex_len: usize,
    index_len: usize,
}

impl GeometryBuffers {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ELEMENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: vec![0.0; capacity].into_boxed_slice(),
            indices: vec![0; capacity].into_boxed_slice(),
            vertex_len: 0,
            index_len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    pub fn reset(&mut self) {
        self.vertex_len = 0;
        self.index_len = 0;
    }

    /// Appends one vertex scalar. Returns `false` when the buffer is full.
    pub fn push_vertex_scalar(&mut self, value: f32) -> bool {
        match self.vertices.get_mut(self.vertex_len) {
            Some(slot) => {
                *slot = value;
                self.vertex_len += 1;
                true
            }
            None => false,
        }
    }

    /// Appends one index. Returns `false` when the buffer is full.
    pub fn push_index(&mut self, index: u16) -> bool {
        match self.indices.get_mut(self.index_len) {
            Some(slot) => {
                *slot = index;
                self.index_len += 1;
                true
            }
            None => false,
        }
    }

    pub fn vertex_len(&self) -> usize {
        self.vertex_len
    }

    pub fn index_len(&self) -> usize {
        self.index_len
    }

    pub fn is_vertex_full(&self) -> bool {
        self.vertex_len >= self.vertices.len()
    }

    pub fn is_index_full(&self) -> bool {
        self.index_len >= self.indices.len()
    }

    /// Vertex scalars written by the current load.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices[..self.vertex_len]
    }

    /// Indices written by the current load.
    pub fn indices(&self) -> &[u16] {
        &self.indices[..self.index_len]
    }

    /// The whole vertex storage, including stale data past the cursor.
    pub fn vertex_storage(&self) -> &[f32] {
        &self.vertices
    }

    /// The whole index storage, including stale data past the cursor.
    pub fn index_storage(&self) -> &[u16] {
        &self.indices
    }
}

impl Default for GeometryBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_capacity() {
        let buffers = GeometryBuffers::new();
        assert_eq!(buffers.capacity(), MAX_ELEMENTS);
        assert_eq!(buffers.index_storage().len(), MAX_ELEMENTS);
        assert!(buffers.vertices().is_empty());
    }

    #[test]
    fn test_push_until_full() {
        let mut buffers = GeometryBuffers::with_capacity(2);
        assert!(buffers.push_vertex_scalar(1.0));
        assert!(buffers.push_vertex_scalar(2.0));
        assert!(buffers.is_vertex_full());
        assert!(!buffers.push_vertex_scalar(3.0));
        assert_eq!(buffers.vertices(), &[1.0, 2.0]);

        assert!(buffers.push_index(7));
        assert!(!buffers.is_index_full());
        assert_eq!(buffers.indices(), &[7]);
    }

    #[test]
    fn test_reset_keeps_storage() {
        let mut buffers = GeometryBuffers::with_capacity(4);
        buffers.push_vertex_scalar(0.5);
        buffers.push_index(3);
        buffers.reset();

        assert_eq!(buffers.vertex_len(), 0);
        assert_eq!(buffers.index_len(), 0);
        assert_eq!(buffers.vertex_storage()[0], 0.5);
        assert_eq!(buffers.index_storage()[0], 3);

        buffers.push_vertex_scalar(9.0);
        assert_eq!(buffers.vertices(), &[9.0]);
    }

    proptest! {
        #[test]
        fn prop_vertex_len_never_exceeds_capacity(capacity in 0usize..64, pushes in 0usize..128) {
            let mut buffers = GeometryBuffers::with_capacity(capacity);
            let mut accepted = 0;
            for i in 0..pushes {
                if buffers.push_vertex_scalar(i as f32) {
                    accepted += 1;
                }
            }
            prop_assert_eq!(accepted, pushes.min(capacity));
            prop_assert_eq!(buffers.vertex_len(), pushes.min(capacity));
        }
    }
}
