//! Vertex and index buffers.
//!
//! A [`GpuBuffer`] goes through up to four states:
//!
//! 1. **created** with a CPU-side array (or just a size),
//! 2. **allocated**: a staging copy of the right size exists,
//! 3. **uploaded**: the staging data was copied into a GPU buffer,
//! 4. **array-freed**: the original array was dropped to save memory.
//!
//! The staging copy survives step 4, so a buffer can always be re-uploaded after
//! a context loss as long as it was allocated and filled once.

use bytemuck::{Pod, Zeroable};

use crate::error::{RenderError, Result};
use crate::gfx::backend::{BufferHandle, BufferTarget, GraphicsBackend};
use crate::gfx::resources::{GpuContext, VersionStamp, VersionedResource};

/// Element type a [`GpuBuffer`] can hold
pub trait BufferElement: Pod {
    const TARGET: BufferTarget;
    const LABEL: &'static str;
}

impl BufferElement for f32 {
    const TARGET: BufferTarget = BufferTarget::Array;
    const LABEL: &'static str = "vertex buffer";
}

impl BufferElement for u16 {
    const TARGET: BufferTarget = BufferTarget::ElementArray;
    const LABEL: &'static str = "index buffer";
}

/// CPU/GPU buffer pair with version-gated re-upload
#[derive(Debug)]
pub struct GpuBuffer<T: BufferElement> {
    array: Option<Vec<T>>,
    staging: Option<Vec<T>>,
    size: usize,
    components: u8,
    handle: Option<BufferHandle>,
    stamp: VersionStamp,
}

/// A clone shares no GPU buffer with its source; it uploads its own on first use
impl<T: BufferElement> Clone for GpuBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array.clone(),
            staging: self.staging.clone(),
            size: self.size,
            components: self.components,
            handle: None,
            stamp: VersionStamp::unsynced(),
        }
    }
}

/// Per-vertex `f32` attribute data
pub type VertexBuffer = GpuBuffer<f32>;
/// `u16` index data
pub type IndexBuffer = GpuBuffer<u16>;

impl<T: BufferElement> GpuBuffer<T> {
    /// Buffer backed by `array`, with `components` elements per vertex
    pub fn from_array(array: Vec<T>, components: u8) -> Self {
        Self {
            size: array.len(),
            array: Some(array),
            staging: None,
            components: components.max(1),
            handle: None,
            stamp: VersionStamp::unsynced(),
        }
    }

    /// Buffer of `size` elements with no CPU array; fill it with [`put`](Self::put)
    pub fn with_size(size: usize, components: u8) -> Self {
        Self {
            array: None,
            staging: None,
            size,
            components: components.max(1),
            handle: None,
            stamp: VersionStamp::unsynced(),
        }
    }

    /// Number of elements
    pub fn size(&self) -> usize {
        self.size
    }

    /// Size of the GPU buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.size * std::mem::size_of::<T>()
    }

    pub fn components(&self) -> u8 {
        self.components
    }

    pub fn vertex_count(&self) -> usize {
        self.size / self.components as usize
    }

    pub fn array(&self) -> Option<&[T]> {
        self.array.as_deref()
    }

    pub fn staging(&self) -> Option<&[T]> {
        self.staging.as_deref()
    }

    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    pub fn is_allocated(&self) -> bool {
        self.staging.is_some()
    }

    /// Creates the zero-filled staging copy
    pub fn allocate(&mut self) -> Result<()> {
        if self.size == 0 {
            return Err(RenderError::EmptyBuffer);
        }
        self.staging = Some(vec![T::zeroed(); self.size]);
        Ok(())
    }

    /// Copies `data` into the start of the staging copy
    pub fn put(&mut self, data: &[T]) -> Result<()> {
        let staging = self
            .staging
            .as_mut()
            .ok_or(RenderError::ResourceNotInitialized(T::LABEL))?;
        if data.len() > staging.len() {
            return Err(RenderError::Backend(format!(
                "{} overflow: {} elements into {}",
                T::LABEL,
                data.len(),
                staging.len()
            )));
        }
        staging[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copies the CPU array into the staging copy
    pub fn put_from_inner_array(&mut self) -> Result<()> {
        let array = self
            .array
            .take()
            .ok_or(RenderError::ResourceNotInitialized(T::LABEL))?;
        let result = self.put(&array);
        self.array = Some(array);
        result
    }

    /// Drops the CPU array; the staging copy is kept for re-uploads
    pub fn delete_array(&mut self) {
        self.array = None;
    }

    /// Uploads the staging copy to a new GPU buffer for the current version
    pub fn init_buffer(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        self.recreate(gpu)?;
        self.stamp.mark(gpu.version);
        Ok(())
    }

    /// Binds the GPU buffer to its target
    pub fn bind(&self, backend: &mut dyn GraphicsBackend) -> Result<()> {
        let handle = self
            .handle
            .ok_or(RenderError::ResourceNotInitialized(T::LABEL))?;
        backend.bind_buffer(T::TARGET, Some(handle));
        Ok(())
    }
}

impl<T: BufferElement> VersionedResource for GpuBuffer<T> {
    fn stamp(&self) -> VersionStamp {
        self.stamp
    }

    fn stamp_mut(&mut self) -> &mut VersionStamp {
        &mut self.stamp
    }

    fn recreate(&mut self, gpu: &mut GpuContext<'_>) -> Result<()> {
        let staging = self
            .staging
            .as_ref()
            .ok_or(RenderError::ResourceNotInitialized(T::LABEL))?;
        // A handle from an older version died with its context
        if let Some(old) = self.handle.take() {
            if self.stamp.is_current(gpu.version) {
                gpu.backend.delete_buffer(old);
            }
        }
        let handle = gpu
            .backend
            .create_buffer(T::TARGET, bytemuck::cast_slice(staging))?;
        self.handle = Some(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::backend::{Command, RecordingBackend};
    use crate::gfx::texture::MemoryAssets;

    #[test]
    fn test_round_trip_sizes_and_no_reupload() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();

        let mut positions = VertexBuffer::from_array(vec![0.0; 12], 3);
        positions.allocate().unwrap();
        positions.put_from_inner_array().unwrap();

        {
            let mut gpu = GpuContext::new(&mut backend, &assets, 1);
            positions.init_buffer(&mut gpu).unwrap();
            assert!(!positions.ensure_current(&mut gpu).unwrap());
        }

        let handle = positions.handle().unwrap();
        assert_eq!(backend.buffer_size(handle), Some(12 * 4));
        assert_eq!(backend.buffers_created(), 1);

        let mut indices = IndexBuffer::from_array(vec![0, 1, 2, 2, 3, 0], 1);
        indices.allocate().unwrap();
        indices.put_from_inner_array().unwrap();
        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        indices.init_buffer(&mut gpu).unwrap();
        let handle = indices.handle().unwrap();
        assert_eq!(backend.buffer_size(handle), Some(6 * 2));
    }

    #[test]
    fn test_upload_before_data_fails() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut gpu = GpuContext::new(&mut backend, &assets, 1);

        let mut buffer = VertexBuffer::from_array(vec![1.0, 2.0, 3.0], 3);
        assert_eq!(
            buffer.init_buffer(&mut gpu),
            Err(RenderError::ResourceNotInitialized("vertex buffer"))
        );

        let mut sized = IndexBuffer::with_size(3, 1);
        assert!(sized.put_from_inner_array().is_err());
        assert!(sized.bind(gpu.backend).is_err());
    }

    #[test]
    fn test_zero_sized_allocation_fails() {
        let mut buffer = IndexBuffer::from_array(Vec::new(), 1);
        assert_eq!(buffer.allocate(), Err(RenderError::EmptyBuffer));
    }

    #[test]
    fn test_freed_array_can_still_reupload() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut buffer = VertexBuffer::from_array(vec![1.0, 2.0], 2);
        buffer.allocate().unwrap();
        buffer.put_from_inner_array().unwrap();
        buffer.delete_array();
        assert!(buffer.array().is_none());

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        buffer.ensure_current(&mut gpu).unwrap();
        gpu.version = 2;
        assert!(buffer.ensure_current(&mut gpu).unwrap());
        assert_eq!(buffer.staging(), Some(&[1.0, 2.0][..]));
        assert_eq!(backend.buffers_created(), 2);
    }

    #[test]
    fn test_reinit_releases_previous_buffer() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut buffer = VertexBuffer::from_array(vec![1.0, 2.0, 3.0], 3);
        buffer.allocate().unwrap();
        buffer.put_from_inner_array().unwrap();

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        buffer.init_buffer(&mut gpu).unwrap();
        let first = buffer.handle().unwrap();
        buffer.init_buffer(&mut gpu).unwrap();
        buffer.init_buffer(&mut gpu).unwrap();
        assert_eq!(backend.buffers_created(), 3);
        assert_eq!(backend.live_buffers(), 1);
        assert!(!backend.is_buffer_live(first));

        // A clone owns nothing until it uploads
        let copy = buffer.clone();
        assert_eq!(copy.handle(), None);
        assert!(!copy.stamp().is_current(1));
    }

    #[test]
    fn test_new_version_leaves_old_handles_alone() {
        let mut backend = RecordingBackend::new();
        let assets = MemoryAssets::new();
        let mut buffer = IndexBuffer::from_array(vec![0, 1, 2], 1);
        buffer.allocate().unwrap();
        buffer.put_from_inner_array().unwrap();

        let mut gpu = GpuContext::new(&mut backend, &assets, 1);
        buffer.init_buffer(&mut gpu).unwrap();
        gpu.version = 2;
        assert!(buffer.ensure_current(&mut gpu).unwrap());
        assert_eq!(backend.count(|c| matches!(c, Command::DeleteBuffer(_))), 0);
    }

    #[test]
    fn test_put_overflow_is_rejected() {
        let mut buffer = VertexBuffer::with_size(2, 1);
        buffer.allocate().unwrap();
        assert!(buffer.put(&[1.0, 2.0, 3.0]).is_err());
        buffer.put(&[4.0]).unwrap();
        assert_eq!(buffer.staging(), Some(&[4.0, 0.0][..]));
    }
}
