//! Host and device arrays with raw kernel views
//!
//! [`HostArray`] is a rank-R array over a plain vector. [`DeviceArray`]
//! mirrors it in device slab memory; data moves between the two through
//! explicit copies only. Kernels never touch either type directly: they
//! receive [`ArrayView`] / [`ArrayViewMut`] handles, which are unchecked
//! raw-pointer views safe to share across the worker pool because every
//! launch partitions the index space into disjoint tiles.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::sync::Arc;
use std::time::Instant;

use bytemuck::Pod;
use parking_lot::RwLock;

use freshet_tracing::performance::record_transfer;

use crate::error::{BackendError, Result};
use crate::launch::{row_major_strides, BufferHandle, IndexRange};
use crate::spaces::device::DeviceSpace;
use crate::spaces::memory::DeviceMemory;

// ================================================================================================
// Views
// ================================================================================================

/// Read-only unchecked view over a rank-R array
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T, const R: usize> {
    ptr: *const T,
    extents: [usize; R],
    strides: [usize; R],
    _marker: PhantomData<&'a [T]>,
}

// Reads of plain-old-data elements are safe from any thread.
unsafe impl<T: Pod, const R: usize> Send for ArrayView<'_, T, R> {}
unsafe impl<T: Pod, const R: usize> Sync for ArrayView<'_, T, R> {}

impl<'a, T: Pod, const R: usize> ArrayView<'a, T, R> {
    fn new(ptr: *const T, extents: [usize; R]) -> Self {
        Self {
            ptr,
            extents,
            strides: row_major_strides(extents),
            _marker: PhantomData,
        }
    }

    pub const fn extents(&self) -> [usize; R] {
        self.extents
    }

    #[inline]
    pub fn get(&self, idx: [usize; R]) -> T {
        let i = self.linear(idx);
        // SAFETY: linear() debug-checks bounds; the borrow on the owning
        // array keeps the storage alive for 'a.
        unsafe { *self.ptr.add(i) }
    }

    #[inline]
    fn linear(&self, idx: [usize; R]) -> usize {
        let mut i = 0;
        for d in 0..R {
            debug_assert!(idx[d] < self.extents[d]);
            i += idx[d] * self.strides[d];
        }
        i
    }
}

/// Write view over a rank-R array
///
/// Writes go through a shared reference so one view can be captured by a
/// launch body and used from every worker. The caller upholds that no two
/// indices passed to [`set`](Self::set) collide within a launch; tiled
/// dispatch guarantees this for the launch index itself.
pub struct ArrayViewMut<'a, T, const R: usize> {
    ptr: *mut T,
    extents: [usize; R],
    strides: [usize; R],
    _marker: PhantomData<&'a mut [T]>,
}

// Disjoint writes of plain-old-data elements; tiles never overlap.
unsafe impl<T: Pod, const R: usize> Send for ArrayViewMut<'_, T, R> {}
unsafe impl<T: Pod, const R: usize> Sync for ArrayViewMut<'_, T, R> {}

impl<'a, T: Pod, const R: usize> ArrayViewMut<'a, T, R> {
    fn new(ptr: *mut T, extents: [usize; R]) -> Self {
        Self {
            ptr,
            extents,
            strides: row_major_strides(extents),
            _marker: PhantomData,
        }
    }

    pub const fn extents(&self) -> [usize; R] {
        self.extents
    }

    #[inline]
    pub fn get(&self, idx: [usize; R]) -> T {
        let i = self.linear(idx);
        // SAFETY: as ArrayView::get.
        unsafe { *self.ptr.add(i) }
    }

    #[inline]
    pub fn set(&self, idx: [usize; R], value: T) {
        let i = self.linear(idx);
        // SAFETY: linear() debug-checks bounds; the exclusive borrow on the
        // owning array rules out readers, and callers write disjoint indices.
        unsafe { *self.ptr.add(i) = value };
    }

    #[inline]
    fn linear(&self, idx: [usize; R]) -> usize {
        let mut i = 0;
        for d in 0..R {
            debug_assert!(idx[d] < self.extents[d]);
            i += idx[d] * self.strides[d];
        }
        i
    }
}

// ================================================================================================
// Host array
// ================================================================================================

/// Rank-R array in host memory, row-major, zero-initialized
#[derive(Debug, Clone)]
pub struct HostArray<T: Pod, const R: usize> {
    data: Vec<T>,
    extents: [usize; R],
}

impl<T: Pod, const R: usize> HostArray<T, R> {
    pub fn zeroed(extents: [usize; R]) -> Self {
        let len = extents.iter().product();
        Self {
            data: vec![T::zeroed(); len],
            extents,
        }
    }

    /// Cubic array `edge^R`
    pub fn cubic(edge: usize) -> Self {
        Self::zeroed([edge; R])
    }

    pub const fn extents(&self) -> [usize; R] {
        self.extents
    }

    pub fn range(&self) -> IndexRange<R> {
        IndexRange::new(self.extents)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, idx: [usize; R]) -> T {
        self.data[self.linear(idx)]
    }

    pub fn set(&mut self, idx: [usize; R], value: T) {
        let i = self.linear(idx);
        self.data[i] = value;
    }

    /// First element in memory order
    pub fn first(&self) -> T {
        self.data[0]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn view(&self) -> ArrayView<'_, T, R> {
        ArrayView::new(self.data.as_ptr(), self.extents)
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T, R> {
        ArrayViewMut::new(self.data.as_mut_ptr(), self.extents)
    }

    fn linear(&self, idx: [usize; R]) -> usize {
        let strides = row_major_strides(self.extents);
        let mut i = 0;
        for d in 0..R {
            assert!(idx[d] < self.extents[d]);
            i += idx[d] * strides[d];
        }
        i
    }
}

// ================================================================================================
// Device array
// ================================================================================================

/// Rank-R array in device slab memory
///
/// The slab is freed when the array drops. Element types are limited to
/// eight-byte alignment by the slab word size.
pub struct DeviceArray<T: Pod, const R: usize> {
    handle: BufferHandle,
    extents: [usize; R],
    memory: Arc<RwLock<DeviceMemory>>,
    base: NonNull<T>,
}

impl<T: Pod, const R: usize> DeviceArray<T, R> {
    /// Allocate a zero-filled mirror array on `space`
    pub fn allocate(space: &DeviceSpace, extents: [usize; R]) -> Result<Self> {
        debug_assert!(align_of::<T>() <= 8);
        let len: usize = extents.iter().product();
        let byte_len = len * size_of::<T>();
        let handle = {
            let mut memory = space.memory().write();
            memory.allocate(byte_len)?
        };
        let base = space.memory().read().base_ptr(handle)? as *mut T;
        let base = NonNull::new(base)
            .ok_or_else(|| BackendError::execution_error("device slab has null base"))?;
        Ok(Self {
            handle,
            extents,
            memory: Arc::clone(space.memory()),
            base,
        })
    }

    pub const fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub const fn extents(&self) -> [usize; R] {
        self.extents
    }

    pub fn range(&self) -> IndexRange<R> {
        IndexRange::new(self.extents)
    }

    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * size_of::<T>()
    }

    /// Copy the full host array into this array
    #[tracing::instrument(level = "debug", skip(self, host), fields(buffer = %self.handle, bytes = self.byte_len()))]
    pub fn copy_from_host(&mut self, host: &HostArray<T, R>) -> Result<()> {
        if host.extents() != self.extents {
            return Err(BackendError::shape_mismatch(self.len(), host.len()));
        }
        let start = Instant::now();
        self.memory
            .write()
            .write_bytes(self.handle, 0, bytemuck::cast_slice(host.as_slice()))?;
        record_transfer(self.byte_len(), "H2D", start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Copy this array back into the full host array
    #[tracing::instrument(level = "debug", skip(self, host), fields(buffer = %self.handle, bytes = self.byte_len()))]
    pub fn copy_to_host(&self, host: &mut HostArray<T, R>) -> Result<()> {
        if host.extents() != self.extents {
            return Err(BackendError::shape_mismatch(self.len(), host.len()));
        }
        let start = Instant::now();
        self.memory
            .read()
            .read_bytes(self.handle, 0, bytemuck::cast_slice_mut(host.as_mut_slice()))?;
        record_transfer(self.byte_len(), "D2H", start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Read the whole array out as a vector
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let mut out = vec![T::zeroed(); self.len()];
        self.memory
            .read()
            .read_bytes(self.handle, 0, bytemuck::cast_slice_mut(&mut out))?;
        Ok(out)
    }

    pub fn view(&self) -> ArrayView<'_, T, R> {
        ArrayView::new(self.base.as_ptr(), self.extents)
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_, T, R> {
        ArrayViewMut::new(self.base.as_ptr(), self.extents)
    }
}

impl<T: Pod, const R: usize> Drop for DeviceArray<T, R> {
    fn drop(&mut self) {
        if let Err(err) = self.memory.write().free(self.handle) {
            tracing::warn!(buffer = %self.handle, %err, "failed to free device array");
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::ExecutionSpace;

    #[test]
    fn test_host_array_starts_zeroed() {
        let a = HostArray::<f64, 2>::cubic(4);
        assert_eq!(a.len(), 16);
        assert!(a.as_slice().iter().all(|&x| x == 0.0));
        assert_eq!(a.first(), 0.0);
    }

    #[test]
    fn test_host_set_get_row_major() {
        let mut a = HostArray::<f32, 2>::zeroed([4, 8]);
        a.set([1, 2], 7.5);
        assert_eq!(a.get([1, 2]), 7.5);
        assert_eq!(a.as_slice()[1 * 8 + 2], 7.5);
    }

    #[test]
    fn test_views_share_storage() {
        let mut a = HostArray::<f64, 1>::zeroed([8]);
        {
            let view = a.view_mut();
            view.set([3], 2.25);
        }
        assert_eq!(a.view().get([3]), 2.25);
        assert_eq!(a.get([3]), 2.25);
    }

    #[test]
    fn test_rank4_linear_layout() {
        let mut a = HostArray::<f64, 4>::zeroed([2, 3, 4, 5]);
        a.set([1, 2, 3, 4], 9.0);
        assert_eq!(a.as_slice()[1 * 60 + 2 * 20 + 3 * 5 + 4], 9.0);
    }

    #[test]
    fn test_device_roundtrip_is_bit_identical() {
        let space = DeviceSpace::new();
        let mut host = HostArray::<f32, 2>::zeroed([8, 8]);
        for (i, x) in host.as_mut_slice().iter_mut().enumerate() {
            *x = i as f32 * 0.5;
        }
        let mut dev = DeviceArray::allocate(&space, [8, 8]).unwrap();
        dev.copy_from_host(&host).unwrap();

        let mut back = HostArray::<f32, 2>::zeroed([8, 8]);
        dev.copy_to_host(&mut back).unwrap();
        assert_eq!(host.as_slice(), back.as_slice());
        assert_eq!(dev.to_vec().unwrap(), host.as_slice());
    }

    #[test]
    fn test_mismatched_copy_is_rejected() {
        let space = DeviceSpace::new();
        let host = HostArray::<f64, 2>::zeroed([4, 4]);
        let mut dev = DeviceArray::allocate(&space, [4, 8]).unwrap();
        assert!(matches!(
            dev.copy_from_host(&host),
            Err(BackendError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_launch_writes_survive_readback() {
        let space = DeviceSpace::new();
        let mut dev = DeviceArray::<f64, 2>::allocate(&space, [16, 16]).unwrap();
        let range = dev.range();
        let tile = space.recommended_tile(&range);
        let view = dev.view_mut();
        space
            .parallel_for("fill", range, tile, move |[i, j]| {
                view.set([i, j], (i * 16 + j) as f64);
            })
            .unwrap();
        space.fence().unwrap();

        let data = dev.to_vec().unwrap();
        for (k, &x) in data.iter().enumerate() {
            assert_eq!(x, k as f64);
        }
    }

    #[test]
    fn test_drop_releases_slab() {
        let space = DeviceSpace::new();
        {
            let _dev = DeviceArray::<f64, 1>::allocate(&space, [32]).unwrap();
            assert_eq!(space.memory().read().buffer_count(), 1);
        }
        assert_eq!(space.memory().read().buffer_count(), 0);
        assert_eq!(space.memory().read().total_bytes(), 0);
    }
}
