//! Device memory manager
//!
//! Mirrored arrays live in slabs owned by this manager. Slabs are backed
//! by `u64` words so every element type up to eight-byte alignment lands
//! aligned, and they never move once allocated: kernels write through raw
//! views while the manager keeps ownership, and explicit copies move data
//! between host and device storage.

use std::collections::HashMap;

use freshet_tracing::performance::record_allocation;

use crate::error::{BackendError, Result};
use crate::launch::BufferHandle;

/// One device allocation, stable for the lifetime of its handle
struct Slab {
    ptr: *mut u64,
    words: usize,
    byte_len: usize,
}

// Slabs are plain heap memory; the manager's lock serialises metadata and
// the launch fences order the data writes.
unsafe impl Send for Slab {}
unsafe impl Sync for Slab {}

/// Slab allocator handing out [`BufferHandle`]s
pub struct DeviceMemory {
    slabs: HashMap<u64, Slab>,
    next_buffer_id: u64,
    total_bytes: usize,
}

impl DeviceMemory {
    pub fn new() -> Self {
        Self {
            slabs: HashMap::new(),
            next_buffer_id: 1,
            total_bytes: 0,
        }
    }

    /// Allocate a zero-filled slab of at least `byte_len` bytes
    pub fn allocate(&mut self, byte_len: usize) -> Result<BufferHandle> {
        if byte_len == 0 {
            return Err(BackendError::AllocationFailed { requested: 0 });
        }
        let words = byte_len.div_ceil(8);
        let mut storage: Vec<u64> = Vec::new();
        storage
            .try_reserve_exact(words)
            .map_err(|_| BackendError::AllocationFailed { requested: byte_len })?;
        storage.resize(words, 0);

        let ptr = Box::into_raw(storage.into_boxed_slice()) as *mut u64;
        let handle = BufferHandle::new(self.next_buffer_id);
        self.next_buffer_id += 1;
        self.slabs.insert(handle.id(), Slab { ptr, words, byte_len });
        self.total_bytes += byte_len;

        record_allocation(byte_len, "device", 0);
        Ok(handle)
    }

    /// Release a slab
    pub fn free(&mut self, handle: BufferHandle) -> Result<()> {
        let slab = self
            .slabs
            .remove(&handle.id())
            .ok_or(BackendError::InvalidBufferHandle(handle.id()))?;
        self.total_bytes -= slab.byte_len;
        // SAFETY: ptr/words came from Box::into_raw of a boxed slice that
        // only this manager ever reconstructs.
        unsafe {
            drop(Box::from_raw(std::slice::from_raw_parts_mut(
                slab.ptr, slab.words,
            )));
        }
        Ok(())
    }

    /// Copy `data` into a slab at `offset`
    pub fn write_bytes(&mut self, handle: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        let slab = self.slab(handle)?;
        Self::check_bounds(slab, offset, data.len())?;
        // SAFETY: bounds checked against the slab; slabs never overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                (slab.ptr as *mut u8).add(offset),
                data.len(),
            );
        }
        Ok(())
    }

    /// Copy a slab region at `offset` into `out`
    pub fn read_bytes(&self, handle: BufferHandle, offset: usize, out: &mut [u8]) -> Result<()> {
        let slab = self.slab(handle)?;
        Self::check_bounds(slab, offset, out.len())?;
        // SAFETY: bounds checked against the slab; slabs never overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(
                (slab.ptr as *const u8).add(offset),
                out.as_mut_ptr(),
                out.len(),
            );
        }
        Ok(())
    }

    /// Base pointer of a slab, aligned to eight bytes
    pub fn base_ptr(&self, handle: BufferHandle) -> Result<*mut u8> {
        Ok(self.slab(handle)?.ptr as *mut u8)
    }

    /// Usable byte length of a slab
    pub fn byte_len(&self, handle: BufferHandle) -> Result<usize> {
        Ok(self.slab(handle)?.byte_len)
    }

    pub fn contains(&self, handle: BufferHandle) -> bool {
        self.slabs.contains_key(&handle.id())
    }

    pub fn buffer_count(&self) -> usize {
        self.slabs.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn slab(&self, handle: BufferHandle) -> Result<&Slab> {
        self.slabs
            .get(&handle.id())
            .ok_or(BackendError::InvalidBufferHandle(handle.id()))
    }

    fn check_bounds(slab: &Slab, offset: usize, size: usize) -> Result<()> {
        let end = offset.checked_add(size);
        match end {
            Some(end) if end <= slab.byte_len => Ok(()),
            _ => Err(BackendError::BufferOutOfBounds {
                offset,
                size,
                buffer_size: slab.byte_len,
            }),
        }
    }
}

impl Default for DeviceMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeviceMemory {
    fn drop(&mut self) {
        for slab in self.slabs.values() {
            // SAFETY: same reconstruction as free(); each slab dropped once.
            unsafe {
                drop(Box::from_raw(std::slice::from_raw_parts_mut(
                    slab.ptr, slab.words,
                )));
            }
        }
        self.slabs.clear();
    }
}

// ================================================================================================
// Tests
// ================================================================================================
