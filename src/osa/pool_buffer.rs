//! Aligned DMA memory handed out by a [`DmaAllocator`]
use alloc::sync::Arc;
use core::{alloc::Layout, ptr::NonNull};

use super::err::{OsaError, OsaStatus};

/// Source of DMA-capable memory
///
/// The returned region must be zero-filled and stay at a fixed address until
/// it is handed back through [`DmaAllocator::dealloc`].
pub trait DmaAllocator: Send + Sync {
    fn alloc_aligned(&self, size: usize, align: usize) -> OsaStatus<NonNull<u8>>;

    /// # Safety
    ///
    /// `addr` must come from `alloc_aligned` on the same allocator with the
    /// same `size` and `align`, and must not be used afterwards.
    unsafe fn dealloc(&self, addr: NonNull<u8>, size: usize, align: usize);
}

/// Allocator backed by the global heap
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalDmaAllocator;

impl DmaAllocator for GlobalDmaAllocator {
    fn alloc_aligned(&self, size: usize, align: usize) -> OsaStatus<NonNull<u8>> {
        if size == 0 {
            return Err(OsaError::InvalidBuf);
        }
        let layout = Layout::from_size_align(size, align).map_err(|_| OsaError::InvalidBuf)?;
        let ptr = unsafe { alloc::alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or(OsaError::BadMalloc)
    }

    unsafe fn dealloc(&self, addr: NonNull<u8>, size: usize, align: usize) {
        unsafe {
            let layout = Layout::from_size_align_unchecked(size, align);
            alloc::alloc::dealloc(addr.as_ptr(), layout);
        }
    }
}

/// An owned, aligned region that goes back to its allocator on drop
pub struct PoolBuffer {
    size: usize,
    align: usize,
    addr: NonNull<u8>,
    allocator: Arc<dyn DmaAllocator>,
}

// The region is exclusively owned by this handle.
unsafe impl Send for PoolBuffer {}
unsafe impl Sync for PoolBuffer {}

impl PoolBuffer {
    /// Alloc 'size' bytes space, aligned to 'align' bytes
    pub fn alloc(allocator: &Arc<dyn DmaAllocator>, size: usize, align: usize) -> OsaStatus<Self> {
        let addr = allocator.alloc_aligned(size, align)?;
        Ok(Self {
            size,
            align,
            addr,
            allocator: allocator.clone(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn addr(&self) -> NonNull<u8> {
        self.addr
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.addr.as_ptr(), self.size) }
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.addr.as_ptr(), self.size) }
    }

    /// Copy `src` to the head of the buffer, the tail keeps its content
    pub fn copy_from_slice(&mut self, src: &[u8]) -> OsaStatus {
        if src.len() > self.size {
            return Err(OsaError::NotEnoughSpace);
        }
        self.as_slice_mut()[..src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Copy the head of the buffer into `dst`
    pub fn copy_to_slice(&self, dst: &mut [u8]) -> OsaStatus {
        if dst.len() > self.size {
            return Err(OsaError::NotEnoughSpace);
        }
        dst.copy_from_slice(&self.as_slice()[..dst.len()]);
        Ok(())
    }
}

impl Drop for PoolBuffer {
    fn drop(&mut self) {
        unsafe { self.allocator.dealloc(self.addr, self.size, self.align) }
    }
}

impl core::fmt::Debug for PoolBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolBuffer")
            .field("addr", &self.addr)
            .field("size", &self.size)
            .field("align", &self.align)
            .finish()
    }
}
