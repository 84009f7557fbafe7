/// Aligned memory blocks for amplitude storage.
///
/// Blocks come from the global allocator using the over-allocate strategy:
/// a raw block of `size + HEADER + alignment - 1` bytes is requested, the
/// returned pointer is rounded up to the alignment, and a two-word header
/// sitting immediately before it records how to get back to the raw block.
///
/// ```text
///   raw                      header         block (aligned)
///    |<------- offset ------->|<- 2 words ->|<------ size ------>|
/// ```
///
/// `release` needs nothing but the block pointer, which is what lets
/// [`AlignedBuffer`] store a single pointer.
use crate::error::{Error, Result};
use std::alloc::{self, Layout};
use std::mem::{align_of, size_of};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment used for state-vector buffers (one 256-bit vector register).
pub const AMPLITUDE_ALIGNMENT: usize = 32;

/// Header words: offset back to the raw block, then the raw block's size.
const HEADER: usize = 2 * size_of::<usize>();

/// Allocate `size` bytes whose address is a multiple of `alignment`.
///
/// `alignment` must be a power of two. Fails with [`Error::Allocation`] when
/// the padded size overflows or the global allocator returns null.
pub fn allocate(size: usize, alignment: usize) -> Result<NonNull<u8>> {
    if !alignment.is_power_of_two() {
        return Err(Error::InvalidAlignment(alignment));
    }
    let align = alignment.max(align_of::<usize>());
    let failed = || Error::Allocation { size, alignment };

    let total = size
        .checked_add(HEADER)
        .and_then(|n| n.checked_add(align - 1))
        .ok_or_else(failed)?;
    let layout = Layout::from_size_align(total, align_of::<usize>()).map_err(|_| failed())?;

    // SAFETY: `layout` has non-zero size (HEADER > 0).
    let raw = NonNull::new(unsafe { alloc::alloc(layout) }).ok_or_else(failed)?;

    let base = raw.as_ptr() as usize;
    let offset = ((base + HEADER + align - 1) & !(align - 1)) - base;

    // SAFETY: HEADER <= offset and offset + size <= total, so both the header
    // and the block lie inside the raw allocation. `align` is at least the
    // alignment of usize, so the header words are properly aligned.
    unsafe {
        let block = raw.as_ptr().add(offset);
        let header = block.cast::<usize>().sub(2);
        header.write(offset);
        header.add(1).write(total);
        Ok(NonNull::new_unchecked(block))
    }
}

/// Return a block obtained from [`allocate`] to the global allocator.
///
/// # Safety
/// `ptr` must come from [`allocate`] and must not have been released yet.
/// No alignment or ownership check is performed.
pub unsafe fn release(ptr: NonNull<u8>) {
    let block = ptr.as_ptr();
    let header = block.cast::<usize>().sub(2);
    let offset = header.read();
    let total = header.add(1).read();
    let raw = block.sub(offset);
    alloc::dealloc(raw, Layout::from_size_align_unchecked(total, align_of::<usize>()));
}

/// Owned, aligned, default-initialised `[T]`, released on drop.
pub struct AlignedBuffer<T: Copy + Default> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T: Copy + Default> AlignedBuffer<T> {
    /// Allocate `len` elements aligned to `alignment` bytes (raised to the
    /// natural alignment of `T` if smaller), every element `T::default()`.
    pub fn new(len: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment(alignment));
        }
        let alignment = alignment.max(align_of::<T>());
        let size = len
            .checked_mul(size_of::<T>())
            .ok_or(Error::Allocation { size: usize::MAX, alignment })?;
        let ptr = allocate(size, alignment)?.cast::<T>();

        // SAFETY: the block holds `len` properly aligned elements of T.
        unsafe {
            for i in 0..len {
                ptr.as_ptr().add(i).write(T::default());
            }
        }
        Ok(Self { ptr, len })
    }

    /// Start address of the buffer.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// True if the buffer start is a multiple of `alignment`.
    pub fn is_aligned_to(&self, alignment: usize) -> bool {
        (self.ptr.as_ptr() as usize) % alignment == 0
    }
}

impl<T: Copy + Default> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` owns `len` initialised elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy + Default> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: `ptr` owns `len` initialised elements and `&mut self`
        // guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy + Default> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `allocate` and is released exactly once.
        unsafe { release(self.ptr.cast()) }
    }
}

impl<T: Copy + Default + std::fmt::Debug> std::fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// SAFETY: the buffer exclusively owns its elements, like a Vec<T>.
unsafe impl<T: Copy + Default + Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Copy + Default + Sync> Sync for AlignedBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_aligned() {
        let ptr = allocate(1024, 32).expect("allocation failed");
        assert_eq!(ptr.as_ptr() as usize % 32, 0);
        unsafe { release(ptr) };
    }

    #[test]
    fn test_release_does_not_corrupt_other_block() {
        let first = allocate(1024, 32).unwrap();
        unsafe { first.as_ptr().write_bytes(0xAA, 1024) };

        let second = allocate(1024, 32).unwrap();
        unsafe { second.as_ptr().write_bytes(0x55, 1024) };

        unsafe { release(first) };

        let bytes = unsafe { std::slice::from_raw_parts(second.as_ptr(), 1024) };
        assert!(bytes.iter().all(|&b| b == 0x55));
        unsafe { release(second) };
    }

    #[test]
    fn test_various_alignments() {
        for align in [1usize, 2, 4, 8, 16, 64, 256, 4096] {
            let ptr = allocate(100, align).unwrap();
            assert_eq!(ptr.as_ptr() as usize % align, 0, "alignment {align}");
            unsafe { release(ptr) };
        }
    }

    #[test]
    fn test_zero_size_allocation() {
        let ptr = allocate(0, 32).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 32, 0);
        unsafe { release(ptr) };
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        assert_eq!(allocate(64, 24), Err(Error::InvalidAlignment(24)));
        assert_eq!(allocate(64, 0), Err(Error::InvalidAlignment(0)));
    }

    #[test]
    fn test_overflowing_size_rejected() {
        let err = allocate(usize::MAX, 32).unwrap_err();
        assert!(matches!(err, Error::Allocation { alignment: 32, .. }));
    }

    #[test]
    fn test_buffer_zeroed_and_aligned() {
        let mut buf = AlignedBuffer::<f32>::new(37, AMPLITUDE_ALIGNMENT).unwrap();
        assert_eq!(buf.len(), 37);
        assert!(buf.is_aligned_to(AMPLITUDE_ALIGNMENT));
        assert!(buf.iter().all(|&x| x == 0.0));
        buf[36] = 1.5;
        assert_eq!(buf[36], 1.5);
    }

    #[test]
    fn test_buffer_length_overflow() {
        assert!(AlignedBuffer::<f64>::new(usize::MAX, 32).is_err());
    }
}
