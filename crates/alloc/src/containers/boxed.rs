use core::{alloc::Layout, marker::PhantomData, mem, ptr::NonNull};
use std::alloc::{self, handle_alloc_error};

use bytesize::ByteSize;
use log::trace;

/// An owned heap block of `capacity` slots for values of type `T`.
///
/// `ArrayBox` only manages the memory. It never reads, writes, or drops the values in its
/// slots; whoever owns the box keeps track of which slots are initialized.
///
/// The block is released when the box is dropped. Ownership moves with the box and can be
/// exchanged with [`swap`](ArrayBox::swap), but a box is never copied.
pub struct ArrayBox<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the block is uniquely owned, so it is as thread-safe as the values it holds
unsafe impl<T: Send> Send for ArrayBox<T> {}
// SAFETY: shared access only hands out `*const T`
unsafe impl<T: Sync> Sync for ArrayBox<T> {}

impl<T> ArrayBox<T> {
    /// Constructs an empty `ArrayBox` without allocating.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates a block of exactly `capacity` uninitialized slots.
    ///
    /// Zero-sized requests (`capacity == 0` or a zero-sized `T`) do not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the block would exceed `isize::MAX` bytes.
    ///
    /// Aborts through [`handle_alloc_error`] if the allocator is out of memory.
    pub fn with_capacity(capacity: usize) -> Self {
        let layout = Self::layout(capacity);
        if layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                cap: capacity,
                _marker: PhantomData,
            };
        }

        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc::alloc(layout) };
        let ptr = match NonNull::new(ptr.cast::<T>()) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        };

        trace!(
            "allocated block of {} slots ({})",
            capacity,
            ByteSize::b(layout.size() as u64).to_string_as(true)
        );

        Self {
            ptr,
            cap: capacity,
            _marker: PhantomData,
        }
    }

    /// Returns the number of slots in the block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Exchanges blocks with `other`. Neither block is copied.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }

    fn layout(capacity: usize) -> Layout {
        match Layout::array::<T>(capacity) {
            Ok(layout) => layout,
            Err(_) => panic!("capacity overflow"),
        }
    }
}

impl<T> Default for ArrayBox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ArrayBox<T> {
    fn drop(&mut self) {
        let layout = Self::layout(self.cap);
        if layout.size() != 0 {
            trace!(
                "released block of {} slots ({})",
                self.cap,
                ByteSize::b(layout.size() as u64).to_string_as(true)
            );
            // SAFETY: a non-zero layout means the block came from `alloc::alloc` with this layout
            unsafe {
                alloc::dealloc(self.ptr.as_ptr().cast(), layout);
            }
        }
    }
}
