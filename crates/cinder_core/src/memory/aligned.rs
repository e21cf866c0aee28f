//! # Aligned Growth Buffer
//!
//! A single owned column: contiguous, 32-byte aligned, geometrically growing.

// SAFETY: This module requires unsafe for aligned allocation.
// Every unsafe block keeps `len <= capacity` and only reads initialized slots.
#![allow(unsafe_code)]

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use bytemuck::Pod;

/// Alignment of every allocation, in bytes (one 8 x f32 vector).
pub const BUFFER_ALIGN: usize = 32;

/// An owned, capacity-tracked array with SIMD-width alignment.
///
/// Growth is an exclusive copy-and-swap: the new allocation is filled with
/// the first `len` elements before the old one is freed, and capacity at
/// least doubles each time. Only the operations the particle sets need are
/// exposed.
///
/// # Example
///
/// ```rust,ignore
/// let mut column: AlignedBuffer<f32> = AlignedBuffer::new();
/// column.push(1.0);
/// assert_eq!(column.as_ptr() as usize % BUFFER_ALIGN, 0);
/// ```
pub struct AlignedBuffer<T: Pod> {
    /// Start of the allocation (dangling while `capacity == 0`).
    ptr: NonNull<T>,
    /// Number of initialized elements.
    len: usize,
    /// Number of element slots allocated.
    capacity: usize,
    /// This buffer owns its `T`s.
    _marker: PhantomData<T>,
}

impl<T: Pod> AlignedBuffer<T> {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Creates an empty buffer with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self::new();
        if capacity > 0 {
            buffer.reallocate(capacity);
        }
        buffer
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements that fit without growing.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a raw pointer to the first slot.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the initialized elements.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized and owned by us.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the initialized elements mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized and we hold `&mut self`.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Capacity the next growth step moves to.
    #[inline]
    #[must_use]
    pub const fn next_capacity(&self) -> usize {
        let base = if self.capacity == 0 { 1 } else { self.capacity };
        base * 2
    }

    /// Appends one element, growing first if full.
    ///
    /// Returns `true` if this push reallocated.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        let grew = self.len == self.capacity;
        if grew {
            self.reallocate(self.next_capacity());
        }
        // SAFETY: len < capacity after the growth check.
        unsafe {
            self.ptr.as_ptr().add(self.len).write(value);
        }
        self.len += 1;
        grew
    }

    /// Makes room for `additional` more elements.
    ///
    /// Growth is geometric: the new capacity is the larger of the doubled
    /// capacity and `len + additional`. Returns `true` if it reallocated.
    pub fn reserve(&mut self, additional: usize) -> bool {
        let required = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow());
        if required <= self.capacity {
            return false;
        }
        self.reallocate(required.max(self.next_capacity()));
        true
    }

    /// Removes the element at `index` by moving the last element into its slot.
    ///
    /// O(1); does not preserve order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "swap_remove index {index} out of bounds (len {})",
            self.len
        );
        let last = self.len - 1;
        let slice = self.as_mut_slice();
        let removed = slice[index];
        slice[index] = slice[last];
        self.len = last;
        removed
    }

    /// Shortens the buffer to `len` elements. No-op if already shorter.
    ///
    /// Capacity is kept.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    /// Removes every element, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Layout of an allocation holding `capacity` elements.
    fn layout_for(capacity: usize) -> Layout {
        let bytes = std::mem::size_of::<T>()
            .checked_mul(capacity)
            .unwrap_or_else(|| capacity_overflow());
        let align = BUFFER_ALIGN.max(std::mem::align_of::<T>());
        match Layout::from_size_align(bytes.max(1), align) {
            // Round the tail up to a whole vector so a full-width access at
            // the last aligned offset stays inside the allocation.
            Ok(layout) => layout.pad_to_align(),
            Err(_) => capacity_overflow(),
        }
    }

    /// Moves the contents into a fresh allocation of `new_capacity` slots.
    fn reallocate(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.len);
        let new_layout = Self::layout_for(new_capacity);

        // SAFETY: the layout has non-zero size; on success we copy exactly the
        // `len` initialized elements into the new, non-overlapping allocation
        // before releasing the old one with the layout it was created with.
        unsafe {
            let raw = alloc(new_layout);
            let Some(new_ptr) = NonNull::new(raw.cast::<T>()) else {
                handle_alloc_error(new_layout);
            };

            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);

            if self.capacity > 0 {
                dealloc(self.ptr.as_ptr().cast::<u8>(), Self::layout_for(self.capacity));
            }

            self.ptr = new_ptr;
        }
        self.capacity = new_capacity;
    }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

impl<T: Pod> Default for AlignedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T: Pod> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.capacity > 0 {
            // SAFETY: We allocated this memory with exactly this layout.
            unsafe {
                dealloc(self.ptr.as_ptr().cast::<u8>(), Self::layout_for(self.capacity));
            }
        }
    }
}

// SAFETY: AlignedBuffer uniquely owns plain-old-data elements.
unsafe impl<T: Pod + Send> Send for AlignedBuffer<T> {}
// SAFETY: Shared access only hands out `&[T]`.
unsafe impl<T: Pod + Sync> Sync for AlignedBuffer<T> {}
