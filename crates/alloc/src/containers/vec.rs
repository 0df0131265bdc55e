use core::{
    cmp::{self, Ordering},
    fmt,
    hash::{Hash, Hasher},
    mem,
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr,
    slice::{self, SliceIndex},
};

use log::trace;

use super::boxed::ArrayBox;
use crate::{constants::grown_capacity, error::OutOfRange, ptr::Cursor};

/// A capacity hint that routes construction to [`DynamicArray::with_reserve`].
///
/// Building a `DynamicArray` from a `ReserveRequest` gives an empty array with room for
/// `capacity` elements, as opposed to [`DynamicArray::with_len`], which fills that room with
/// default values.
///
/// ```
/// use simple_vector::{reserve, DynamicArray};
///
/// let arr = DynamicArray::<u32>::from(reserve(16));
/// assert_eq!(arr.len(), 0);
/// assert_eq!(arr.capacity(), 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReserveRequest {
    capacity: usize,
}

impl ReserveRequest {
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    #[inline]
    pub const fn capacity(self) -> usize {
        self.capacity
    }
}

/// Shorthand for [`ReserveRequest::new`].
pub const fn reserve(capacity: usize) -> ReserveRequest {
    ReserveRequest::new(capacity)
}

/// A contiguous growable array, written as `DynamicArray<T>`.
///
/// The array owns one heap block of [`capacity`](DynamicArray::capacity) slots, the first
/// [`len`](DynamicArray::len) of which hold live elements. When a push or insert finds the
/// block full, the array moves to a new block with `max(1, 2 * capacity)` slots, which keeps
/// appending amortized *O*(1).
///
/// # Access
///
/// There are three ways to read an element by index, with different contracts:
///
/// - [`at`](DynamicArray::at) checks the index and returns [`OutOfRange`] on failure.
/// - `arr[i]` checks the index and panics on failure, which is a bug in the caller.
/// - [`get_unchecked`](DynamicArray::get_unchecked) does not check at all.
///
/// # Cursors
///
/// [`begin`](DynamicArray::begin) and [`end`](DynamicArray::end) return [`Cursor`]s bounding
/// the live elements. [`insert`](DynamicArray::insert) and [`erase`](DynamicArray::erase) take
/// a cursor and return one that is valid in the array after the operation.
///
/// ```
/// use simple_vector::DynamicArray;
///
/// let mut arr = DynamicArray::new();
/// arr.push(1);
/// arr.push(2);
/// arr.insert(arr.begin() + 1, 9);
/// assert_eq!(arr, [1, 9, 2]);
///
/// arr.erase(arr.begin());
/// assert_eq!(arr, [9, 2]);
/// assert!(arr.at(5).is_err());
/// ```
pub struct DynamicArray<T> {
    buf: ArrayBox<T>,
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Constructs a new, empty `DynamicArray` without allocating.
    pub const fn new() -> Self {
        Self {
            buf: ArrayBox::new(),
            len: 0,
        }
    }

    /// Constructs a new, empty `DynamicArray` with exactly `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: ArrayBox::with_capacity(capacity),
            len: 0,
        }
    }

    /// Constructs a new, empty `DynamicArray` with room for the requested number of elements.
    ///
    /// Same as calling [`new`](DynamicArray::new) followed by
    /// [`reserve`](DynamicArray::reserve).
    pub fn with_reserve(request: ReserveRequest) -> Self {
        let mut arr = Self::new();
        arr.reserve(request.capacity());
        arr
    }

    /// Constructs a `DynamicArray` holding `len` default values.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut arr = Self::with_capacity(len);
        for _ in 0..len {
            // SAFETY: exactly `len` slots were allocated
            unsafe { arr.push_unchecked(T::default()) };
        }
        arr
    }

    /// Constructs a `DynamicArray` holding `len` clones of `value`.
    pub fn from_elem(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        let mut arr = Self::with_capacity(len);
        for _ in 0..len {
            // SAFETY: exactly `len` slots were allocated
            unsafe { arr.push_unchecked(value.clone()) };
        }
        arr
    }

    /// Moves the contents out, leaving `self` empty with zero capacity.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of slots in the underlying block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns a reference to the element at `index`, or [`OutOfRange`] if there is none.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        if index >= self.len {
            return Err(OutOfRange {
                index,
                len: self.len,
            });
        }
        // SAFETY: checked above
        Ok(unsafe { self.get_unchecked(index) })
    }

    /// Returns a mutable reference to the element at `index`, or [`OutOfRange`] if there is
    /// none.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        if index >= self.len {
            return Err(OutOfRange {
                index,
                len: self.len,
            });
        }
        // SAFETY: checked above
        Ok(unsafe { self.get_unchecked_mut(index) })
    }

    /// Returns a reference to the element at `index` without checking the bounds.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](DynamicArray::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index {} out of bounds", index);
        &*self.buf.as_ptr().add(index)
    }

    /// Returns a mutable reference to the element at `index` without checking the bounds.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](DynamicArray::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index {} out of bounds", index);
        &mut *self.buf.as_mut_ptr().add(index)
    }

    /// Returns a cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<T> {
        Cursor::with_offset(0)
    }

    /// Returns a cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<T> {
        Cursor::with_offset(self.len)
    }

    /// Returns a cursor at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn cursor_at(&self, index: usize) -> Cursor<T> {
        assert!(
            index <= self.len,
            "cursor index {} is past the end (len {})",
            index,
            self.len
        );
        Cursor::with_offset(index)
    }

    /// Returns the element under `cursor`, or `None` if the cursor is at or past the end.
    pub fn cursor_get(&self, cursor: Cursor<T>) -> Option<&T> {
        self.as_slice().get(cursor.offset())
    }

    pub fn cursor_get_mut(&mut self, cursor: Cursor<T>) -> Option<&mut T> {
        self.as_mut_slice().get_mut(cursor.offset())
    }

    /// Drops every element. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements from `len` onward. Does nothing if `len` is not smaller than the
    /// current length. The capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(
            // SAFETY: `len < self.len <= capacity`
            unsafe { self.buf.as_mut_ptr().add(len) },
            self.len - len,
        );
        // shorten first so a panicking drop can't expose the tail again
        self.len = len;
        // SAFETY: the tail held live elements that are no longer reachable
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Resizes the array to `new_len`, filling new slots with `T::default()`.
    ///
    /// Growing past the capacity moves the elements to a block of
    /// `max(new_len, 2 * capacity)` slots.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes the array to `new_len`, filling new slots with values returned by `f`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut f: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }

        if new_len > self.capacity() {
            self.reallocate(cmp::max(new_len, grown_capacity(self.capacity())));
        }

        while self.len < new_len {
            // SAFETY: capacity >= new_len
            unsafe { self.push_unchecked(f()) };
        }
    }

    /// Ensures the block has at least `new_capacity` slots.
    ///
    /// If it has fewer, the elements move to a block of exactly `new_capacity` slots.
    /// Never shrinks.
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity > self.capacity() {
            self.reallocate(new_capacity);
        }
    }

    /// Appends an element, growing the block to `max(1, 2 * capacity)` slots if it is full.
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reallocate(grown_capacity(self.capacity()));
        }
        // SAFETY: there is at least one free slot
        unsafe { self.push_unchecked(value) };
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    pub fn pop_back(&mut self) {
        assert!(!self.is_empty(), "pop_back on an empty array");
        self.truncate(self.len - 1);
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index was live and is no longer reachable
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.len)) })
    }

    /// Inserts `value` before `position` and returns a cursor to it.
    ///
    /// Elements from `position` onward move one slot toward the end. If the block is full, the
    /// elements move to a block of `max(1, 2 * capacity)` slots, leaving the gap at `position`
    /// on the way.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past [`end`](DynamicArray::end).
    pub fn insert(&mut self, position: Cursor<T>, value: T) -> Cursor<T> {
        let offset = position.offset();
        assert!(
            offset <= self.len,
            "insertion cursor {} is past the end (len {})",
            offset,
            self.len
        );

        if self.len < self.capacity() {
            // SAFETY: `offset <= len < capacity`, so `[offset, len]` are all slots of the block
            unsafe {
                let slot = self.buf.as_mut_ptr().add(offset);
                // overlapping move, the tail is copied from its last element backward
                ptr::copy(slot, slot.add(1), self.len - offset);
                ptr::write(slot, value);
            }
        } else {
            let new_capacity = grown_capacity(self.capacity());
            trace!(
                "growing from {} to {} slots to insert at {}",
                self.capacity(),
                new_capacity,
                offset
            );
            let mut new_buf = ArrayBox::with_capacity(new_capacity);
            // SAFETY: the new block has room for `len + 1` elements and doesn't overlap the old one
            unsafe {
                let src = self.buf.as_ptr();
                let dst = new_buf.as_mut_ptr();
                ptr::copy_nonoverlapping(src, dst, offset);
                ptr::copy_nonoverlapping(src.add(offset), dst.add(offset + 1), self.len - offset);
                ptr::write(dst.add(offset), value);
            }
            // the old block only holds moved-from bits now
            self.buf = new_buf;
        }

        self.len += 1;
        Cursor::with_offset(offset)
    }

    /// Inserts `value` at `index`, shifting later elements toward the end.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_at(&mut self, index: usize, value: T) {
        self.insert(Cursor::with_offset(index), value);
    }

    /// Drops the element at `position` and returns a cursor to the element that followed it.
    ///
    /// The returned cursor has the same offset as `position`; it equals
    /// [`end`](DynamicArray::end) if the last element was erased.
    ///
    /// # Panics
    ///
    /// Panics if `position` is at or past [`end`](DynamicArray::end).
    pub fn erase(&mut self, position: Cursor<T>) -> Cursor<T> {
        assert!(position != self.end(), "erase at the end cursor");
        let offset = position.offset();
        drop(self.remove(offset));
        Cursor::with_offset(offset)
    }

    /// Removes the element at `index` and returns it, shifting later elements toward the start.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index {} is out of bounds (len {})",
            index,
            self.len
        );
        // SAFETY: `index < len`, so the slot is live and `[index + 1, len)` are live too
        unsafe {
            let slot = self.buf.as_mut_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Exchanges contents with `other` without moving any elements.
    pub fn swap(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Writes `value` into the first free slot.
    ///
    /// # Safety
    ///
    /// `len` must be less than the capacity.
    #[inline]
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.capacity());
        ptr::write(self.buf.as_mut_ptr().add(self.len), value);
        // only count the element once it is in place
        self.len += 1;
    }

    /// Moves the live elements into a new block of `new_capacity` slots.
    fn reallocate(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.len);
        trace!(
            "reallocating from {} to {} slots ({} live)",
            self.capacity(),
            new_capacity,
            self.len
        );
        let mut new_buf = ArrayBox::with_capacity(new_capacity);
        // SAFETY: both blocks hold at least `len` slots and are distinct allocations
        unsafe {
            ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_mut_ptr(), self.len);
        }
        self.buf = new_buf;
    }

    pub(super) fn into_raw_parts(mut self) -> (ArrayBox<T>, usize) {
        let buf = mem::take(&mut self.buf);
        let len = mem::replace(&mut self.len, 0);
        (buf, len)
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` are live; the block itself is released by `ArrayBox`
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr(),
                self.len,
            ));
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Copies the live elements into a new block with the same capacity as `self`.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.capacity());
        for value in self.iter() {
            // SAFETY: the copy has as many slots as `self`
            unsafe { copy.push_unchecked(value.clone()) };
        }
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `[0, len)` are live and the pointer is non-null and aligned
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: `[0, len)` are live and the pointer is non-null and aligned
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynamicArray<T> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynamicArray<T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut arr = Self::with_capacity(N);
        for value in values {
            // SAFETY: exactly `N` slots were allocated
            unsafe { arr.push_unchecked(value) };
        }
        arr
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(values: &[T]) -> Self {
        let mut arr = Self::with_capacity(values.len());
        for value in values {
            // SAFETY: exactly `values.len()` slots were allocated
            unsafe { arr.push_unchecked(value.clone()) };
        }
        arr
    }
}

impl<T> From<ReserveRequest> for DynamicArray<T> {
    fn from(request: ReserveRequest) -> Self {
        Self::with_reserve(request)
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialEq> PartialEq<[T]> for DynamicArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq> PartialEq<&[T]> for DynamicArray<T> {
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for DynamicArray<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

/// Returns `true` if `lhs` sorts before `rhs`, comparing elements with `<` only.
fn lexicographic_less<T: PartialOrd>(lhs: &[T], rhs: &[T]) -> bool {
    for (a, b) in lhs.iter().zip(rhs) {
        if a < b {
            return true;
        }
        if b < a {
            return false;
        }
    }
    lhs.len() < rhs.len()
}

/// `<` is the single ordering primitive; `<=`, `>` and `>=` are derived from it.
impl<T: PartialOrd> PartialOrd for DynamicArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }

    fn lt(&self, other: &Self) -> bool {
        lexicographic_less(self, other)
    }

    fn le(&self, other: &Self) -> bool {
        !lexicographic_less(other, self)
    }

    fn gt(&self, other: &Self) -> bool {
        lexicographic_less(other, self)
    }

    fn ge(&self, other: &Self) -> bool {
        !lexicographic_less(self, other)
    }
}

impl<T: Ord> Ord for DynamicArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        sync::{
            atomic::{AtomicUsize, Ordering as AtomicOrdering},
            Arc,
        },
    };

    use crossbeam::scope;

    use super::*;
    use crate::dynarray;

    /// Counts how many times values carrying the same counter have been dropped.
    #[derive(Clone, Debug)]
    struct Tracked {
        id: usize,
        drops: Arc<AtomicUsize>,
    }

    impl Tracked {
        fn new(id: usize, drops: &Arc<AtomicUsize>) -> Self {
            Self {
                id,
                drops: Arc::clone(drops),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    fn drops(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(AtomicOrdering::SeqCst)
    }

    fn hash_of<H: Hash + ?Sized>(value: &H) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn new_is_empty_and_unallocated() {
        let arr = DynamicArray::<i32>::new();
        assert_eq!(arr.len(), 0);
        assert_eq!(arr.capacity(), 0);
        assert!(arr.is_empty());
        assert_eq!(arr.begin(), arr.end());
    }

    #[test]
    fn with_len_fills_defaults() {
        let arr = DynamicArray::<String>::with_len(3);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.capacity(), 3);
        assert!(arr.iter().all(String::is_empty));
    }

    #[test]
    fn from_elem_fills_clones() {
        let arr = DynamicArray::from_elem(4, &7u8);
        assert_eq!(arr, [7, 7, 7, 7]);
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn from_literal_has_exact_capacity() {
        let arr = DynamicArray::from([1, 2, 3]);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.capacity(), 3);
        assert_eq!(arr, [1, 2, 3]);

        let from_slice = DynamicArray::from(&[4, 5][..]);
        assert_eq!(from_slice, [4, 5]);
        assert_eq!(from_slice.capacity(), 2);
    }

    #[test]
    fn reserve_request_is_capacity_only() {
        let arr = DynamicArray::<u64>::with_reserve(reserve(10));
        assert_eq!(arr.len(), 0);
        assert_eq!(arr.capacity(), 10);

        let arr: DynamicArray<u64> = reserve(3).into();
        assert_eq!(arr.capacity(), 3);
        assert!(arr.is_empty());

        let filled = DynamicArray::<u64>::with_len(10);
        assert_eq!(filled.len(), 10);
    }

    #[test]
    fn index_and_at_agree() {
        let arr = dynarray![10, 20, 30, 40];
        for i in 0..arr.len() {
            assert_eq!(arr[i], *arr.at(i).unwrap());
            assert_eq!(unsafe { *arr.get_unchecked(i) }, arr[i]);
        }
    }

    #[test]
    fn at_rejects_every_index_past_the_end() {
        for len in 0..5 {
            let arr = DynamicArray::<u32>::with_len(len);
            for index in len..len + 3 {
                assert_eq!(arr.at(index), Err(OutOfRange { index, len }));
            }
        }
    }

    #[test]
    fn at_mut_writes_through() {
        let mut arr = dynarray![1, 2, 3];
        *arr.at_mut(1).unwrap() = 5;
        assert_eq!(arr, [1, 5, 3]);
        assert!(arr.at_mut(3).is_err());

        unsafe { *arr.get_unchecked_mut(0) = 0 };
        arr[2] = 9;
        assert_eq!(arr, [0, 5, 9]);
    }

    #[test]
    #[should_panic]
    fn index_operator_past_end_panics() {
        let arr = dynarray![1, 2];
        let _value = arr[2];
    }

    #[test]
    fn push_grows_by_doubling() {
        let mut arr = DynamicArray::new();
        let mut capacities = Vec::new();
        for i in 0..100 {
            arr.push(i);
            assert!(arr.capacity() >= arr.len());
            if capacities.last() != Some(&arr.capacity()) {
                capacities.push(arr.capacity());
            }
        }
        assert_eq!(arr.len(), 100);
        for i in 0..100 {
            assert_eq!(arr[i], i);
        }
        assert_eq!(capacities, [1, 2, 4, 8, 16, 32, 64, 128]);
    }

    #[test]
    fn push_within_capacity_keeps_block() {
        let mut arr = DynamicArray::with_capacity(4);
        let ptr = arr.as_ptr();
        for i in 0..4 {
            arr.push(i);
        }
        assert_eq!(arr.as_ptr(), ptr);
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn resize_grows_and_truncates() {
        let mut arr = dynarray![1, 2, 3];
        arr.resize(3);
        assert_eq!(arr, [1, 2, 3]);

        arr.resize(5);
        assert_eq!(arr, [1, 2, 3, 0, 0]);
        assert_eq!(arr.capacity(), 6);

        arr.resize(2);
        assert_eq!(arr, [1, 2]);
        assert_eq!(arr.capacity(), 6);

        arr.resize(5);
        assert_eq!(arr, [1, 2, 0, 0, 0]);
    }

    #[test]
    fn resize_past_double_uses_requested_len() {
        let mut arr = dynarray![1u8, 2];
        arr.resize(9);
        assert_eq!(arr.capacity(), 9);
        assert_eq!(arr.len(), 9);

        let mut empty = DynamicArray::<u8>::new();
        empty.resize(3);
        assert_eq!(empty.capacity(), 3);
    }

    #[test]
    fn resize_with_uses_closure() {
        let mut arr = DynamicArray::new();
        let mut next = 0;
        arr.resize_with(4, || {
            next += 1;
            next
        });
        assert_eq!(arr, [1, 2, 3, 4]);
    }

    #[test]
    fn reserve_never_shrinks() {
        let mut arr = dynarray![1, 2, 3];
        arr.reserve(10);
        assert_eq!(arr.capacity(), 10);
        assert_eq!(arr, [1, 2, 3]);

        let ptr = arr.as_ptr();
        arr.reserve(4);
        arr.reserve(10);
        assert_eq!(arr.capacity(), 10);
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.as_ptr(), ptr);
        assert_eq!(arr, [1, 2, 3]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut arr = dynarray![1, 2, 3];
        arr.clear();
        assert!(arr.is_empty());
        assert_eq!(arr.capacity(), 3);
        arr.push(4);
        assert_eq!(arr, [4]);
    }

    #[test]
    fn pop_back_and_pop() {
        let mut arr = dynarray![1, 2, 3];
        arr.pop_back();
        assert_eq!(arr, [1, 2]);
        assert_eq!(arr.pop(), Some(2));
        assert_eq!(arr.pop(), Some(1));
        assert_eq!(arr.pop(), None);
        assert_eq!(arr.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "pop_back on an empty array")]
    fn pop_back_on_empty_panics() {
        DynamicArray::<u8>::new().pop_back();
    }

    #[test]
    fn insert_at_every_position() {
        for k in 0..=4 {
            // one case with spare room, one that must reallocate
            for capacity in [8, 4] {
                let mut arr = DynamicArray::with_capacity(capacity);
                arr.extend([0, 1, 2, 3]);

                let cursor = arr.insert(arr.begin() + k, 99);

                assert_eq!(cursor.offset(), k);
                assert_eq!(arr.cursor_get(cursor), Some(&99));
                assert_eq!(arr.len(), 5);
                assert_eq!(arr[k], 99);
                for i in 0..k {
                    assert_eq!(arr[i], i);
                }
                for i in k + 1..5 {
                    assert_eq!(arr[i], i - 1);
                }
            }
        }
    }

    #[test]
    fn insert_into_full_array_doubles() {
        let mut arr = dynarray![1, 2];
        arr.insert(arr.begin() + 1, 5);
        assert_eq!(arr.capacity(), 4);
        assert_eq!(arr, [1, 5, 2]);

        let mut empty = DynamicArray::new();
        let cursor = empty.insert(empty.begin(), 'a');
        assert_eq!(cursor, empty.begin());
        assert_eq!(empty.capacity(), 1);
        assert_eq!(empty, ['a']);
    }

    #[test]
    #[should_panic(expected = "insertion cursor 3 is past the end (len 2)")]
    fn insert_past_end_panics() {
        let mut arr = dynarray![1, 2];
        arr.insert(arr.end() + 1, 3);
    }

    #[test]
    fn erase_at_every_position() {
        let n = 5;
        for k in 0..n {
            let mut arr: DynamicArray<usize> = (0..n).collect();
            let cursor = arr.erase(arr.begin() + k);

            assert_eq!(arr.len(), n - 1);
            assert_eq!(cursor, arr.begin() + k);
            if k == n - 1 {
                assert_eq!(cursor, arr.end());
                assert_eq!(arr.cursor_get(cursor), None);
            } else {
                assert_eq!(arr.cursor_get(cursor), Some(&(k + 1)));
            }
            let expected: Vec<usize> = (0..n).filter(|&i| i != k).collect();
            assert_eq!(arr, expected.as_slice());
        }
    }

    #[test]
    #[should_panic(expected = "erase at the end cursor")]
    fn erase_at_end_panics() {
        let mut arr = dynarray![1];
        arr.erase(arr.end());
    }

    #[test]
    fn remove_returns_value() {
        let mut arr = dynarray!["a", "b", "c"];
        assert_eq!(arr.remove(1), "b");
        assert_eq!(arr, ["a", "c"]);
        arr.insert_at(2, "d");
        assert_eq!(arr, ["a", "c", "d"]);
    }

    #[test]
    fn walkthrough() {
        let mut arr = DynamicArray::new();
        arr.push(1);
        arr.push(2);
        arr.insert(arr.begin() + 1, 9);
        assert_eq!(arr, [1, 9, 2]);
        assert_eq!(arr.len(), 3);

        arr.erase(arr.begin());
        assert_eq!(arr, [9, 2]);
        assert_eq!(arr.len(), 2);

        assert_eq!(arr.at(5), Err(OutOfRange { index: 5, len: 2 }));
    }

    #[test]
    fn cursor_walk_matches_iteration() {
        let arr = dynarray![3, 1, 4, 1, 5];
        let mut cursor = arr.begin();
        let mut seen = Vec::new();
        while cursor != arr.end() {
            seen.push(arr[cursor.offset()]);
            cursor += 1;
        }
        assert_eq!(seen, arr.iter().copied().collect::<Vec<_>>());
        assert_eq!(arr.end() - arr.begin(), 5);
        assert_eq!(arr.cursor_at(2), arr.begin() + 2);
    }

    #[test]
    fn cursor_get_mut_writes_through() {
        let mut arr = dynarray![1, 2];
        let last = arr.end() - 1;
        *arr.cursor_get_mut(last).unwrap() = 7;
        assert_eq!(arr, [1, 7]);
        let end = arr.end();
        assert!(arr.cursor_get_mut(end).is_none());
    }

    #[test]
    fn clone_is_independent() {
        let mut original = DynamicArray::with_capacity(8);
        original.extend([1, 2, 3]);

        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_eq!(copy.capacity(), 8);
        assert_ne!(copy.as_ptr(), original.as_ptr());

        copy[0] = 100;
        copy.push(4);
        assert_eq!(original, [1, 2, 3]);
        assert_eq!(copy, [100, 2, 3, 4]);
    }

    #[test]
    fn clone_from_replaces_contents() {
        let source = dynarray![String::from("x"), String::from("y")];
        let mut target = dynarray![String::from("old")];
        target.clone_from(&source);
        assert_eq!(target, source);
        assert_eq!(target.capacity(), source.capacity());
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut source = dynarray![1, 2, 3];
        let ptr = source.as_ptr();

        let moved = source.take();

        assert_eq!(moved, [1, 2, 3]);
        assert_eq!(moved.as_ptr(), ptr);
        assert_eq!(source.len(), 0);
        assert_eq!(source.capacity(), 0);
    }

    #[test]
    fn swap_exchanges_everything() {
        let mut a = dynarray![1, 2, 3];
        let mut b = DynamicArray::with_capacity(10);
        b.push(9);
        let (a_ptr, b_ptr) = (a.as_ptr(), b.as_ptr());

        a.swap(&mut b);

        assert_eq!(a, [9]);
        assert_eq!(a.capacity(), 10);
        assert_eq!(a.as_ptr(), b_ptr);
        assert_eq!(b, [1, 2, 3]);
        assert_eq!(b.capacity(), 3);
        assert_eq!(b.as_ptr(), a_ptr);
    }

    #[test]
    fn equality() {
        assert_eq!(dynarray![1, 2, 3], dynarray![1, 2, 3]);
        assert_ne!(dynarray![1, 2, 3], dynarray![1, 2]);
        assert_ne!(dynarray![1, 2, 3], dynarray![1, 2, 4]);
        assert_eq!(DynamicArray::<u8>::new(), DynamicArray::with_capacity(5));

        let mut spare = DynamicArray::with_capacity(10);
        spare.extend([1, 2]);
        assert_eq!(spare, dynarray![1, 2]);
    }

    #[test]
    fn lexicographic_order() {
        let a = dynarray![1, 2];
        let b = dynarray![1, 2, 3];
        let c = dynarray![1, 3];

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
        assert!(!(b < a));
        assert!(a <= b && a <= a.clone());
        assert!(c > b && c >= b && c >= c.clone());
        assert!(!(a > a.clone()));
        assert!(DynamicArray::<i32>::new() < a);

        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
        assert_eq!(c.cmp(&b), Ordering::Greater);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn hash_matches_slice() {
        let arr = dynarray![1u32, 2, 3];
        assert_eq!(hash_of(&arr), hash_of(&[1u32, 2, 3][..]));
    }

    #[test]
    fn debug_prints_as_list() {
        assert_eq!(format!("{:?}", dynarray![1, 2]), "[1, 2]");
    }

    #[test]
    fn every_value_dropped_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut arr = DynamicArray::new();
            for i in 0..10 {
                arr.push(Tracked::new(i, &counter));
            }
            arr.pop_back();
            assert_eq!(drops(&counter), 1);

            arr.erase(arr.begin() + 3);
            assert_eq!(drops(&counter), 2);
            assert_eq!(arr[3].id, 4);

            arr.truncate(5);
            assert_eq!(drops(&counter), 5);

            let popped = arr.pop();
            assert_eq!(popped.as_ref().map(|t| t.id), Some(5));
            drop(popped);
            assert_eq!(drops(&counter), 6);

            arr.insert(arr.begin(), Tracked::new(100, &counter));
            arr.reserve(64);
            assert_eq!(drops(&counter), 6);
            assert_eq!(arr.len(), 5);
        }
        assert_eq!(drops(&counter), 11);
    }

    #[test]
    fn clear_drops_live_elements() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut arr = DynamicArray::new();
        arr.resize_with(4, || Tracked::new(0, &counter));
        arr.clear();
        assert_eq!(drops(&counter), 4);
        drop(arr);
        assert_eq!(drops(&counter), 4);
    }

    #[test]
    fn clone_from_drops_old_contents() {
        let counter = Arc::new(AtomicUsize::new(0));
        let source = DynamicArray::from_elem(2, &Tracked::new(0, &counter));
        // the template passed to `from_elem` is gone
        assert_eq!(drops(&counter), 1);

        let mut target = DynamicArray::new();
        target.push(Tracked::new(1, &counter));
        target.push(Tracked::new(2, &counter));
        target.push(Tracked::new(3, &counter));
        target.clone_from(&source);
        assert_eq!(drops(&counter), 4);
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn zero_sized_elements() {
        let mut arr = DynamicArray::new();
        for _ in 0..10 {
            arr.push(());
        }
        arr.insert(arr.begin() + 3, ());
        arr.erase(arr.begin());
        assert_eq!(arr.len(), 10);
        assert!(arr.capacity() >= 10);
        assert_eq!(arr.iter().count(), 10);
    }

    #[test]
    fn shared_reads_across_threads() {
        let arr: DynamicArray<u64> = (0..100).collect();

        scope(|s| {
            for _ in 0..2 {
                s.spawn(|_| {
                    let sum: u64 = arr.iter().sum();
                    assert_eq!(sum, 4950);
                });
            }
        })
        .unwrap();
    }

    #[test]
    fn slices_through_deref() {
        let mut arr = dynarray![5, 3, 1, 4];
        assert_eq!(&arr[1..3], &[3, 1]);
        arr.sort();
        assert_eq!(arr, [1, 3, 4, 5]);
        assert_eq!(arr.first(), Some(&1));
        assert!(arr.contains(&4));
        for value in &mut arr {
            *value *= 2;
        }
        assert_eq!(arr, [2, 6, 8, 10]);
    }
}
