use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Add, AddAssign, Sub, SubAssign},
};

/// A position inside a [`DynamicArray`](crate::DynamicArray), relative to its first slot.
///
/// Cursors are what [`begin`](crate::DynamicArray::begin) and [`end`](crate::DynamicArray::end)
/// return and what [`insert`](crate::DynamicArray::insert) and
/// [`erase`](crate::DynamicArray::erase) take. They are plain offsets, so they support the same
/// arithmetic and ordering a pointer into the buffer would.
///
/// A cursor is invalidated by any operation that shifts or reallocates the elements at or
/// before it. Because it is stored relative to the buffer, a stale cursor never points into
/// freed memory; it names whatever element now occupies its offset.
#[repr(transparent)]
pub struct Cursor<T> {
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Cursor<T> {}

impl<T> Clone for Cursor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Cursor<T> {
    pub(crate) const fn with_offset(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    /// Returns the number of slots between the first slot and this cursor.
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }

    /// Returns a cursor `count` slots further toward the end.
    ///
    /// # Panics
    ///
    /// Panics if the offset overflows `usize`.
    #[inline]
    pub fn add(self, count: usize) -> Self {
        match self.offset.checked_add(count) {
            Some(offset) => Self::with_offset(offset),
            None => panic!("cursor offset overflow"),
        }
    }

    /// Returns a cursor `count` slots back toward the start.
    ///
    /// # Panics
    ///
    /// Panics if the result would be before the first slot.
    #[inline]
    pub fn sub(self, count: usize) -> Self {
        match self.offset.checked_sub(count) {
            Some(offset) => Self::with_offset(offset),
            None => panic!("cursor moved before the first slot"),
        }
    }

    /// Returns the signed distance from `origin` to `self`, in slots.
    #[inline]
    pub fn offset_from(self, origin: Self) -> isize {
        self.offset.wrapping_sub(origin.offset) as isize
    }
}

impl<T> Add<usize> for Cursor<T> {
    type Output = Self;

    fn add(self, count: usize) -> Self {
        Cursor::add(self, count)
    }
}

impl<T> AddAssign<usize> for Cursor<T> {
    fn add_assign(&mut self, count: usize) {
        *self = Cursor::add(*self, count);
    }
}

impl<T> Sub<usize> for Cursor<T> {
    type Output = Self;

    fn sub(self, count: usize) -> Self {
        Cursor::sub(self, count)
    }
}

impl<T> SubAssign<usize> for Cursor<T> {
    fn sub_assign(&mut self, count: usize) {
        *self = Cursor::sub(*self, count);
    }
}

impl<T> Sub for Cursor<T> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.offset_from(origin)
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T> Eq for Cursor<T> {}

impl<T> PartialOrd for Cursor<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Cursor<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl<T> Hash for Cursor<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.offset).finish()
    }
}
