use core::{fmt, iter::FusedIterator, ptr, slice};

use super::{boxed::ArrayBox, vec::DynamicArray};

/// An iterator that moves elements out of a [`DynamicArray`].
///
/// Elements that are never yielded are dropped along with the iterator.
pub struct IntoIter<T> {
    buf: ArrayBox<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// Returns the elements that have not been yielded yet.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are live
        unsafe { slice::from_raw_parts(self.buf.as_ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (buf, len) = self.into_raw_parts();
        IntoIter {
            buf,
            start: 0,
            end: len,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`, and the slot is never read again
        let value = unsafe { ptr::read(self.buf.as_ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot at the old `end - 1` is live and never read again
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = ptr::slice_from_raw_parts_mut(
            // SAFETY: `start <= end <= capacity`
            unsafe { self.buf.as_mut_ptr().add(self.start) },
            self.end - self.start,
        );
        // SAFETY: the remaining slots are live; the block is released by `ArrayBox`
        unsafe { ptr::drop_in_place(remaining) };
    }
}
