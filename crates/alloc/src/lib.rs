//! A contiguous growable array that manages its own heap block.
//!
//! [`DynamicArray`] keeps `len` live elements in a block of `capacity` slots owned by an
//! [`ArrayBox`]. Positions inside it are expressed as [`Cursor`]s.
//!
//! ```
//! use simple_vector::{dynarray, reserve, DynamicArray};
//!
//! let mut arr = dynarray![1, 2, 3];
//! arr.push(4);
//! assert_eq!(arr, [1, 2, 3, 4]);
//!
//! let empty = DynamicArray::<u8>::from(reserve(32));
//! assert!(empty.is_empty());
//! assert_eq!(empty.capacity(), 32);
//! ```
mod constants;
pub mod containers;
mod error;
mod ptr;

pub use constants::{GROWTH_FACTOR, MIN_NON_ZERO_CAPACITY};
pub use containers::{
    boxed::ArrayBox,
    into_iter::IntoIter,
    vec::{reserve, DynamicArray, ReserveRequest},
};
pub use error::OutOfRange;
pub use ptr::Cursor;

/// Creates a [`DynamicArray`] containing the arguments.
///
/// - `dynarray![a, b, c]` holds the given elements, with exactly that much capacity.
/// - `dynarray![value; n]` holds `n` clones of `value`.
///
/// ```
/// use simple_vector::dynarray;
///
/// let arr = dynarray![0u8; 3];
/// assert_eq!(arr, [0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarray {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($n, &$elem)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($x),+])
    };
}
