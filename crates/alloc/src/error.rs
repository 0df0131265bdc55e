use core::fmt;

/// An error where a checked access named an index outside the live elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    /// The index that was requested.
    pub index: usize,
    /// The number of live elements at the time of the request.
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index out of range: the len is {} but the index is {}",
            self.len, self.index
        )
    }
}

impl std::error::Error for OutOfRange {}
