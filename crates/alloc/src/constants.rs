/// Capacity multiplier applied whenever a full container has to grow.
pub const GROWTH_FACTOR: usize = 2;
/// Smallest capacity a growing container will ask for, so an empty one never "grows" to 0.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;

/// Returns the capacity to grow to when `capacity` slots are all in use.
#[inline]
pub(crate) const fn grown_capacity(capacity: usize) -> usize {
    let doubled = match capacity.checked_mul(GROWTH_FACTOR) {
        Some(n) => n,
        None => panic!("capacity overflow"),
    };
    if doubled > MIN_NON_ZERO_CAPACITY {
        doubled
    } else {
        MIN_NON_ZERO_CAPACITY
    }
}
