/// Errors raised by [`Arena`](super::Arena) operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// The request (after 16-byte rounding) does not fit in the remaining space.
    #[error("arena out of space: requested {requested} bytes with {used}/{capacity} bytes used")]
    OutOfSpace {
        requested: usize,
        used: usize,
        capacity: usize,
    },

    /// The backing buffer itself could not be reserved.
    #[error("failed to reserve {capacity} bytes of arena backing storage")]
    BackingAllocation { capacity: usize },

    /// The allocation was handed out before the last reset.
    #[error("stale arena allocation: generation {generation}, arena is at {current}")]
    StaleAllocation { generation: u32, current: u32 },
}
