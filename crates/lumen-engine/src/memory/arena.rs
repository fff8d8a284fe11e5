use bytemuck::{Pod, Zeroable};

use super::ArenaError;

/// Alignment (and size granularity) of every arena allocation, in bytes.
pub const ARENA_ALIGN: usize = 16;

/// Backing storage unit. Keeps region addresses 16-byte aligned, not only offsets.
#[repr(C, align(16))]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Block([u8; ARENA_ALIGN]);

/// What an arena does when a request does not fit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OverflowPolicy {
    /// Log and return [`ArenaError::OutOfSpace`]; `used` is left untouched.
    ReturnError,
    /// Abort the program. Used for engine arenas in debug builds.
    Panic,
}

impl OverflowPolicy {
    /// `Panic` with debug assertions enabled, `ReturnError` otherwise.
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::ReturnError
        }
    }
}

/// Handle to a region handed out by an [`Arena`].
///
/// Handles stay cheap to copy around; they are resolved through
/// [`Arena::bytes`] / [`Arena::bytes_mut`]. A handle obtained before a
/// [`Arena::reset`] no longer resolves.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Allocation {
    offset: usize,
    len: usize,
    generation: u32,
}

impl Allocation {
    /// Byte offset from the start of the arena. Always a multiple of [`ARENA_ALIGN`].
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Requested length in bytes (before alignment padding).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// End of the padded region.
    pub fn padded_end(&self) -> usize {
        self.offset + align_up(self.len)
    }
}

/// Bump allocator over a fixed, zero-initialized buffer.
///
/// - allocations are rounded up to 16 bytes and only ever move `used` forward
/// - the buffer is never reallocated; a request that does not fit fails
/// - nothing is freed individually; [`Arena::reset`] releases everything at once
#[derive(Debug)]
pub struct Arena {
    blocks: Vec<Block>,
    capacity: usize,
    used: usize,
    generation: u32,
    policy: OverflowPolicy,
}

impl Arena {
    /// Creates an arena of `capacity` bytes that returns errors on overflow.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_policy(capacity, OverflowPolicy::ReturnError)
    }

    /// Creates an arena of `capacity` bytes with an explicit overflow policy.
    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Result<Self, ArenaError> {
        let block_count = capacity.div_ceil(ARENA_ALIGN);

        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(block_count)
            .map_err(|_| ArenaError::BackingAllocation { capacity })?;
        blocks.resize(block_count, Block::zeroed());

        Ok(Self {
            blocks,
            capacity,
            used: 0,
            generation: 0,
            policy,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    /// Number of resets performed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Reserves `size` bytes, rounded up to a multiple of 16.
    pub fn allocate(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        let aligned = size
            .checked_add(ARENA_ALIGN - 1)
            .map(|s| s & !(ARENA_ALIGN - 1));

        let fits = aligned
            .and_then(|a| self.used.checked_add(a))
            .filter(|&end| end <= self.capacity);

        let (Some(aligned), Some(end)) = (aligned, fits) else {
            let err = ArenaError::OutOfSpace {
                requested: size,
                used: self.used,
                capacity: self.capacity,
            };
            log::error!("{err}");
            if self.policy == OverflowPolicy::Panic {
                panic!("{err}");
            }
            return Err(err);
        };

        let offset = self.used;
        self.used = end;
        debug_assert_eq!(end - offset, aligned);

        Ok(Allocation {
            offset,
            len: size,
            generation: self.generation,
        })
    }

    /// Allocates room for `value` and copies its bytes in.
    pub fn push_pod<T: Pod>(&mut self, value: &T) -> Result<Allocation, ArenaError> {
        let src = bytemuck::bytes_of(value);
        let allocation = self.allocate(src.len())?;
        self.bytes_mut(&allocation)?.copy_from_slice(src);
        Ok(allocation)
    }

    /// Resolves an allocation to its bytes.
    pub fn bytes(&self, allocation: &Allocation) -> Result<&[u8], ArenaError> {
        self.check_live(allocation)?;
        let bytes: &[u8] = bytemuck::cast_slice(&self.blocks);
        Ok(&bytes[allocation.offset..allocation.offset + allocation.len])
    }

    /// Resolves an allocation to its bytes, mutably.
    pub fn bytes_mut(&mut self, allocation: &Allocation) -> Result<&mut [u8], ArenaError> {
        self.check_live(allocation)?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.blocks);
        Ok(&mut bytes[allocation.offset..allocation.offset + allocation.len])
    }

    /// Releases every allocation at once. Memory is not zeroed.
    pub fn reset(&mut self) {
        self.used = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_live(&self, allocation: &Allocation) -> Result<(), ArenaError> {
        if allocation.generation != self.generation {
            return Err(ArenaError::StaleAllocation {
                generation: allocation.generation,
                current: self.generation,
            });
        }
        Ok(())
    }
}

#[inline]
const fn align_up(size: usize) -> usize {
    (size + ARENA_ALIGN - 1) & !(ARENA_ALIGN - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_arena_is_zeroed_and_empty() {
        let mut arena = Arena::new(64).unwrap();
        assert_eq!(arena.capacity(), 64);
        assert_eq!(arena.used(), 0);

        let a = arena.allocate(64).unwrap();
        assert!(arena.bytes(&a).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn sizes_round_up_to_sixteen() {
        let mut arena = Arena::new(1024).unwrap();
        arena.allocate(1).unwrap();
        assert_eq!(arena.used(), 16);
        arena.allocate(16).unwrap();
        assert_eq!(arena.used(), 32);
        arena.allocate(17).unwrap();
        assert_eq!(arena.used(), 64);
    }

    #[test]
    fn documented_overflow_sequence() {
        let mut arena = Arena::new(1024).unwrap();
        arena.allocate(100).unwrap();
        arena.allocate(200).unwrap();
        arena.allocate(50).unwrap();
        assert_eq!(arena.used(), 112 + 208 + 64);

        let err = arena.allocate(700).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfSpace {
                requested: 700,
                used: 384,
                capacity: 1024
            }
        );
        assert_eq!(arena.used(), 384);
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut arena = Arena::new(48).unwrap();
        arena.allocate(32).unwrap();
        arena.allocate(16).unwrap();
        assert_eq!(arena.remaining(), 0);
        assert!(arena.allocate(1).is_err());
        assert!(arena.allocate(0).is_ok());
    }

    #[test]
    fn huge_request_does_not_overflow_arithmetic() {
        let mut arena = Arena::new(64).unwrap();
        assert!(arena.allocate(usize::MAX).is_err());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    #[should_panic(expected = "arena out of space")]
    fn panic_policy_aborts_on_overflow() {
        let mut arena = Arena::with_policy(32, OverflowPolicy::Panic).unwrap();
        let _ = arena.allocate(33);
    }

    #[test]
    fn reset_invalidates_previous_handles() {
        let mut arena = Arena::new(256).unwrap();
        let a = arena.allocate(32).unwrap();
        arena.reset();

        assert_eq!(arena.used(), 0);
        assert!(matches!(
            arena.bytes(&a),
            Err(ArenaError::StaleAllocation {
                generation: 0,
                current: 1
            })
        ));
    }

    #[test]
    fn reset_does_not_zero_memory() {
        let mut arena = Arena::new(64).unwrap();
        let a = arena.allocate(4).unwrap();
        arena.bytes_mut(&a).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        arena.reset();

        let b = arena.allocate(4).unwrap();
        assert_eq!(a.offset(), b.offset());
        assert_eq!(arena.bytes(&b).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn push_pod_copies_value() {
        let mut arena = Arena::new(64).unwrap();
        let a = arena.push_pod(&[1.5f32, -2.0, 0.25, 8.0]).unwrap();
        let back: &[f32] = bytemuck::cast_slice(arena.bytes(&a).unwrap());
        assert_eq!(back, &[1.5, -2.0, 0.25, 8.0]);
        assert_eq!(arena.used(), 16);
    }

    proptest! {
        #[test]
        fn fitting_sequences_are_disjoint_and_aligned(
            sizes in proptest::collection::vec(0usize..300, 0..24),
            slack in 0usize..64,
        ) {
            let total: usize = sizes.iter().map(|&s| align_up(s)).sum();
            let mut arena = Arena::new(total + slack).unwrap();

            let mut allocations = Vec::new();
            for &size in &sizes {
                let a = arena.allocate(size).unwrap();
                prop_assert_eq!(a.offset() % ARENA_ALIGN, 0);
                let ptr = arena.bytes(&a).unwrap().as_ptr() as usize;
                prop_assert_eq!(ptr % ARENA_ALIGN, 0);
                allocations.push(a);
            }
            prop_assert_eq!(arena.used(), total);

            for pair in allocations.windows(2) {
                prop_assert!(pair[0].padded_end() <= pair[1].offset());
            }

            // The first request past the remaining space fails without moving `used`.
            let too_big = arena.remaining() + 1;
            prop_assert!(arena.allocate(too_big).is_err());
            prop_assert_eq!(arena.used(), total);
        }

        #[test]
        fn reset_allows_same_volume_again(
            sizes in proptest::collection::vec(1usize..200, 1..16),
        ) {
            let total: usize = sizes.iter().map(|&s| align_up(s)).sum();
            let mut arena = Arena::new(total).unwrap();

            for _ in 0..3 {
                for &size in &sizes {
                    prop_assert!(arena.allocate(size).is_ok());
                }
                arena.reset();
            }
        }
    }
}
