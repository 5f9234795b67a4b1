//! Region allocator backing every AST node, name and scope list of a compilation run.
//!
//! The arena is split into two `bumpalo` regions:
//!
//! - the **block** region serves ordinary requests from growable blocks,
//! - the **large** region serves requests larger than a quarter of the
//!   configured maximum block size, so one oversized string or array never
//!   strands the unused tail of a standard block.
//!
//! Nothing is freed individually. References handed out stay valid until the
//! arena is reset or destroyed, and both operations need unique access, so the
//! borrow checker rules out dangling node references.
//!
//! [`ArenaVec`] is the growable array used for child lists. It doubles its
//! capacity on overflow and copies the old elements into the new block; the
//! previous block stays behind as unreachable garbage inside the arena.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use bumpalo::Bump;

use crate::errors::AstError;

/// Growable array whose storage lives in an [`Arena`].
pub type ArenaVec<'a, T> = bumpalo::collections::Vec<'a, T>;

/// Default maximum size of a standard block.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 64 * 1024;

pub struct Arena {
    blocks: Bump,
    large: Bump,
    max_block_size: usize,
    large_allocations: Cell<usize>,
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_block_size(DEFAULT_MAX_BLOCK_SIZE)
    }

    /// Creates an arena whose first standard block has `max_block_size` bytes.
    ///
    /// Requests above `max_block_size / 4` are routed to the large region.
    #[must_use]
    pub fn with_max_block_size(max_block_size: usize) -> Self {
        let max_block_size = max_block_size.max(64);
        Arena {
            blocks: Bump::with_capacity(max_block_size),
            large: Bump::new(),
            max_block_size,
            large_allocations: Cell::new(0),
        }
    }

    #[must_use]
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    #[must_use]
    fn is_large(&self, size: usize) -> bool {
        size > self.max_block_size / 4
    }

    fn region_for(&self, size: usize) -> &Bump {
        if self.is_large(size) {
            self.large_allocations.set(self.large_allocations.get() + 1);
            &self.large
        } else {
            &self.blocks
        }
    }

    /// Allocates `size` zeroed bytes aligned to `align`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvalidLayout`] when `align` is not a power of two
    /// and [`AstError::ArenaExhausted`] when the system allocator refuses a new block.
    pub fn allocate(&self, size: usize, align: usize) -> Result<&mut [u8], AstError> {
        let layout =
            Layout::from_size_align(size, align).map_err(|_| AstError::InvalidLayout { size, align })?;
        let ptr: NonNull<u8> = self
            .region_for(size)
            .try_alloc_layout(layout)
            .map_err(|_| AstError::ArenaExhausted { requested: size })?;
        // SAFETY: `ptr` points to `size` freshly reserved bytes owned by the arena and
        // not aliased by any other reference; they are zeroed before being exposed.
        unsafe {
            ptr.as_ptr().write_bytes(0, size);
            Ok(std::slice::from_raw_parts_mut(ptr.as_ptr(), size))
        }
    }

    /// Moves `value` into the arena.
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.region_for(std::mem::size_of::<T>()).alloc(value)
    }

    /// Copies `text` into the arena.
    pub fn alloc_str(&self, text: &str) -> &str {
        self.region_for(text.len()).alloc_str(text)
    }

    pub fn alloc_slice_copy<T: Copy>(&self, items: &[T]) -> &[T] {
        self.region_for(std::mem::size_of_val(items))
            .alloc_slice_copy(items)
    }

    /// Collects an exact-size iterator into an arena slice.
    pub fn alloc_slice_from_iter<T, I>(&self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let size = items.len().saturating_mul(std::mem::size_of::<T>());
        self.region_for(size).alloc_slice_fill_iter(items)
    }

    /// Starts a new growable array in the block region.
    #[must_use]
    pub fn vec<T>(&self) -> ArenaVec<'_, T> {
        ArenaVec::new_in(&self.blocks)
    }

    #[must_use]
    pub fn vec_with_capacity<T>(&self, capacity: usize) -> ArenaVec<'_, T> {
        ArenaVec::with_capacity_in(capacity, &self.blocks)
    }

    /// Total bytes reserved by both regions. Never decreases until [`Arena::reset`].
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.blocks.allocated_bytes() + self.large.allocated_bytes()
    }

    /// Number of requests that were served by the large region.
    #[must_use]
    pub fn large_allocation_count(&self) -> usize {
        self.large_allocations.get()
    }

    /// Rewinds both regions for an independent compilation run.
    ///
    /// `bumpalo` keeps the most recent block of each region for reuse and hands
    /// the rest back to the system allocator.
    pub fn reset(&mut self) {
        self.blocks.reset();
        self.large.reset();
        self.large_allocations.set(0);
    }

    /// Releases every block.
    pub fn destroy(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_returns_zeroed_aligned_memory() {
        let arena = Arena::new();
        let bytes = arena.allocate(32, 16).unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().all(|b| *b == 0));
        assert_eq!(bytes.as_ptr() as usize % 16, 0);
    }

    #[test]
    fn allocate_rejects_non_power_of_two_alignment() {
        let arena = Arena::new();
        let err = arena.allocate(8, 3).unwrap_err();
        assert!(matches!(err, AstError::InvalidLayout { size: 8, align: 3 }));
    }

    #[test]
    fn earlier_allocations_survive_growth() {
        let arena = Arena::with_max_block_size(256);
        let first = arena.alloc(0xC1D3_u32);
        let name = arena.alloc_str("cinder");
        let mut previous = arena.allocated_bytes();
        for i in 0..1000_u64 {
            arena.alloc(i);
            let now = arena.allocated_bytes();
            assert!(now >= previous);
            previous = now;
        }
        assert_eq!(*first, 0xC1D3);
        assert_eq!(name, "cinder");
    }

    #[test]
    fn oversized_requests_use_the_large_region() {
        let arena = Arena::with_max_block_size(1024);
        arena.alloc_str("short");
        assert_eq!(arena.large_allocation_count(), 0);
        let big = "x".repeat(600);
        let stored = arena.alloc_str(&big);
        assert_eq!(stored.len(), 600);
        assert_eq!(arena.large_allocation_count(), 1);
    }

    #[test]
    fn growable_array_keeps_values_across_doubling() {
        let arena = Arena::new();
        let mut items = arena.vec_with_capacity(2);
        let initial_capacity = items.capacity();
        for i in 0..100_i64 {
            items.push(i * 3);
        }
        assert!(items.capacity() > initial_capacity);
        assert_eq!(items.len(), 100);
        for (i, value) in items.iter().enumerate() {
            assert_eq!(*value, i as i64 * 3);
        }
    }

    #[test]
    fn reset_allows_reuse() {
        let mut arena = Arena::with_max_block_size(128);
        for i in 0..64_u64 {
            arena.alloc(i);
        }
        arena.alloc_str(&"y".repeat(100));
        arena.reset();
        assert_eq!(arena.large_allocation_count(), 0);
        let value = arena.alloc(7_u8);
        assert_eq!(*value, 7);
        arena.destroy();
    }
}
