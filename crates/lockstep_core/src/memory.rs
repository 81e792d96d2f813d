//! # Scratch Arena
//!
//! Per-iteration scratch budget for the draw path.
//!
//! Drawing code takes short-lived buffers (visible leaf lists, traversal
//! stacks) from the arena instead of allocating freely. The scheduler
//! resets it at the end of every mini-loop iteration, so nothing taken
//! from it may outlive the frame.

use std::cell::Cell;

/// A bump-accounted scratch budget, reset once per loop iteration.
///
/// # Thread Safety
///
/// Not thread-safe. The scheduler is single-threaded.
///
/// # Example
///
/// ```rust
/// use lockstep_core::ScratchArena;
///
/// let arena = ScratchArena::new(1024);
/// let leaves = arena.alloc_vec::<u16>(64).unwrap_or_default();
/// assert!(leaves.capacity() >= 64);
/// arena.reset();
/// assert_eq!(arena.used(), 0);
/// ```
#[derive(Debug)]
pub struct ScratchArena {
    /// Budget in bytes.
    capacity: usize,
    /// Bytes handed out since the last reset.
    offset: Cell<usize>,
    /// Highest `offset` ever reached.
    peak: Cell<usize>,
    /// Requests refused for lack of space.
    refused: Cell<u64>,
}

impl ScratchArena {
    /// Creates an arena with a budget of `capacity` bytes.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Total size in bytes
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            offset: Cell::new(0),
            peak: Cell::new(0),
            refused: Cell::new(0),
        }
    }

    /// Budget in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out since the last reset.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.offset.get()
    }

    /// Bytes still available this iteration.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }

    /// Highest usage seen in any iteration.
    #[inline]
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.get()
    }

    /// Number of requests refused since creation.
    #[inline]
    #[must_use]
    pub fn refused(&self) -> u64 {
        self.refused.get()
    }

    /// Takes an empty buffer with room for `count` elements.
    ///
    /// # Returns
    ///
    /// `None` if the request does not fit in this iteration's budget.
    pub fn alloc_vec<T>(&self, count: usize) -> Option<Vec<T>> {
        if count == 0 {
            return Some(Vec::new());
        }

        let size = std::mem::size_of::<T>().checked_mul(count)?;
        let align = std::mem::align_of::<T>();

        let offset = self.offset.get();
        let aligned = (offset + align - 1) & !(align - 1);
        let end = aligned.checked_add(size)?;

        if end > self.capacity {
            self.refused.set(self.refused.get() + 1);
            tracing::warn!(
                requested = size,
                remaining = self.remaining(),
                "scratch arena over budget"
            );
            return None;
        }

        self.offset.set(end);
        if end > self.peak.get() {
            self.peak.set(end);
        }
        Some(Vec::with_capacity(count))
    }

    /// Releases everything handed out this iteration.
    ///
    /// Returns the number of bytes that were in use.
    #[inline]
    pub fn reset(&self) -> usize {
        self.offset.replace(0)
    }
}
