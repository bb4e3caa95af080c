//! Pool manager: one buffer plus its segment and free-space tracking.
//!
//! A [`Pool`] owns a fixed-size byte buffer and hands out sub-ranges of
//! it. Live ranges are tracked in a segment arena threaded in address
//! order; free ranges are additionally indexed by size so that
//! allocation can pick a candidate without walking the whole table.
//! Freeing a range coalesces it with free neighbors on both sides.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::error::PoolError;
use crate::gap::GapIndex;
use crate::segment::{Segment, SegmentArena};
use crate::stats::PoolStats;

/// Source of pool identities. Handles carry their pool's identity so
/// that a handle presented to the wrong pool is rejected instead of
/// silently resolving to an unrelated segment.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a live allocation inside one pool.
///
/// A handle stays valid across internal growth and is invalidated when
/// its segment is freed or merged away; stale handles fail to resolve
/// rather than aliasing a recycled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocHandle {
    pool: u64,
    slot: usize,
    generation: u64,
}

/// Placement policy for allocation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Take the first free segment in storage order that fits.
    FirstFit,
    /// Take the smallest sufficient free segment; size ties fall to the
    /// lowest buffer offset.
    BestFit,
}

/// One live segment as reported by [`Pool::inspect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentView {
    /// Segment size in bytes.
    pub size: usize,
    /// Whether the segment is currently allocated.
    pub allocated: bool,
}

/// An independently managed buffer with its own segment and gap
/// tracking.
///
/// All operations take `&self`/`&mut self`; exclusive access replaces
/// the serialization the caller would otherwise have to provide.
#[derive(Debug)]
pub struct Pool {
    id: u64,
    buffer: Vec<u8>,
    segments: SegmentArena,
    gaps: GapIndex,
    policy: PlacementPolicy,
    allocations: usize,
    bytes_allocated: usize,
}

impl Pool {
    /// Create a pool with a zero-filled buffer of `total_size` bytes
    /// and a single free segment spanning it.
    ///
    /// The buffer is reserved fallibly: on allocation failure the error
    /// is reported and nothing is leaked.
    pub fn new(total_size: usize, policy: PlacementPolicy) -> Result<Self, PoolError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(total_size)
            .map_err(|_| PoolError::OutOfMemory(total_size))?;
        buffer.resize(total_size, 0);

        let segments = SegmentArena::new(total_size);
        let mut gaps = GapIndex::new();
        gaps.insert(total_size, 0, segments.head());

        debug!(total_size, ?policy, "pool created");
        Ok(Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            buffer,
            segments,
            gaps,
            policy,
            allocations: 0,
            bytes_allocated: 0,
        })
    }

    /// Allocate `size` bytes from the pool.
    ///
    /// Fails with [`PoolError::InsufficientSpace`] when no free segment
    /// is large enough; the pool is left untouched in that case.
    pub fn allocate(&mut self, size: usize) -> Result<AllocHandle, PoolError> {
        if self.gaps.is_empty() {
            return Err(PoolError::InsufficientSpace(size));
        }

        self.segments.grow_if_needed();

        let chosen = match self.policy {
            PlacementPolicy::FirstFit => self.segments.first_fit(size),
            PlacementPolicy::BestFit => self.gaps.first_sufficient(size),
        }
        .ok_or(PoolError::InsufficientSpace(size))?;

        let (offset, original_size) = {
            let segment = self.segments.get(chosen);
            (segment.offset, segment.size)
        };

        self.gaps.remove(original_size, chosen);
        {
            let segment = self.segments.get_mut(chosen);
            segment.allocated = true;
            segment.size = size;
        }

        // Split: the unused tail of the chosen segment becomes a new
        // free segment directly after the allocated one.
        let remainder = original_size - size;
        if remainder > 0 {
            let rest = self.segments.acquire(Segment {
                offset: offset + size,
                size: remainder,
                allocated: false,
                prev: None,
                next: None,
            });
            self.segments.link_after(chosen, rest);
            self.gaps.insert(remainder, offset + size, rest);
        }

        self.allocations += 1;
        self.bytes_allocated += size;
        trace!(offset, size, remainder, "segment allocated");

        Ok(AllocHandle {
            pool: self.id,
            slot: chosen,
            generation: self.segments.generation_of(chosen),
        })
    }

    /// Resolve `handle` against this pool, rejecting handles minted by
    /// other pools as well as stale or freed ones.
    fn resolve(&self, handle: AllocHandle) -> Result<usize, PoolError> {
        if handle.pool != self.id {
            return Err(PoolError::UnknownAllocation);
        }
        self.segments
            .resolve_allocated(handle.slot, handle.generation)
            .ok_or(PoolError::UnknownAllocation)
    }

    /// Free the allocation behind `handle`, coalescing with free
    /// neighbors on both sides.
    ///
    /// Fails with [`PoolError::UnknownAllocation`] for handles that are
    /// stale, already freed, or from another pool; nothing is mutated
    /// in that case.
    pub fn deallocate(&mut self, handle: AllocHandle) -> Result<(), PoolError> {
        let slot = self.resolve(handle)?;

        let freed_size = self.segments.get(slot).size;
        self.segments.get_mut(slot).allocated = false;
        self.allocations -= 1;
        self.bytes_allocated -= freed_size;

        // The freed segment absorbs a free next neighbor, then a free
        // previous neighbor absorbs the result. `survivor` tracks the
        // one record that ends up re-indexed; exactly one gap entry is
        // added no matter how many merges happened.
        let mut survivor = slot;

        if let Some(next) = self.segments.get(survivor).next {
            let (next_is_free, next_size) = {
                let segment = self.segments.get(next);
                (!segment.allocated, segment.size)
            };
            if next_is_free {
                self.gaps.remove(next_size, next);
                self.segments.get_mut(survivor).size += next_size;
                self.segments.unlink(next);
                self.segments.retire(next);
            }
        }

        if let Some(prev) = self.segments.get(survivor).prev {
            let (prev_is_free, prev_size) = {
                let segment = self.segments.get(prev);
                (!segment.allocated, segment.size)
            };
            if prev_is_free {
                self.gaps.remove(prev_size, prev);
                let merged_size = self.segments.get(survivor).size;
                self.segments.get_mut(prev).size += merged_size;
                self.segments.unlink(survivor);
                self.segments.retire(survivor);
                survivor = prev;
            }
        }

        let (size, offset) = {
            let segment = self.segments.get(survivor);
            (segment.size, segment.offset)
        };
        self.gaps.insert(size, offset, survivor);
        trace!(offset, size, freed_size, "segment freed");

        Ok(())
    }

    /// The live segments in address order, covering the whole buffer.
    #[must_use]
    pub fn inspect(&self) -> Vec<SegmentView> {
        let mut views = Vec::with_capacity(self.segments.live_count());
        let mut cursor = Some(self.segments.head());
        while let Some(index) = cursor {
            let segment = self.segments.get(index);
            views.push(SegmentView {
                size: segment.size,
                allocated: segment.allocated,
            });
            cursor = segment.next;
        }
        views
    }

    /// Read access to the bytes of a live allocation.
    pub fn bytes(&self, handle: AllocHandle) -> Result<&[u8], PoolError> {
        let slot = self.resolve(handle)?;
        let segment = self.segments.get(slot);
        Ok(&self.buffer[segment.offset..segment.offset + segment.size])
    }

    /// Write access to the bytes of a live allocation.
    pub fn bytes_mut(&mut self, handle: AllocHandle) -> Result<&mut [u8], PoolError> {
        let slot = self.resolve(handle)?;
        let segment = self.segments.get(slot);
        Ok(&mut self.buffer[segment.offset..segment.offset + segment.size])
    }

    /// Total buffer size in bytes.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes currently allocated.
    #[must_use]
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated
    }

    /// Number of outstanding allocations.
    #[must_use]
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Number of free segments.
    #[must_use]
    pub fn free_segments(&self) -> usize {
        self.gaps.len()
    }

    /// Placement policy in effect.
    #[must_use]
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Snapshot of the pool's usage counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_size: self.total_size(),
            bytes_allocated: self.bytes_allocated,
            allocations: self.allocations,
            free_segments: self.gaps.len(),
            policy: self.policy,
        }
    }
}
