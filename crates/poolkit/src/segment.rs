//! Segment arena: stable-slot storage for a pool's segment records.
//!
//! Segments live in an arena addressed by slot index, so growth never
//! invalidates a handle the way a moved array element would. Vacant
//! slots are recycled through an intrusive reuse list and carry a
//! generation counter that is bumped on retirement, which lets stale
//! handles be rejected instead of resolving to a recycled record.

use crate::constants::{exceeds_fill_factor, EXPAND_FACTOR, SEGMENT_ARENA_INIT_CAPACITY};

/// One contiguous byte range of a pool's buffer.
///
/// `prev`/`next` thread the live segments in address order; the segment
/// at offset 0 has `prev == None` and the segment ending at the buffer
/// end has `next == None`.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub offset: usize,
    pub size: usize,
    pub allocated: bool,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    segment: Option<Segment>,
    /// Reuse-list link; meaningful only while the slot is vacant.
    next_free: Option<usize>,
}

/// Growable arena of segment records with a vacant-slot reuse list.
#[derive(Debug)]
pub(crate) struct SegmentArena {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    live: usize,
    capacity: usize,
    /// Slot of the segment at offset 0. That record is never merged
    /// away (merging always retires the record with a lower-address
    /// free neighbor), so the address-order walk can start here.
    head: usize,
}

impl SegmentArena {
    /// Create an arena seeded with a single free segment spanning
    /// `[0, total_size)`.
    pub fn new(total_size: usize) -> Self {
        let mut arena = Self {
            slots: Vec::with_capacity(SEGMENT_ARENA_INIT_CAPACITY),
            free_head: None,
            live: 0,
            capacity: SEGMENT_ARENA_INIT_CAPACITY,
            head: 0,
        };
        arena.head = arena.acquire(Segment {
            offset: 0,
            size: total_size,
            allocated: false,
            prev: None,
            next: None,
        });
        arena
    }

    /// Number of live segment records.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Slot of the segment at offset 0.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Double capacity once occupancy crosses the fill factor.
    ///
    /// Called before every allocation so that the split path can take a
    /// slot without further checks.
    pub fn grow_if_needed(&mut self) {
        if exceeds_fill_factor(self.live, self.capacity) {
            self.capacity *= EXPAND_FACTOR;
            self.slots.reserve_exact(self.capacity - self.slots.len());
        }
    }

    /// Place `segment` in a vacant slot, reusing a retired one if any.
    pub fn acquire(&mut self, segment: Segment) -> usize {
        self.live += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index];
                self.free_head = slot.next_free.take();
                slot.segment = Some(segment);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    segment: Some(segment),
                    next_free: None,
                });
                self.slots.len() - 1
            }
        }
    }

    /// Vacate `index` and push it on the reuse list. The generation bump
    /// invalidates any handle still pointing at the old record.
    pub fn retire(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        debug_assert!(slot.segment.is_some(), "retiring a vacant slot");
        slot.segment = None;
        slot.generation += 1;
        slot.next_free = self.free_head;
        self.free_head = Some(index);
        self.live -= 1;
    }

    /// Shared access to the live segment at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant; callers hold live indices only.
    pub fn get(&self, index: usize) -> &Segment {
        self.slots[index]
            .segment
            .as_ref()
            .expect("segment slot unexpectedly vacant")
    }

    /// Exclusive access to the live segment at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant; callers hold live indices only.
    pub fn get_mut(&mut self, index: usize) -> &mut Segment {
        self.slots[index]
            .segment
            .as_mut()
            .expect("segment slot unexpectedly vacant")
    }

    /// Current generation of the slot at `index`.
    pub fn generation_of(&self, index: usize) -> u64 {
        self.slots[index].generation
    }

    /// Resolve a (slot, generation) pair to its slot index.
    ///
    /// Returns `None` for out-of-range slots, stale generations, vacant
    /// slots, and segments that are not currently allocated — so freed
    /// and merged-away handles both fail here.
    pub fn resolve_allocated(&self, index: usize, generation: u64) -> Option<usize> {
        let slot = self.slots.get(index)?;
        if slot.generation != generation {
            return None;
        }
        let segment = slot.segment.as_ref()?;
        segment.allocated.then_some(index)
    }

    /// First free segment in storage (slot) order with `size >= want`.
    ///
    /// Storage order is the arena's slot order, not address order; a
    /// recycled low slot is considered before a fresh high one.
    pub fn first_fit(&self, want: usize) -> Option<usize> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let segment = slot.segment.as_ref()?;
            (!segment.allocated && segment.size >= want).then_some(index)
        })
    }

    /// Link the segment at `follower` immediately after `anchor` in
    /// address order.
    pub fn link_after(&mut self, anchor: usize, follower: usize) {
        let anchor_next = self.get(anchor).next;
        if let Some(next) = anchor_next {
            self.get_mut(next).prev = Some(follower);
        }
        {
            let segment = self.get_mut(follower);
            segment.prev = Some(anchor);
            segment.next = anchor_next;
        }
        self.get_mut(anchor).next = Some(follower);
    }

    /// Splice the segment at `index` out of the address-order links.
    pub fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let segment = self.get(index);
            (segment.prev, segment.next)
        };
        if let Some(prev) = prev {
            self.get_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.get_mut(next).prev = prev;
        }
        let segment = self.get_mut(index);
        segment.prev = None;
        segment.next = None;
    }
}
