//! Registry of open pools.
//!
//! A [`PoolRegistry`] is an explicit value, not process-global state:
//! independent registries can coexist (one per test, one per
//! subsystem) and each owns its pools outright. The slot store only
//! ever grows; a closed pool's slot is cleared but never handed out
//! again, so a [`PoolHandle`] needs no generation to stay unambiguous.

use tracing::debug;

use crate::constants::{exceeds_fill_factor, EXPAND_FACTOR, REGISTRY_INIT_CAPACITY};
use crate::error::PoolError;
use crate::pool::{PlacementPolicy, Pool};

/// Handle to an open pool in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    slot: usize,
}

#[derive(Debug)]
struct PoolStore {
    slots: Vec<Option<Pool>>,
    capacity: usize,
}

/// Owner of every open pool, addressed by [`PoolHandle`].
#[derive(Debug, Default)]
pub struct PoolRegistry {
    /// `None` until [`init`](Self::init) and after
    /// [`teardown`](Self::teardown).
    store: Option<PoolStore>,
}

impl PoolRegistry {
    /// Create a registry with no slot storage; call
    /// [`init`](Self::init) before opening pools.
    #[must_use]
    pub fn new() -> Self {
        Self { store: None }
    }

    /// Create the slot storage.
    ///
    /// Fails with [`PoolError::AlreadyInitialized`] if the registry is
    /// already initialized.
    pub fn init(&mut self) -> Result<(), PoolError> {
        if self.store.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }
        self.store = Some(PoolStore {
            slots: Vec::with_capacity(REGISTRY_INIT_CAPACITY),
            capacity: REGISTRY_INIT_CAPACITY,
        });
        debug!("registry initialized");
        Ok(())
    }

    /// Release the slot storage.
    ///
    /// Fails with [`PoolError::NotInitialized`] when there is nothing
    /// to tear down, and with [`PoolError::PoolsOpen`] while any pool
    /// remains open.
    pub fn teardown(&mut self) -> Result<(), PoolError> {
        let store = self.store.as_ref().ok_or(PoolError::NotInitialized)?;
        let open = store.slots.iter().filter(|slot| slot.is_some()).count();
        if open > 0 {
            return Err(PoolError::PoolsOpen(open));
        }
        self.store = None;
        debug!("registry torn down");
        Ok(())
    }

    /// Whether [`init`](Self::init) has been called without a matching
    /// [`teardown`](Self::teardown).
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    /// Number of currently open pools.
    #[must_use]
    pub fn open_pools(&self) -> usize {
        self.store
            .as_ref()
            .map_or(0, |store| store.slots.iter().filter(|slot| slot.is_some()).count())
    }

    /// Open a pool of `size` bytes under the given placement policy.
    ///
    /// The slot store doubles its capacity when occupancy crosses the
    /// fill factor, before the new pool is inserted. A buffer
    /// allocation failure is reported as [`PoolError::OutOfMemory`];
    /// partially constructed state is released on the way out.
    pub fn open(
        &mut self,
        size: usize,
        policy: PlacementPolicy,
    ) -> Result<PoolHandle, PoolError> {
        let store = self.store.as_mut().ok_or(PoolError::NotInitialized)?;

        if exceeds_fill_factor(store.slots.len(), store.capacity) {
            store.capacity *= EXPAND_FACTOR;
            store.slots.reserve_exact(store.capacity - store.slots.len());
        }

        let pool = Pool::new(size, policy)?;
        store.slots.push(Some(pool));
        let handle = PoolHandle {
            slot: store.slots.len() - 1,
        };
        debug!(slot = handle.slot, size, ?policy, "pool opened");
        Ok(handle)
    }

    /// Close the pool behind `handle` and clear its slot.
    ///
    /// Succeeds only when the pool has zero outstanding allocations
    /// and its free space has coalesced back into a single segment;
    /// otherwise fails with [`PoolError::NotFreed`] and leaves the
    /// pool untouched.
    pub fn close(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        let store = self.store.as_mut().ok_or(PoolError::NotInitialized)?;
        let slot = store
            .slots
            .get_mut(handle.slot)
            .ok_or(PoolError::UnknownPool)?;
        let pool = slot.as_ref().ok_or(PoolError::UnknownPool)?;

        if pool.allocations() != 0 || pool.free_segments() != 1 {
            return Err(PoolError::NotFreed);
        }

        // Dropping the pool releases its buffer and tracking
        // structures; the slot index is retired for good.
        *slot = None;
        debug!(slot = handle.slot, "pool closed");
        Ok(())
    }

    /// Shared access to an open pool.
    pub fn pool(&self, handle: PoolHandle) -> Result<&Pool, PoolError> {
        self.store
            .as_ref()
            .ok_or(PoolError::NotInitialized)?
            .slots
            .get(handle.slot)
            .and_then(Option::as_ref)
            .ok_or(PoolError::UnknownPool)
    }

    /// Exclusive access to an open pool.
    pub fn pool_mut(&mut self, handle: PoolHandle) -> Result<&mut Pool, PoolError> {
        self.store
            .as_mut()
            .ok_or(PoolError::NotInitialized)?
            .slots
            .get_mut(handle.slot)
            .and_then(Option::as_mut)
            .ok_or(PoolError::UnknownPool)
    }
}
