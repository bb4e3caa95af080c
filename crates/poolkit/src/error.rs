//! Error type shared by the registry and pool operations.

/// Error type for pool and registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PoolError {
    /// `init` was called on an already-initialized registry.
    #[error("registry storage already initialized")]
    AlreadyInitialized,

    /// An operation requires an initialized registry.
    #[error("registry storage not initialized")]
    NotInitialized,

    /// `teardown` was called while pools remain open.
    #[error("registry still holds {0} open pool(s)")]
    PoolsOpen(usize),

    /// The backing buffer for a new pool could not be allocated.
    #[error("failed to allocate pool buffer of {0} bytes")]
    OutOfMemory(usize),

    /// No free segment is large enough for the requested size.
    #[error("no free segment can hold {0} bytes")]
    InsufficientSpace(usize),

    /// The pool handle does not refer to an open pool.
    #[error("unknown pool handle")]
    UnknownPool,

    /// The allocation handle does not refer to a live allocation
    /// in this pool (stale, already freed, or never issued).
    #[error("unknown allocation handle")]
    UnknownAllocation,

    /// `close` was called on a pool with outstanding allocations or
    /// fragmented free space.
    #[error("pool is not fully freed and coalesced")]
    NotFreed,
}
