//! # poolkit
//!
//! User-space memory-pool allocator: a registry of independently-sized
//! pools, each handing out byte ranges of one owned buffer without
//! touching the system allocator per request. Free ranges coalesce on
//! deallocation; placement is first-fit or best-fit per pool.
//!
//! Handles are stable indices, never addresses: growing the internal
//! tables cannot invalidate them. All types are single-caller by
//! contract — wrap a pool or registry in your own lock to share it.
//!
//! # Example
//! ```
//! use poolkit::{PlacementPolicy, PoolRegistry};
//!
//! let mut registry = PoolRegistry::new();
//! registry.init()?;
//!
//! let pool = registry.open(1024, PlacementPolicy::FirstFit)?;
//! let block = registry.pool_mut(pool)?.allocate(128)?;
//! registry.pool_mut(pool)?.bytes_mut(block)?.fill(0xA5);
//!
//! registry.pool_mut(pool)?.deallocate(block)?;
//! registry.close(pool)?;
//! registry.teardown()?;
//! # Ok::<(), poolkit::PoolError>(())
//! ```
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub(crate) mod gap;
pub mod pool;
pub mod registry;
pub(crate) mod segment;
pub mod stats;

// Re-exports
pub use error::PoolError;
pub use pool::{AllocHandle, PlacementPolicy, Pool, SegmentView};
pub use registry::{PoolHandle, PoolRegistry};
pub use stats::PoolStats;
