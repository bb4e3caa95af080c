//! Usage counters reported by a pool.

use crate::pool::PlacementPolicy;

/// Snapshot of one pool's usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total buffer size in bytes.
    pub total_size: usize,
    /// Bytes currently allocated.
    pub bytes_allocated: usize,
    /// Number of outstanding allocations.
    pub allocations: usize,
    /// Number of free segments.
    pub free_segments: usize,
    /// Placement policy in effect.
    pub policy: PlacementPolicy,
}
