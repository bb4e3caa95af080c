//! Integration test walking a pool through split, free, and coalesce.

use poolkit::{PlacementPolicy, PoolRegistry, SegmentView};

fn layout(views: &[SegmentView]) -> Vec<(usize, bool)> {
    views.iter().map(|v| (v.size, v.allocated)).collect()
}

#[test]
fn split_free_and_coalesce_round_trip() {
    let mut registry = PoolRegistry::new();
    registry.init().unwrap();

    let handle = registry.open(1024, PlacementPolicy::FirstFit).unwrap();

    let pool = registry.pool_mut(handle).unwrap();
    let first = pool.allocate(100).unwrap();
    assert_eq!(layout(&pool.inspect()), vec![(100, true), (924, false)]);

    let second = pool.allocate(50).unwrap();
    assert_eq!(
        layout(&pool.inspect()),
        vec![(100, true), (50, true), (874, false)]
    );

    // The 100-byte segment's only neighbor is allocated: no merge.
    pool.deallocate(first).unwrap();
    assert_eq!(
        layout(&pool.inspect()),
        vec![(100, false), (50, true), (874, false)]
    );

    // Both neighbors of the 50-byte segment are free: everything
    // collapses back into one spanning gap.
    pool.deallocate(second).unwrap();
    assert_eq!(layout(&pool.inspect()), vec![(1024, false)]);

    registry.close(handle).unwrap();
    registry.teardown().unwrap();
}

#[test]
fn pool_saturates_at_capacity() {
    let mut registry = PoolRegistry::new();
    registry.init().unwrap();

    let handle = registry.open(10 * 32, PlacementPolicy::BestFit).unwrap();
    let pool = registry.pool_mut(handle).unwrap();

    let handles: Vec<_> = (0..10).map(|_| pool.allocate(32).unwrap()).collect();
    assert!(pool.allocate(32).is_err());
    assert_eq!(pool.bytes_allocated(), 10 * 32);

    for alloc in handles {
        pool.deallocate(alloc).unwrap();
    }
    assert_eq!(layout(&pool.inspect()), vec![(10 * 32, false)]);

    registry.close(handle).unwrap();
    registry.teardown().unwrap();
}

#[test]
fn interleaved_pools_do_not_interact() {
    let mut registry = PoolRegistry::new();
    registry.init().unwrap();

    let left = registry.open(256, PlacementPolicy::FirstFit).unwrap();
    let right = registry.open(256, PlacementPolicy::BestFit).unwrap();

    let in_left = registry.pool_mut(left).unwrap().allocate(64).unwrap();
    let in_right = registry.pool_mut(right).unwrap().allocate(128).unwrap();

    registry.pool_mut(left).unwrap().bytes_mut(in_left).unwrap().fill(0x11);
    registry
        .pool_mut(right)
        .unwrap()
        .bytes_mut(in_right)
        .unwrap()
        .fill(0x22);

    assert_eq!(registry.pool(left).unwrap().bytes(in_left).unwrap(), &[0x11; 64][..]);
    assert_eq!(
        registry.pool(right).unwrap().bytes(in_right).unwrap(),
        &[0x22; 128][..]
    );

    // A handle from one pool is meaningless in the other.
    assert!(registry.pool_mut(right).unwrap().deallocate(in_left).is_err());

    registry.pool_mut(left).unwrap().deallocate(in_left).unwrap();
    registry.pool_mut(right).unwrap().deallocate(in_right).unwrap();
    registry.close(left).unwrap();
    registry.close(right).unwrap();
    registry.teardown().unwrap();
}
