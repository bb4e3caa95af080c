#![no_main]

use libfuzzer_sys::fuzz_target;

use poolkit::{PlacementPolicy, Pool};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let policy = if data[0] & 1 == 0 {
        PlacementPolicy::FirstFit
    } else {
        PlacementPolicy::BestFit
    };
    let mut pool = Pool::new(4096, policy).expect("pool buffer");
    let mut live = Vec::new();

    // Interpret the input as (op, arg) pairs: even ops allocate
    // arg * 8 bytes, odd ops free the arg-th live allocation.
    for chunk in data[1..].chunks_exact(2) {
        let arg = usize::from(chunk[1]);
        if chunk[0] & 1 == 0 {
            if let Ok(handle) = pool.allocate(arg * 8) {
                live.push(handle);
            }
        } else if !live.is_empty() {
            let handle = live.remove(arg % live.len());
            pool.deallocate(handle).expect("freeing a live handle");
        }

        // Tiling and counter invariants after every operation.
        let views = pool.inspect();
        assert_eq!(views.iter().map(|v| v.size).sum::<usize>(), 4096);
        assert_eq!(
            views.iter().filter(|v| !v.allocated).count(),
            pool.free_segments()
        );
        assert_eq!(
            views.iter().filter(|v| v.allocated).count(),
            pool.allocations()
        );
    }
});
