#![no_main]

use libfuzzer_sys::fuzz_target;

use poolkit::{PlacementPolicy, Pool};

fuzz_target!(|data: &[u8]| {
    // Free handles in arbitrary order, replaying some of them: every
    // replay must be rejected without panicking or corrupting state.
    let mut pool = Pool::new(2048, PlacementPolicy::BestFit).expect("pool buffer");

    let mut handles = Vec::new();
    for _ in 0..16 {
        match pool.allocate(64) {
            Ok(handle) => handles.push(handle),
            Err(_) => break,
        }
    }

    let mut freed = vec![false; handles.len()];
    for &byte in data {
        let at = usize::from(byte) % handles.len();
        let result = pool.deallocate(handles[at]);
        assert_eq!(result.is_ok(), !freed[at]);
        freed[at] = true;

        let views = pool.inspect();
        assert_eq!(views.iter().map(|v| v.size).sum::<usize>(), 2048);
    }
});
