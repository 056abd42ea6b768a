use std::sync::{Arc, Barrier};
use std::thread;

use atomic_storage::caps::{self, LockFree};
use atomic_storage::{
    atomic::{AtomicStorage, AtomicU128}, signal_fence, thread_fence, Atomic, AtomicCell, AtomicFlag, Ordering::*,
};

const ROUNDS: usize = 2_000;

#[test]
fn message_passing() {
    for _ in 0..ROUNDS {
        let payload = Arc::new(Atomic::new(0u64));
        let flag = Arc::new(Atomic::new(0u8));

        let writer = {
            let (payload, flag) = (payload.clone(), flag.clone());
            thread::spawn(move || {
                payload.store(42, Release);
                flag.store(1, SeqCst);
            })
        };

        loop {
            if flag.load(Acquire) == 1 {
                assert_eq!(payload.load(Relaxed), 42);
                break;
            }
            std::hint::spin_loop();
        }
        writer.join().unwrap();
    }
}

#[test]
fn message_passing_wide_payload() {
    for _ in 0..ROUNDS / 4 {
        let payload = Arc::new(AtomicCell::<[u64; 2], AtomicU128>::new([0, 0]));
        let flag = Arc::new(Atomic::new(0u32));

        let writer = {
            let (payload, flag) = (payload.clone(), flag.clone());
            thread::spawn(move || {
                payload.store([7, 9], Release);
                flag.store(1, Release);
            })
        };

        while flag.load(Acquire) == 0 {
            std::hint::spin_loop();
        }
        assert_eq!(payload.load(Relaxed), [7, 9]);
        writer.join().unwrap();
    }
}

#[test]
fn message_passing_through_fences() {
    for _ in 0..ROUNDS {
        let payload = Arc::new(Atomic::new(0u32));
        let flag = Arc::new(Atomic::new(0u32));

        let writer = {
            let (payload, flag) = (payload.clone(), flag.clone());
            thread::spawn(move || {
                payload.store(5, Relaxed);
                thread_fence(Release);
                flag.store(1, Relaxed);
            })
        };

        while flag.load(Relaxed) == 0 {
            std::hint::spin_loop();
        }
        thread_fence(Acquire);
        assert_eq!(payload.load(Relaxed), 5);
        writer.join().unwrap();
    }
}

#[test]
fn store_buffering_wide_is_sequentially_consistent() {
    // Each thread stores to one cell, then loads the other. Under SeqCst at
    // least one of them must see the other's store.
    let x = Arc::new(AtomicU128::new(0));
    let y = Arc::new(AtomicU128::new(0));
    let start = Arc::new(Barrier::new(2));
    let done = Arc::new(Barrier::new(2));

    let other = {
        let (x, y, start, done) = (x.clone(), y.clone(), start.clone(), done.clone());
        thread::spawn(move || {
            let mut seen = Vec::with_capacity(ROUNDS);
            for round in 1..=ROUNDS as u128 {
                start.wait();
                y.store(round, SeqCst);
                seen.push(x.load(SeqCst));
                done.wait();
            }
            seen
        })
    };

    let mut seen = Vec::with_capacity(ROUNDS);
    for round in 1..=ROUNDS as u128 {
        start.wait();
        x.store(round, SeqCst);
        seen.push(y.load(SeqCst));
        done.wait();
    }
    let theirs = other.join().unwrap();

    for (round, (mine, theirs)) in (1..=ROUNDS as u128).zip(seen.into_iter().zip(theirs)) {
        assert!(
            mine == round || theirs == round,
            "round {round}: both loads missed the other store ({mine}, {theirs})",
        );
    }
}

#[test]
fn relaxed_fences_are_no_ops() {
    thread_fence(Relaxed);
    signal_fence(Relaxed);
    for order in [Consume, Acquire, Release, AcqRel, SeqCst] {
        thread_fence(order);
        signal_fence(order);
    }
}

#[test]
fn flag_is_a_spinlock() {
    let flag = Arc::new(AtomicFlag::new());
    let counter = Arc::new(Atomic::new(0u64));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let (flag, counter) = (flag.clone(), counter.clone());
            thread::spawn(move || {
                for _ in 0..5_000 {
                    while flag.test_and_set(Acquire) {
                        std::hint::spin_loop();
                    }
                    // Non-atomic read-modify-write guarded by the flag.
                    let v = counter.load(Relaxed);
                    counter.store(v + 1, Relaxed);
                    flag.clear(Release);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(counter.load(SeqCst), 20_000);
    assert!(flag.is_lock_free());
}

#[test]
fn capability_table() {
    assert_eq!(caps::INT32_LOCK_FREE, LockFree::Always);
    assert_eq!(caps::POINTER_LOCK_FREE, LockFree::Always);
    assert_eq!(caps::lock_free_for_size(8), caps::INT64_LOCK_FREE);
    assert_eq!(caps::lock_free_for_size(16), caps::INT128_LOCK_FREE);
    assert_eq!(caps::lock_free_for_size(0), LockFree::Never);
    assert_eq!(caps::THREAD_FENCE, LockFree::Always);
    assert!(LockFree::Never < LockFree::Sometimes && LockFree::Sometimes < LockFree::Always);

    let wide = Atomic::new(0u128);
    if caps::INT128_LOCK_FREE == LockFree::Always {
        assert!(wide.is_lock_free());
    }
}
