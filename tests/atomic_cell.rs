use std::mem;

use atomic_storage::{atomic::*, AtomicCell};
use bytemuck::{NoUninit, Pod, Zeroable};
use Ordering::{Acquire, AcqRel, Relaxed, Release, SeqCst};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Rgba {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Pair {
    lo: u64,
    hi: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, NoUninit)]
#[repr(u8)]
enum State {
    #[default]
    Idle,
    Busy,
    Closed = 0xc0,
}

#[test]
fn supported() {
    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(transparent)]
    struct I16Wrap(i16);
    #[derive(Clone, Copy, Pod, Zeroable)]
    #[repr(C, align(8))]
    struct U64Align8(u64);

    assert!(AtomicCell::<u8, AtomicU8>::SUPPORTED);
    assert!(AtomicCell::<[u8; 1], AtomicI8>::SUPPORTED);
    assert!(AtomicCell::<I16Wrap, AtomicI16>::SUPPORTED);
    assert!(AtomicCell::<[u8; 2], AtomicU16>::SUPPORTED);
    assert!(AtomicCell::<Rgba, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<f32, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<f64, AtomicU64>::SUPPORTED);
    assert!(AtomicCell::<usize, AtomicUsize>::SUPPORTED);
    assert!(AtomicCell::<Pair, AtomicU128>::SUPPORTED);
    assert!(AtomicCell::<[u32; 4], AtomicU128>::SUPPORTED);

    assert_eq!(mem::size_of::<U64Align8>(), 8);
    assert_eq!(mem::align_of::<U64Align8>(), 8);
    assert!(AtomicCell::<U64Align8, AtomicU64>::SUPPORTED);

    assert!(AtomicCell::<bool, AtomicU8>::SUPPORTED);
    assert!(AtomicCell::<char, AtomicU32>::SUPPORTED);
    assert!(AtomicCell::<State, AtomicI8>::SUPPORTED);

    assert!(!AtomicCell::<u128, AtomicU64>::SUPPORTED);
    assert!(!AtomicCell::<Rgba, AtomicU16>::SUPPORTED);
    assert!(!AtomicCell::<[u8; 3], AtomicU32>::SUPPORTED);
}

#[test]
fn store_load_every_width() {
    let a = AtomicCell::<[u8; 1], AtomicU8>::new([1]);
    a.store([0xfe], SeqCst);
    assert_eq!(a.load(SeqCst), [0xfe]);

    let a = AtomicCell::<[u8; 2], AtomicU16>::new([1, 2]);
    a.store([3, 4], SeqCst);
    assert_eq!(a.load(SeqCst), [3, 4]);

    let a = AtomicCell::<Rgba, AtomicU32>::default();
    assert_eq!(a.load(SeqCst), Rgba { r: 0, g: 0, b: 0, a: 0 });
    a.store(Rgba { r: 1, g: 2, b: 3, a: 4 }, SeqCst);
    assert_eq!(a.load(SeqCst), Rgba { r: 1, g: 2, b: 3, a: 4 });

    let a = AtomicCell::<f64, AtomicU64>::new(0.25);
    a.store(-1.5, SeqCst);
    assert_eq!(a.load(SeqCst), -1.5);

    let a = AtomicCell::<Pair, AtomicU128>::new(Pair { lo: 1, hi: 2 });
    a.store(Pair { lo: u64::MAX, hi: 7 }, SeqCst);
    assert_eq!(a.load(SeqCst), Pair { lo: u64::MAX, hi: 7 });
}

#[test]
fn exchange_returns_previous() {
    let a = AtomicCell::<Pair, AtomicU128>::new(Pair { lo: 1, hi: 2 });
    assert_eq!(a.exchange(Pair { lo: 3, hi: 4 }, AcqRel), Pair { lo: 1, hi: 2 });
    assert_eq!(a.exchange(Pair { lo: 5, hi: 6 }, Relaxed), Pair { lo: 3, hi: 4 });
    assert_eq!(a.into_inner(), Pair { lo: 5, hi: 6 });
}

#[test]
fn compare_exchange_is_bitwise() {
    let a = AtomicCell::<f32, AtomicU32>::new(0.0);

    // -0.0 == 0.0, but the bytes differ
    let mut expected = -0.0f32;
    assert!(!a.compare_exchange_strong(&mut expected, 1.0, AcqRel, Acquire));
    assert_eq!(expected.to_bits(), 0.0f32.to_bits());

    let nan = f32::from_bits(0x7fc0_0000);
    a.store(nan, Release);
    // NaN != NaN, but the bytes match
    assert_eq!(a.compare_exchange(nan, 2.0, SeqCst, SeqCst).map(f32::to_bits), Ok(nan.to_bits()));
    assert_eq!(a.load(Acquire), 2.0);
}

#[test]
fn compare_exchange_failure_reports_actual() {
    let a = AtomicCell::<Pair, AtomicU128>::new(Pair { lo: 10, hi: 20 });

    let mut expected = Pair { lo: 10, hi: 21 };
    assert!(!a.compare_exchange_strong(&mut expected, Pair { lo: 0, hi: 0 }, SeqCst, Relaxed));
    assert_eq!(expected, Pair { lo: 10, hi: 20 });
    assert_eq!(a.load(SeqCst), Pair { lo: 10, hi: 20 });

    assert!(a.compare_exchange_strong(&mut expected, Pair { lo: 0, hi: 0 }, SeqCst, Relaxed));
    assert_eq!(a.load(SeqCst), Pair { lo: 0, hi: 0 });
}

#[test]
fn weak_loop_matches_strong() {
    let weak = AtomicCell::<Rgba, AtomicU32>::new(Rgba { r: 9, g: 9, b: 9, a: 9 });
    let strong = AtomicCell::<Rgba, AtomicU32>::new(Rgba { r: 9, g: 9, b: 9, a: 9 });
    let next = Rgba { r: 1, g: 2, b: 3, a: 4 };

    let mut expected = weak.load(Relaxed);
    while !weak.compare_exchange_weak(&mut expected, next, AcqRel, Relaxed) {}

    let mut expected = strong.load(Relaxed);
    assert!(strong.compare_exchange_strong(&mut expected, next, AcqRel, Relaxed));

    assert_eq!(weak.into_inner(), strong.into_inner());
}

#[test]
fn fetch_update_wide() {
    let a = AtomicCell::<Pair, AtomicU128>::new(Pair { lo: u64::MAX, hi: 0 });
    let carry = |p: Pair| {
        let (lo, overflow) = p.lo.overflowing_add(1);
        Some(Pair { lo, hi: p.hi + overflow as u64 })
    };
    assert_eq!(a.fetch_update(SeqCst, SeqCst, carry), Ok(Pair { lo: u64::MAX, hi: 0 }));
    assert_eq!(a.load(SeqCst), Pair { lo: 0, hi: 1 });
    assert_eq!(a.fetch_update(SeqCst, SeqCst, |_| None), Err(Pair { lo: 0, hi: 1 }));
}

#[test]
fn is_lock_free_is_stable() {
    let narrow = AtomicCell::<Rgba, AtomicU32>::default();
    let wide = AtomicCell::<Pair, AtomicU128>::default();

    assert!(narrow.is_lock_free());
    let first = wide.is_lock_free();
    for _ in 0..16 {
        assert!(narrow.is_lock_free());
        assert_eq!(wide.is_lock_free(), first);
    }
}

#[test]
fn debug_prints_value() {
    let a = AtomicCell::<[u8; 2], AtomicU16>::new([7, 8]);
    assert_eq!(format!("{:?}", a), "[7, 8]");
}

#[test]
fn bool_cell() {
    let a = AtomicCell::<bool, AtomicU8>::new(false);
    assert!(!a.load(Acquire));
    assert!(!a.exchange(true, AcqRel));
    assert_eq!(a.compare_exchange(false, true, SeqCst, SeqCst), Err(true));
    assert_eq!(a.compare_exchange(true, false, SeqCst, SeqCst), Ok(true));
    assert_eq!(a.fetch_update(SeqCst, SeqCst, |v| Some(!v)), Ok(false));
    assert!(a.into_inner());
    assert!(!AtomicCell::<bool, AtomicU8>::default().load(Relaxed));
}

#[test]
fn char_cell() {
    let a = AtomicCell::<char, AtomicU32>::new('a');
    a.store('\u{1f980}', Release);
    assert_eq!(a.load(Acquire), '\u{1f980}');
    let mut expected = 'a';
    assert!(!a.compare_exchange_strong(&mut expected, 'b', AcqRel, Acquire));
    assert_eq!(expected, '\u{1f980}');
}

#[test]
fn enum_cell() {
    let a = AtomicCell::<State, AtomicU8>::default();
    assert_eq!(a.load(SeqCst), State::Idle);

    let mut expected = State::Idle;
    assert!(a.compare_exchange_strong(&mut expected, State::Busy, AcqRel, Acquire));
    assert!(!a.compare_exchange_strong(&mut expected, State::Closed, AcqRel, Acquire));
    assert_eq!(expected, State::Busy);

    assert_eq!(a.exchange(State::Closed, AcqRel), State::Busy);
    assert_eq!(a.load(SeqCst), State::Closed);
    assert_eq!(format!("{:?}", a), "Closed");
}
