//! The [`AtomicStorage`] trait and the storage cells implementing it.
//!
//! Widths 1 through 8 and pointers are served by the core atomics, which
//! lower to single native instructions. The 16-byte cell, [`AtomicU128`], is
//! built on a double-width compare-and-swap.
#[cfg(target_has_atomic = "16")]
pub use core::sync::atomic::{AtomicI16, AtomicU16};
#[cfg(target_has_atomic = "32")]
pub use core::sync::atomic::{AtomicI32, AtomicU32};
#[cfg(target_has_atomic = "64")]
pub use core::sync::atomic::{AtomicI64, AtomicU64};
#[cfg(target_has_atomic = "8")]
pub use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU8};
#[cfg(target_has_atomic = "ptr")]
pub use core::sync::atomic::{AtomicIsize, AtomicPtr, AtomicUsize};

pub use crate::order::Ordering;

mod cas128;
mod retry;
mod wide;

pub use wide::AtomicU128;

/// A cell of fixed width which can be safely shared between threads.
///
/// Implementations own exactly one storage cell, sized and aligned to
/// `Self::Underlying`. Every operation takes its ordering as an [`Ordering`]
/// and translates it once.
pub trait AtomicStorage: Sized + Send + Sync {
    /// The plain value held by the cell. It has the same size as `Self`.
    type Underlying: Copy + PartialEq;

    /// An underlying value with every bit cleared.
    const ZERO: Self::Underlying;

    /// Creates a new cell holding `v`. This is not an atomic operation.
    fn new(v: Self::Underlying) -> Self;

    /// Consumes the cell and returns the contained value.
    ///
    /// This is safe because passing `self` by value guarantees that no other threads are
    /// concurrently accessing the atomic data.
    fn into_inner(self) -> Self::Underlying;

    /// Returns a mutable reference to the underlying value.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    fn get_mut(&mut self) -> &mut Self::Underlying;

    /// Loads the value. Meaningful orderings are [`Ordering::Relaxed`],
    /// [`Ordering::Consume`], [`Ordering::Acquire`] and [`Ordering::SeqCst`];
    /// the release half of any other ordering is ignored.
    fn load(&self, order: Ordering) -> Self::Underlying;

    /// Stores `val`. Meaningful orderings are [`Ordering::Relaxed`],
    /// [`Ordering::Release`] and [`Ordering::SeqCst`]; the acquire half of
    /// any other ordering is ignored.
    fn store(&self, val: Self::Underlying, order: Ordering);

    /// Stores `val`, returning the previous value. All orderings are allowed.
    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;

    /// Stores `new` if the cell currently holds `current`.
    ///
    /// Returns `Ok(previous)` on success, in which case `previous == current`,
    /// and `Err(actual)` otherwise. `success` orders the read-modify-write,
    /// `failure` orders the load performed when the comparison fails and
    /// must be no stronger than `success`. Never fails spuriously.
    fn compare_exchange(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;

    /// Like [`AtomicStorage::compare_exchange`], but allowed to fail even when
    /// the comparison succeeds. Callers should retry in a loop.
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying>;

    /// `true` if operations on this cell never take a lock. The answer does
    /// not change over the lifetime of the process.
    fn is_lock_free(&self) -> bool;
}

/// Arithmetic and bitwise read-modify-write operations of integral cells.
/// Arithmetic wraps on overflow.
pub trait IntegerStorage: AtomicStorage {
    fn fetch_add(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;
    fn fetch_sub(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;
    fn fetch_and(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;
    fn fetch_or(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;
    fn fetch_xor(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying;
}

/// A wrapper around [`AtomicStorage::compare_exchange`] and [`AtomicStorage::compare_exchange_weak`]
#[inline]
pub fn compare_exchange<A: AtomicStorage, const WEAK: bool>(
    a: &A,
    current: A::Underlying,
    new: A::Underlying,
    success: Ordering,
    failure: Ordering,
) -> Result<A::Underlying, A::Underlying> {
    if WEAK {
        a.compare_exchange_weak(current, new, success, failure)
    } else {
        a.compare_exchange(current, new, success, failure)
    }
}

macro_rules! impl_storage {
    (<$($g:ident)?> $t1:ty, $t2:ty, $z:expr) => {
impl $(<$g>)? AtomicStorage for $t1 {
    type Underlying = $t2;

    const ZERO: Self::Underlying = $z;

    #[inline]
    fn new(val: Self::Underlying) -> Self {
        <$t1>::new(val)
    }

    #[inline]
    fn into_inner(self) -> Self::Underlying {
        <$t1>::into_inner(self)
    }

    #[inline]
    fn get_mut(&mut self) -> &mut Self::Underlying {
        <$t1>::get_mut(self)
    }

    #[inline]
    fn load(&self, order: Ordering) -> Self::Underlying {
        <$t1>::load(self, order.for_load())
    }

    #[inline]
    fn store(&self, val: Self::Underlying, order: Ordering) {
        <$t1>::store(self, val, order.for_store())
    }

    #[inline]
    fn swap(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
        <$t1>::swap(self, val, order.into())
    }

    #[inline]
    fn compare_exchange(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying> {
        <$t1>::compare_exchange(self, current, new, success.into(), failure.for_failure())
    }

    #[inline]
    fn compare_exchange_weak(
        &self,
        current: Self::Underlying,
        new: Self::Underlying,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Underlying, Self::Underlying> {
        <$t1>::compare_exchange_weak(self, current, new, success.into(), failure.for_failure())
    }

    // Core atomics only exist for widths the target supports natively.
    #[inline]
    fn is_lock_free(&self) -> bool {
        true
    }
}
    };
    (<$($g:ident)?> $t1:ty, $t2:ty) => { impl_storage!{<$($g)?> $t1, $t2, 0} };
    ($t1:ty, $t2:ty, $z:expr) => { impl_storage!{<> $t1, $t2, $z} };
    ($t1:ty, $t2:ty) => { impl_storage!{<> $t1, $t2, 0} };
}

macro_rules! impl_integer_storage {
    ($t1:ty) => {
        impl IntegerStorage for $t1 {
            #[inline]
            fn fetch_add(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_add(self, val, order.into())
            }

            #[inline]
            fn fetch_sub(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_sub(self, val, order.into())
            }

            #[inline]
            fn fetch_and(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_and(self, val, order.into())
            }

            #[inline]
            fn fetch_or(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_or(self, val, order.into())
            }

            #[inline]
            fn fetch_xor(&self, val: Self::Underlying, order: Ordering) -> Self::Underlying {
                <$t1>::fetch_xor(self, val, order.into())
            }
        }
    };
}

macro_rules! impl_integers {
    ($width:literal: $($t1:ty => $t2:ty),*) => {
        $(
            #[cfg(target_has_atomic = $width)]
            impl_storage! {$t1, $t2}
            #[cfg(target_has_atomic = $width)]
            impl_integer_storage! {$t1}
        )*
    };
}

impl_integers! {"8": AtomicU8 => u8, AtomicI8 => i8}
impl_integers! {"16": AtomicU16 => u16, AtomicI16 => i16}
impl_integers! {"32": AtomicU32 => u32, AtomicI32 => i32}
impl_integers! {"64": AtomicU64 => u64, AtomicI64 => i64}
impl_integers! {"ptr": AtomicUsize => usize, AtomicIsize => isize}

#[cfg(target_has_atomic = "8")]
impl_storage! {AtomicBool, bool, false}
#[cfg(target_has_atomic = "ptr")]
impl_storage! {<T> AtomicPtr<T>, *mut T, core::ptr::null_mut()}
