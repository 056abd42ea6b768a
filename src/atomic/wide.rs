//! [`AtomicU128`], the 16-byte storage cell built on a double-width
//! compare-and-swap.

use core::cell::UnsafeCell;

use super::retry::{self, RawCas};
use super::{AtomicStorage, IntegerStorage, Ordering};
use crate::fence::{fence_after, fence_after_load, fence_after_store, fence_before, fence_before_store};

/// A 16-byte integer which can be safely shared between threads.
///
/// This type has the same in-memory representation as a [`u128`], but is
/// always aligned to 16 bytes. Every operation is realized through one
/// double-width compare-and-swap, bracketed by barriers chosen from the
/// requested [`Ordering`].
///
/// Loads are compare-and-swaps of the cell against itself. They are writes
/// as far as the hardware is concerned, so a load needs the cell to live in
/// writable memory and takes part in the same total order as the stores.
///
/// ```
/// use atomic_storage::atomic::{AtomicStorage, AtomicU128, Ordering};
///
/// let a = AtomicU128::new(u128::MAX - 1);
/// a.store(u128::MAX, Ordering::Release);
/// assert_eq!(a.load(Ordering::Acquire), u128::MAX);
/// ```
#[repr(C, align(16))]
pub struct AtomicU128 {
    v: UnsafeCell<u128>,
}

// Every shared access goes through `cas128`.
unsafe impl Sync for AtomicU128 {}

impl AtomicU128 {
    /// Creates a new `AtomicU128`.
    #[inline]
    pub const fn new(v: u128) -> Self {
        AtomicU128 { v: UnsafeCell::new(v) }
    }

    #[inline]
    fn ptr(&self) -> *mut u128 {
        self.v.get()
    }

    #[inline]
    fn load_raw(&self) -> u128 {
        // This is safe because `self.v` is aligned and only shared through `cas128`
        unsafe { u128::cas(self.ptr(), 0, 0) }
    }

    /// Applies `f` to the current value until the exchange succeeds, returning
    /// the previous value.
    #[inline]
    fn rmw(&self, order: Ordering, f: impl FnMut(u128) -> u128) -> u128 {
        fence_before(order);
        // This is safe because `self.v` is aligned and only shared through `cas128`
        let prev = unsafe { retry::update(self.ptr(), self.load_raw(), f) };
        fence_after(order);
        prev
    }

    /// Fetches the value and applies `f` to it until the exchange succeeds or
    /// `f` returns `None`.
    pub fn fetch_update(
        &self,
        set_order: Ordering,
        fetch_order: Ordering,
        f: impl FnMut(u128) -> Option<u128>,
    ) -> Result<u128, u128> {
        fence_before(set_order);
        // This is safe because `self.v` is aligned and only shared through `cas128`
        let res = unsafe { retry::try_update(self.ptr(), self.load_raw(), f) };
        match res {
            Ok(_) => fence_after(set_order),
            Err(_) => fence_after_load(fetch_order),
        }
        res
    }
}

impl Default for AtomicU128 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<u128> for AtomicU128 {
    fn from(v: u128) -> Self {
        Self::new(v)
    }
}

impl core::fmt::Debug for AtomicU128 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.load(Ordering::SeqCst).fmt(f)
    }
}

impl AtomicStorage for AtomicU128 {
    type Underlying = u128;

    const ZERO: Self::Underlying = 0;

    #[inline]
    fn new(v: u128) -> Self {
        AtomicU128::new(v)
    }

    #[inline]
    fn into_inner(self) -> u128 {
        self.v.into_inner()
    }

    #[inline]
    fn get_mut(&mut self) -> &mut u128 {
        self.v.get_mut()
    }

    #[inline]
    fn load(&self, order: Ordering) -> u128 {
        let v = self.load_raw();
        fence_after_load(order);
        v
    }

    #[inline]
    fn store(&self, val: u128, order: Ordering) {
        fence_before_store(order);
        // This is safe because `self.v` is aligned and only shared through `cas128`
        unsafe { retry::update(self.ptr(), val, |_| val) };
        fence_after_store(order);
    }

    #[inline]
    fn swap(&self, val: u128, order: Ordering) -> u128 {
        fence_before(order);
        // This is safe because `self.v` is aligned and only shared through `cas128`
        let prev = unsafe { retry::update(self.ptr(), val, |_| val) };
        fence_after(order);
        prev
    }

    #[inline]
    fn compare_exchange(
        &self,
        current: u128,
        new: u128,
        success: Ordering,
        failure: Ordering,
    ) -> Result<u128, u128> {
        fence_before(success);
        // This is safe because `self.v` is aligned and only shared through `cas128`
        let prev = unsafe { u128::cas(self.ptr(), current, new) };
        if prev == current {
            fence_after(success);
            Ok(prev)
        } else {
            fence_after(failure);
            Err(prev)
        }
    }

    #[inline]
    fn compare_exchange_weak(
        &self,
        current: u128,
        new: u128,
        success: Ordering,
        failure: Ordering,
    ) -> Result<u128, u128> {
        self.compare_exchange(current, new, success, failure)
    }

    #[inline]
    fn is_lock_free(&self) -> bool {
        super::cas128::is_lock_free()
    }
}

impl IntegerStorage for AtomicU128 {
    #[inline]
    fn fetch_add(&self, val: u128, order: Ordering) -> u128 {
        self.rmw(order, |v| v.wrapping_add(val))
    }

    #[inline]
    fn fetch_sub(&self, val: u128, order: Ordering) -> u128 {
        self.rmw(order, |v| v.wrapping_sub(val))
    }

    #[inline]
    fn fetch_and(&self, val: u128, order: Ordering) -> u128 {
        self.rmw(order, |v| v & val)
    }

    #[inline]
    fn fetch_or(&self, val: u128, order: Ordering) -> u128 {
        self.rmw(order, |v| v | val)
    }

    #[inline]
    fn fetch_xor(&self, val: u128, order: Ordering) -> u128 {
        self.rmw(order, |v| v ^ val)
    }
}
