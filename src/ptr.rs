//! [`AtomicPointer<T>`], the pointer category.

use core::fmt;
use core::mem::size_of;

use crate::atomic::{AtomicPtr, AtomicStorage, Ordering};

/// A raw pointer which can be safely shared between threads.
///
/// Arithmetic follows pointer arithmetic: [`AtomicPointer::fetch_add`] moves
/// the pointer by whole `T`s, not bytes. The pointer is never dereferenced, so
/// arithmetic wraps instead of requiring the result to stay in bounds.
///
/// ```
/// use atomic_storage::{AtomicPointer, Ordering};
///
/// let mut data = [10u32, 20, 30, 40];
/// let p = AtomicPointer::new(data.as_mut_ptr());
///
/// let prev = p.fetch_add(2, Ordering::AcqRel);
/// assert_eq!(prev, data.as_mut_ptr());
/// assert_eq!(unsafe { *p.load(Ordering::Acquire) }, 30);
/// ```
pub struct AtomicPointer<T> {
    storage: AtomicPtr<T>,
}

impl<T> AtomicPointer<T> {
    /// Creates a new atomic pointer.
    #[inline]
    pub const fn new(p: *mut T) -> Self {
        Self {
            storage: AtomicPtr::new(p),
        }
    }

    /// Consumes the atomic and returns the contained pointer.
    #[inline]
    pub fn into_inner(self) -> *mut T {
        self.storage.into_inner()
    }

    /// Returns a mutable reference to the contained pointer.
    #[inline]
    pub fn get_mut(&mut self) -> &mut *mut T {
        self.storage.get_mut()
    }

    /// Loads the pointer. Release and AcqRel degrade to the load half of the
    /// ordering, see [`Ordering::for_load`].
    #[inline]
    pub fn load(&self, order: Ordering) -> *mut T {
        AtomicStorage::load(&self.storage, order)
    }

    /// Stores `p`. Acquire and AcqRel degrade to the store half of the
    /// ordering, see [`Ordering::for_store`].
    #[inline]
    pub fn store(&self, p: *mut T, order: Ordering) {
        AtomicStorage::store(&self.storage, p, order)
    }

    /// Stores `p`, returning the previous pointer.
    #[inline]
    pub fn exchange(&self, p: *mut T, order: Ordering) -> *mut T {
        AtomicStorage::swap(&self.storage, p, order)
    }

    /// Stores `desired` if the current pointer equals `*expected` and returns
    /// `true`. Otherwise writes the current pointer into `expected` and
    /// returns `false`. Never fails spuriously.
    #[inline]
    pub fn compare_exchange_strong(
        &self,
        expected: &mut *mut T,
        desired: *mut T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        match AtomicStorage::compare_exchange(&self.storage, *expected, desired, success, failure) {
            Ok(_) => true,
            Err(actual) => {
                *expected = actual;
                false
            }
        }
    }

    /// Like [`AtomicPointer::compare_exchange_strong`], but may fail
    /// spuriously.
    #[inline]
    pub fn compare_exchange_weak(
        &self,
        expected: &mut *mut T,
        desired: *mut T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        match AtomicStorage::compare_exchange_weak(&self.storage, *expected, desired, success, failure) {
            Ok(_) => true,
            Err(actual) => {
                *expected = actual;
                false
            }
        }
    }

    /// Stores `new` if the current pointer equals `current`, returning
    /// `Ok(previous)` or `Err(actual)`.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: *mut T,
        new: *mut T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<*mut T, *mut T> {
        AtomicStorage::compare_exchange(&self.storage, current, new, success, failure)
    }

    /// Offsets the pointer by `delta` elements of `T` (`delta * size_of::<T>()`
    /// bytes), returning the previous pointer.
    #[inline]
    pub fn fetch_add(&self, delta: isize, order: Ordering) -> *mut T {
        self.fetch_offset(delta, order)
    }

    /// Offsets the pointer by `-delta` elements of `T`, returning the previous
    /// pointer.
    #[inline]
    pub fn fetch_sub(&self, delta: isize, order: Ordering) -> *mut T {
        self.fetch_offset(delta.wrapping_neg(), order)
    }

    #[inline]
    fn fetch_offset(&self, delta: isize, order: Ordering) -> *mut T {
        let bytes = delta.wrapping_mul(size_of::<T>() as isize);
        let mut prev = AtomicStorage::load(&self.storage, Ordering::Relaxed);
        loop {
            let next = prev.cast::<u8>().wrapping_offset(bytes).cast::<T>();
            match AtomicStorage::compare_exchange_weak(&self.storage, prev, next, order, Ordering::Relaxed) {
                Ok(prev) => return prev,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Fetches the pointer, and applies a function to it that returns an
    /// optional new pointer. Returns `Ok(previous)` if the function returned
    /// `Some(_)`, else `Err(previous)`.
    pub fn fetch_update<F>(&self, set_order: Ordering, fetch_order: Ordering, mut f: F) -> Result<*mut T, *mut T>
    where
        F: FnMut(*mut T) -> Option<*mut T>,
    {
        let mut prev = self.load(fetch_order);
        while let Some(next) = f(prev) {
            match AtomicStorage::compare_exchange_weak(&self.storage, prev, next, set_order, fetch_order) {
                Ok(prev) => return Ok(prev),
                Err(next_prev) => prev = next_prev,
            }
        }
        Err(prev)
    }

    /// `true` if operations on this atomic never take a lock.
    #[inline]
    pub fn is_lock_free(&self) -> bool {
        self.storage.is_lock_free()
    }
}

impl<T> Default for AtomicPointer<T> {
    fn default() -> Self {
        Self::new(core::ptr::null_mut())
    }
}

impl<T> From<*mut T> for AtomicPointer<T> {
    fn from(p: *mut T) -> Self {
        Self::new(p)
    }
}

impl<T> fmt::Debug for AtomicPointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.load(Ordering::SeqCst), f)
    }
}
