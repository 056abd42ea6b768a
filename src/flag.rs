//! [`AtomicFlag`], a test-and-set flag.

use crate::atomic::{AtomicBool, AtomicStorage, Ordering};

/// A boolean flag which can only be set and cleared.
///
/// This is the minimal lock-free primitive: it is available wherever
/// [`caps::BOOL_LOCK_FREE`](crate::caps::BOOL_LOCK_FREE) is not `Never`.
///
/// ```
/// use atomic_storage::{AtomicFlag, Ordering};
///
/// let flag = AtomicFlag::new();
/// assert!(!flag.test_and_set(Ordering::Acquire));
/// assert!(flag.test_and_set(Ordering::Acquire));
/// flag.clear(Ordering::Release);
/// assert!(!flag.test_and_set(Ordering::Acquire));
/// ```
#[derive(Default)]
pub struct AtomicFlag {
    v: AtomicBool,
}

impl AtomicFlag {
    /// Creates a cleared flag.
    #[inline]
    pub const fn new() -> Self {
        AtomicFlag {
            v: AtomicBool::new(false),
        }
    }

    /// Sets the flag, returning whether it was already set.
    #[inline]
    pub fn test_and_set(&self, order: Ordering) -> bool {
        AtomicStorage::swap(&self.v, true, order)
    }

    /// Clears the flag. Meaningful orderings are [`Ordering::Relaxed`],
    /// [`Ordering::Release`] and [`Ordering::SeqCst`].
    #[inline]
    pub fn clear(&self, order: Ordering) {
        AtomicStorage::store(&self.v, false, order)
    }

    /// `true` if operations on this flag never take a lock.
    #[inline]
    pub fn is_lock_free(&self) -> bool {
        AtomicStorage::is_lock_free(&self.v)
    }
}

impl core::fmt::Debug for AtomicFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicFlag")
            .field(&AtomicStorage::load(&self.v, Ordering::SeqCst))
            .finish()
    }
}
