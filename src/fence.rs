//! Standalone fences, and the barrier placement used around emulated
//! accesses.

use core::sync::atomic::{compiler_fence, fence};

use crate::order::{native_order, NativeOrdering, Ordering};

/// Emits a memory barrier between threads without touching any atomic.
///
/// A [`Ordering::Relaxed`] fence orders nothing and is a no-op.
///
/// ```
/// use atomic_storage::{thread_fence, Ordering};
///
/// thread_fence(Ordering::Relaxed);
/// thread_fence(Ordering::SeqCst);
/// ```
#[inline]
pub fn thread_fence(order: Ordering) {
    if order != Ordering::Relaxed {
        fence(native_order(order));
    }
}

/// Emits a barrier that only restricts compiler reordering, ordering accesses
/// between a thread and a signal handler running on that same thread.
///
/// A [`Ordering::Relaxed`] fence orders nothing and is a no-op.
#[inline]
pub fn signal_fence(order: Ordering) {
    if order != Ordering::Relaxed {
        compiler_fence(native_order(order));
    }
}

#[inline]
fn barrier() {
    compiler_fence(NativeOrdering::SeqCst);
}

/// Barrier before a read-modify-write.
#[inline]
pub(crate) fn fence_before(order: Ordering) {
    if order.releases() {
        barrier();
    }
}

/// Barrier after a read-modify-write.
#[inline]
pub(crate) fn fence_after(order: Ordering) {
    if order.acquires() {
        barrier();
    }
}

/// Barrier after a plain load. Consume relies on the data dependency alone.
#[inline]
pub(crate) fn fence_after_load(order: Ordering) {
    if order.acquires() {
        barrier();
    }
}

/// Barrier before a plain store.
#[inline]
pub(crate) fn fence_before_store(order: Ordering) {
    if order.releases() {
        barrier();
    }
}

/// Barrier after a plain store.
#[inline]
pub(crate) fn fence_after_store(order: Ordering) {
    if order.acquires() {
        barrier();
    }
}
