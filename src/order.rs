//! The [`Ordering`] enumeration and its translation to native orderings.

pub use core::sync::atomic::Ordering as NativeOrdering;

/// Memory ordering constraint attached to an atomic operation.
///
/// This mirrors the six orderings of the C++20 memory model. Rust has no
/// consume ordering, so [`Ordering::Consume`] is promoted to
/// [`Ordering::Acquire`] when it reaches the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Ordering {
    /// No ordering constraint, only atomicity.
    Relaxed,
    /// Orders later accesses that carry a data dependency on the loaded value.
    Consume,
    /// No later access may be reordered before this operation.
    Acquire,
    /// No earlier access may be reordered after this operation.
    Release,
    /// Both [`Ordering::Acquire`] and [`Ordering::Release`].
    AcqRel,
    /// [`Ordering::AcqRel`], and a single total order shared by every thread.
    #[default]
    SeqCst,
}

use Ordering::*;

/// Translates `order` into the token the core atomic intrinsics expect.
///
/// ```
/// use atomic_storage::{native_order, NativeOrdering, Ordering};
///
/// assert_eq!(native_order(Ordering::Consume), NativeOrdering::Acquire);
/// assert_eq!(native_order(Ordering::SeqCst), NativeOrdering::SeqCst);
/// ```
#[inline]
pub const fn native_order(order: Ordering) -> NativeOrdering {
    match order {
        Relaxed => NativeOrdering::Relaxed,
        Consume | Acquire => NativeOrdering::Acquire,
        Release => NativeOrdering::Release,
        AcqRel => NativeOrdering::AcqRel,
        SeqCst => NativeOrdering::SeqCst,
    }
}

impl Ordering {
    /// The native ordering for a plain store. The acquire half of a requested
    /// ordering has nothing to act on and is dropped.
    #[inline]
    pub const fn for_store(self) -> NativeOrdering {
        match self {
            Relaxed | Consume | Acquire => NativeOrdering::Relaxed,
            Release | AcqRel => NativeOrdering::Release,
            SeqCst => NativeOrdering::SeqCst,
        }
    }

    /// The native ordering for a plain load. The release half of a requested
    /// ordering has nothing to act on and is dropped.
    #[inline]
    pub const fn for_load(self) -> NativeOrdering {
        match self {
            Relaxed | Release => NativeOrdering::Relaxed,
            Consume | Acquire | AcqRel => NativeOrdering::Acquire,
            SeqCst => NativeOrdering::SeqCst,
        }
    }

    /// The native ordering for the load performed by a failed
    /// compare-exchange.
    #[inline]
    pub const fn for_failure(self) -> NativeOrdering {
        self.for_load()
    }

    /// `true` if a barrier is needed before a write-like access.
    #[inline]
    pub(crate) const fn releases(self) -> bool {
        matches!(self, Release | AcqRel | SeqCst)
    }

    /// `true` if a barrier is needed after an access.
    #[inline]
    pub(crate) const fn acquires(self) -> bool {
        matches!(self, Acquire | AcqRel | SeqCst)
    }
}

impl From<Ordering> for NativeOrdering {
    fn from(order: Ordering) -> Self {
        native_order(order)
    }
}
