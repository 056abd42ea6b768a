//! Build-time capability table.
//!
//! Every constant is computed from the target configuration once, at compile
//! time. Downstream code can use them to decide whether a width is available
//! at all and whether it is guaranteed to be lock-free.

/// How lock-free a given width is on the current target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockFree {
    /// Operations of this width are never lock-free (or not provided).
    Never,
    /// Lock-freedom is decided at runtime, e.g. by a CPU feature check.
    Sometimes,
    /// Operations of this width are always lock-free.
    Always,
}

impl LockFree {
    const fn from_cfg(has: bool) -> Self {
        if has {
            LockFree::Always
        } else {
            LockFree::Never
        }
    }
}

pub const BOOL_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "8"));
pub const INT8_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "8"));
pub const INT16_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "16"));
pub const INT32_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "32"));
pub const INT64_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "64"));
pub const POINTER_LOCK_FREE: LockFree = LockFree::from_cfg(cfg!(target_has_atomic = "ptr"));

/// The 16-byte cell is always available; it is lock-free when the target has
/// a double-width compare-and-swap.
pub const INT128_LOCK_FREE: LockFree = if cfg!(target_arch = "aarch64")
    || cfg!(all(target_arch = "x86_64", target_feature = "cmpxchg16b"))
{
    LockFree::Always
} else if cfg!(target_arch = "x86_64") {
    LockFree::Sometimes
} else {
    LockFree::Never
};

pub const THREAD_FENCE: LockFree = LockFree::Always;
pub const SIGNAL_FENCE: LockFree = LockFree::Always;

/// Capability for a storage cell of `size` bytes.
///
/// ```
/// use atomic_storage::caps::{lock_free_for_size, LockFree, INT32_LOCK_FREE};
///
/// assert_eq!(lock_free_for_size(4), INT32_LOCK_FREE);
/// assert_eq!(lock_free_for_size(3), LockFree::Never);
/// ```
pub const fn lock_free_for_size(size: usize) -> LockFree {
    match size {
        1 => INT8_LOCK_FREE,
        2 => INT16_LOCK_FREE,
        4 => INT32_LOCK_FREE,
        8 => INT64_LOCK_FREE,
        16 => INT128_LOCK_FREE,
        _ => LockFree::Never,
    }
}
