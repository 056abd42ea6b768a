//! The single platform primitive behind the 16-byte cell: a strong,
//! sequentially consistent, double-width compare-and-swap.
//!
//! Every backend exposes `cas(dst, old, new) -> previous` and
//! `is_lock_free()`. The operation succeeded iff `previous == old`.

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use core::arch::asm;
    #[cfg(not(target_feature = "cmpxchg16b"))]
    use core::sync::atomic::{AtomicU8, Ordering};

    /// `lock cmpxchg16b`. The caller must ensure the CPU supports it.
    #[inline]
    pub(super) unsafe fn cmpxchg16b(dst: *mut u128, old: u128, new: u128) -> u128 {
        let (prev_lo, prev_hi): (u64, u64);
        // rbx is reserved by LLVM, so the low half of `new` is swapped in and
        // the original rbx restored afterwards.
        asm!(
            "xchg {new_lo}, rbx",
            "lock cmpxchg16b xmmword ptr [{dst}]",
            "mov rbx, {new_lo}",
            dst = in(reg) dst,
            new_lo = inout(reg) (new as u64) => _,
            in("rcx") (new >> 64) as u64,
            inout("rax") (old as u64) => prev_lo,
            inout("rdx") ((old >> 64) as u64) => prev_hi,
            options(nostack),
        );
        (prev_lo as u128) | ((prev_hi as u128) << 64)
    }

    #[cfg(target_feature = "cmpxchg16b")]
    #[inline]
    pub(super) fn has_cmpxchg16b() -> bool {
        true
    }

    #[cfg(not(target_feature = "cmpxchg16b"))]
    pub(super) fn has_cmpxchg16b() -> bool {
        const UNKNOWN: u8 = 0;
        const ABSENT: u8 = 1;
        const PRESENT: u8 = 2;
        static CX16: AtomicU8 = AtomicU8::new(UNKNOWN);

        match CX16.load(Ordering::Relaxed) {
            ABSENT => false,
            PRESENT => true,
            _ => {
                // CPUID.01H:ECX.CX16[bit 13]
                #[allow(unused_unsafe)]
                let ecx = unsafe { core::arch::x86_64::__cpuid(1) }.ecx;
                let present = ecx & (1 << 13) != 0;
                CX16.store(if present { PRESENT } else { ABSENT }, Ordering::Relaxed);
                present
            }
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod aarch64 {
    use core::arch::asm;

    /// Exclusive pair loop. A failed comparison still stores the observed
    /// value back, because `ldaxp` alone is not single-copy atomic.
    #[inline]
    pub(super) unsafe fn casp(dst: *mut u128, old: u128, new: u128) -> u128 {
        let (prev_lo, prev_hi): (u64, u64);
        asm!(
            "2:",
            "ldaxp {prev_lo}, {prev_hi}, [{dst}]",
            "cmp {prev_lo}, {old_lo}",
            "ccmp {prev_hi}, {old_hi}, #0, eq",
            "b.ne 3f",
            "stlxp {tmp:w}, {new_lo}, {new_hi}, [{dst}]",
            "cbnz {tmp:w}, 2b",
            "b 4f",
            "3:",
            "stlxp {tmp:w}, {prev_lo}, {prev_hi}, [{dst}]",
            "cbnz {tmp:w}, 2b",
            "4:",
            dst = in(reg) dst,
            old_lo = in(reg) old as u64,
            old_hi = in(reg) (old >> 64) as u64,
            new_lo = in(reg) new as u64,
            new_hi = in(reg) (new >> 64) as u64,
            prev_lo = out(reg) prev_lo,
            prev_hi = out(reg) prev_hi,
            tmp = out(reg) _,
            options(nostack),
        );
        (prev_lo as u128) | ((prev_hi as u128) << 64)
    }
}

/// Striped spinlocks for targets, or CPUs, without a double-width
/// compare-and-swap.
#[cfg_attr(target_arch = "aarch64", allow(dead_code))]
mod lock {
    use core::hint::spin_loop;
    use core::sync::atomic::{fence, AtomicBool, Ordering};

    const STRIPES: usize = 64;

    #[allow(clippy::declare_interior_mutable_const)]
    const UNLOCKED: AtomicBool = AtomicBool::new(false);
    static LOCKS: [AtomicBool; STRIPES] = [UNLOCKED; STRIPES];

    struct Guard(&'static AtomicBool);

    impl Guard {
        fn acquire(addr: usize) -> Self {
            let lock = &LOCKS[(addr >> 4) % STRIPES];
            while lock
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                while lock.load(Ordering::Relaxed) {
                    spin_loop();
                }
            }
            Guard(lock)
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            self.0.store(false, Ordering::Release);
        }
    }

    /// The native paths are full barriers, and the callers only add compiler
    /// fences around them. The fence here keeps SeqCst accesses to cells on
    /// different stripes in a single total order.
    pub(super) unsafe fn cas(dst: *mut u128, old: u128, new: u128) -> u128 {
        let _guard = Guard::acquire(dst as usize);
        fence(Ordering::SeqCst);
        let prev = dst.read();
        if prev == old {
            dst.write(new);
        }
        prev
    }
}

/// Compare-and-swap on 16 bytes, returning the value observed before the
/// operation.
///
/// # Safety
///
/// `dst` must be valid for reads and writes, aligned to 16 bytes, and only
/// ever accessed through this function while shared.
#[inline]
pub(crate) unsafe fn cas(dst: *mut u128, old: u128, new: u128) -> u128 {
    #[cfg(target_arch = "x86_64")]
    {
        if x86_64::has_cmpxchg16b() {
            x86_64::cmpxchg16b(dst, old, new)
        } else {
            lock::cas(dst, old, new)
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        aarch64::casp(dst, old, new)
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        lock::cas(dst, old, new)
    }
}

/// `true` if [`cas`] is a single lock-free instruction sequence on this CPU.
#[inline]
pub(crate) fn is_lock_free() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        x86_64::has_cmpxchg16b()
    }
    #[cfg(target_arch = "aarch64")]
    {
        true
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        false
    }
}
