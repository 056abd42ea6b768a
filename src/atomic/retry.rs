//! Retry loops over a single compare-and-swap primitive.
//!
//! The loops are lock-free but not wait-free: a thread can retry for as long
//! as other threads keep winning the race.

/// A strong compare-and-swap on a raw cell, returning the value observed
/// before the operation. It succeeded iff the returned value equals `old`.
pub(crate) trait RawCas: Copy + PartialEq {
    /// # Safety
    ///
    /// `dst` must be valid, suitably aligned, and only accessed through this
    /// primitive while shared.
    unsafe fn cas(dst: *mut Self, old: Self, new: Self) -> Self;
}

impl RawCas for u128 {
    #[inline]
    unsafe fn cas(dst: *mut Self, old: Self, new: Self) -> Self {
        super::cas128::cas(dst, old, new)
    }
}

/// Replaces the value in `dst` with `f(current)` until the exchange lands,
/// returning the value it replaced. `guess` seeds the first attempt.
///
/// # Safety
///
/// Same contract as [`RawCas::cas`].
#[inline]
pub(crate) unsafe fn update<U: RawCas>(dst: *mut U, guess: U, mut f: impl FnMut(U) -> U) -> U {
    let mut curr = guess;
    loop {
        let prev = U::cas(dst, curr, f(curr));
        if prev == curr {
            return prev;
        }
        curr = prev;
    }
}

/// Like [`update`], but `f` may abort by returning `None`, in which case the
/// observed value is returned as `Err`.
///
/// # Safety
///
/// Same contract as [`RawCas::cas`].
#[inline]
pub(crate) unsafe fn try_update<U: RawCas>(
    dst: *mut U,
    guess: U,
    mut f: impl FnMut(U) -> Option<U>,
) -> Result<U, U> {
    let mut curr = guess;
    loop {
        let new = match f(curr) {
            Some(new) => new,
            None => return Err(curr),
        };
        let prev = U::cas(dst, curr, new);
        if prev == curr {
            return Ok(prev);
        }
        curr = prev;
    }
}
