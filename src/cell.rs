//! [`AtomicCell<T, S>`], the generic category.

use core::{
    fmt,
    marker::PhantomData,
    mem::{size_of, MaybeUninit},
    ptr,
};

use bytemuck::{NoUninit, Pod};
use const_panic::concat_assert;

use crate::atomic::{compare_exchange, AtomicStorage, Ordering};

/// A value without uninitialized bytes which can be safely shared between
/// threads.
///
/// The value is copied byte for byte into the storage cell `S`, whose
/// underlying integer must have exactly the size of `T`. Any [`NoUninit`]
/// type qualifies, so `bool`, `char` and fieldless `#[repr(u8)]` enums work
/// alongside plain-old-data structs. Comparisons in
/// [`AtomicCell::compare_exchange_strong`] and friends are bitwise, not
/// [`PartialEq`].
///
/// # Examples
///
/// ```
/// use atomic_storage::{atomic::AtomicU64, AtomicCell, Ordering};
/// use bytemuck::{Pod, Zeroable};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let a = AtomicCell::<_, AtomicU64>::new(Point { x: 1, y: 2 });
/// let old = a.exchange(Point { x: 3, y: 4 }, Ordering::AcqRel);
/// assert_eq!(old, Point { x: 1, y: 2 });
/// assert_eq!(a.load(Ordering::Acquire), Point { x: 3, y: 4 });
/// ```
///
/// A `#[repr(u8)]` enum fits in an `AtomicU8`:
///
/// ```
/// use atomic_storage::{atomic::AtomicU8, AtomicCell, Ordering::*};
/// use bytemuck::NoUninit;
///
/// #[derive(Clone, Copy, Debug, PartialEq, NoUninit)]
/// #[repr(u8)]
/// enum Phase {
///     Idle,
///     Running,
///     Done,
/// }
///
/// let a = AtomicCell::<_, AtomicU8>::new(Phase::Idle);
/// assert_eq!(a.compare_exchange(Phase::Idle, Phase::Running, AcqRel, Acquire), Ok(Phase::Idle));
/// assert_eq!(a.exchange(Phase::Done, AcqRel), Phase::Running);
/// ```
///
/// # Panics
///
/// Using a storage whose size differs from `T` fails to compile.
///
/// ```compile_fail
/// use atomic_storage::{atomic::AtomicU32, AtomicCell};
///
/// let a = AtomicCell::<u64, AtomicU32>::new(7);
/// ```
pub struct AtomicCell<T, S: AtomicStorage> {
    storage: S,
    _marker: PhantomData<T>,
}

impl<T: NoUninit, S: AtomicStorage> AtomicCell<T, S>
where
    S::Underlying: Pod,
{
    const SIZE: usize = size_of::<T>();
    const UNDERLYING_SIZE: usize = size_of::<S::Underlying>();

    /// `true` if the storage can hold `T`.
    pub const SUPPORTED: bool = Self::SIZE == Self::UNDERLYING_SIZE;

    /// Panics at compile-time if `!SUPPORTED`
    pub const ASSERT_SUPPORTED: () = Self::assert_size_matches();

    const fn assert_size_matches() {
        concat_assert!(
            Self::SUPPORTED,
            "type ",
            type_name::<T>("T"),
            " (size=",
            Self::SIZE,
            ") does not match storage ",
            type_name::<S>("S"),
            " (size=",
            Self::UNDERLYING_SIZE,
            ")",
        );
    }

    #[inline]
    fn into_underlying(val: T) -> S::Underlying {
        let mut raw = S::ZERO;
        bytemuck::bytes_of_mut(&mut raw).copy_from_slice(bytemuck::bytes_of(&val));
        raw
    }

    /// `raw` must have been produced by [`Self::into_underlying`]. The storage
    /// is private and only ever written from a `T`, so every value read back
    /// out of it qualifies.
    #[inline]
    fn from_underlying(raw: S::Underlying) -> T {
        let bytes = bytemuck::bytes_of(&raw);
        let mut val = MaybeUninit::<T>::uninit();
        // SAFETY: the sizes match (`ASSERT_SUPPORTED`, checked in `new`) and
        // the bytes are those of a valid `T`.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), val.as_mut_ptr().cast::<u8>(), Self::SIZE);
            val.assume_init()
        }
    }

    /// Creates a new atomic cell initialized with `val`.
    #[inline]
    pub fn new(val: T) -> Self {
        let () = Self::ASSERT_SUPPORTED;
        Self {
            storage: S::new(Self::into_underlying(val)),
            _marker: PhantomData,
        }
    }

    /// Consumes the atomic and returns the contained value.
    #[inline]
    pub fn into_inner(self) -> T {
        Self::from_underlying(self.storage.into_inner())
    }

    /// Loads the value. Release and AcqRel degrade to the load half of the
    /// ordering, see [`Ordering::for_load`].
    #[inline]
    pub fn load(&self, order: Ordering) -> T {
        Self::from_underlying(self.storage.load(order))
    }

    /// Stores `val`. Acquire and AcqRel degrade to the store half of the
    /// ordering, see [`Ordering::for_store`].
    #[inline]
    pub fn store(&self, val: T, order: Ordering) {
        self.storage.store(Self::into_underlying(val), order)
    }

    /// Stores `val` into the atomic cell and returns the previous value.
    #[inline]
    pub fn exchange(&self, val: T, order: Ordering) -> T {
        Self::from_underlying(self.storage.swap(Self::into_underlying(val), order))
    }

    #[inline]
    fn compare_exchange_raw<const WEAK: bool>(
        &self,
        expected: &mut T,
        desired: T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        match compare_exchange::<S, WEAK>(
            &self.storage,
            Self::into_underlying(*expected),
            Self::into_underlying(desired),
            success,
            failure,
        ) {
            Ok(_) => true,
            Err(actual) => {
                *expected = Self::from_underlying(actual);
                false
            }
        }
    }

    /// If the cell holds the same bytes as `*expected`, stores `desired` and
    /// returns `true`. Otherwise copies the current value into `expected` and
    /// returns `false`. Never fails spuriously.
    ///
    /// ```
    /// use atomic_storage::{atomic::AtomicU32, AtomicCell, Ordering::*};
    ///
    /// let a = AtomicCell::<f32, AtomicU32>::new(1.5);
    ///
    /// let mut expected = 2.0;
    /// assert!(!a.compare_exchange_strong(&mut expected, 3.0, AcqRel, Acquire));
    /// assert_eq!(expected, 1.5);
    /// assert!(a.compare_exchange_strong(&mut expected, 3.0, AcqRel, Acquire));
    /// assert_eq!(a.load(SeqCst), 3.0);
    /// ```
    #[inline]
    pub fn compare_exchange_strong(
        &self,
        expected: &mut T,
        desired: T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        self.compare_exchange_raw::<false>(expected, desired, success, failure)
    }

    /// Like [`AtomicCell::compare_exchange_strong`], but may fail spuriously.
    #[inline]
    pub fn compare_exchange_weak(
        &self,
        expected: &mut T,
        desired: T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        self.compare_exchange_raw::<true>(expected, desired, success, failure)
    }

    /// Stores `new` if the cell holds the same bytes as `current`, returning
    /// `Ok(previous)` or `Err(actual)`.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: T,
        new: T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<T, T> {
        let mut expected = current;
        if self.compare_exchange_strong(&mut expected, new, success, failure) {
            Ok(current)
        } else {
            Err(expected)
        }
    }

    /// Fetches the value, and applies a function to it that returns an optional
    /// new value. Returns a `Result` of `Ok(previous_value)` if the function
    /// returned `Some(_)`, else `Err(previous_value)`.
    ///
    /// Note: This may call the function multiple times if the value has been
    /// changed from other threads in the meantime, as long as the function
    /// returns `Some(_)`, but the function will have been applied only once
    /// to the stored value.
    ///
    /// ```
    /// use atomic_storage::{atomic::AtomicU16, AtomicCell, Ordering::SeqCst};
    ///
    /// let a = AtomicCell::<[u8; 2], AtomicU16>::new([1, 2]);
    ///
    /// assert_eq!(a.fetch_update(SeqCst, SeqCst, |_| None), Err([1, 2]));
    /// assert_eq!(a.fetch_update(SeqCst, SeqCst, |[x, y]| Some([y, x])), Ok([1, 2]));
    /// assert_eq!(a.load(SeqCst), [2, 1]);
    /// ```
    pub fn fetch_update<F>(&self, set_order: Ordering, fetch_order: Ordering, mut f: F) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let mut prev = self.load(fetch_order);
        while let Some(next) = f(prev) {
            let mut expected = prev;
            if self.compare_exchange_weak(&mut expected, next, set_order, fetch_order) {
                return Ok(prev);
            }
            prev = expected;
        }
        Err(prev)
    }

    /// `true` if operations on this cell never take a lock.
    #[inline]
    pub fn is_lock_free(&self) -> bool {
        self.storage.is_lock_free()
    }
}

impl<T: NoUninit + Default, S: AtomicStorage> Default for AtomicCell<T, S>
where
    S::Underlying: Pod,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: NoUninit, S: AtomicStorage> From<T> for AtomicCell<T, S>
where
    S::Underlying: Pod,
{
    fn from(val: T) -> Self {
        Self::new(val)
    }
}

impl<T: NoUninit + fmt::Debug, S: AtomicStorage> fmt::Debug for AtomicCell<T, S>
where
    S::Underlying: Pod,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.load(Ordering::SeqCst).fmt(f)
    }
}

const fn type_name<T>(_fallback: &'static str) -> &'static str {
    #[cfg(feature = "const-type-name")]
    let _fallback = core::any::type_name::<T>();
    _fallback
}
