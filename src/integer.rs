//! [`Atomic<T>`], the integral category.

use core::fmt;

use crate::atomic::{AtomicStorage, AtomicU128, IntegerStorage, Ordering};

mod sealed {
    pub trait Sealed {}
}

/// An integer type with a lock-free (or double-width compare-and-swap)
/// storage of exactly its own width.
pub trait Integer: Copy + Eq + sealed::Sealed {
    /// The storage cell selected for this type.
    type Storage: IntegerStorage;

    #[doc(hidden)]
    fn into_underlying(self) -> <Self::Storage as AtomicStorage>::Underlying;
    #[doc(hidden)]
    fn from_underlying(v: <Self::Storage as AtomicStorage>::Underlying) -> Self;
    #[doc(hidden)]
    fn get_mut(storage: &mut Self::Storage) -> &mut Self;
}

macro_rules! impl_integer {
    ($width:literal: $($t:ty => $a:ident),*) => {
        $(
            #[cfg(target_has_atomic = $width)]
            impl sealed::Sealed for $t {}

            #[cfg(target_has_atomic = $width)]
            impl Integer for $t {
                type Storage = crate::atomic::$a;

                #[inline]
                fn into_underlying(self) -> $t {
                    self
                }

                #[inline]
                fn from_underlying(v: $t) -> Self {
                    v
                }

                #[inline]
                fn get_mut(storage: &mut Self::Storage) -> &mut Self {
                    AtomicStorage::get_mut(storage)
                }
            }
        )*
    };
}

impl_integer! {"8": u8 => AtomicU8, i8 => AtomicI8}
impl_integer! {"16": u16 => AtomicU16, i16 => AtomicI16}
impl_integer! {"32": u32 => AtomicU32, i32 => AtomicI32}
impl_integer! {"64": u64 => AtomicU64, i64 => AtomicI64}
impl_integer! {"ptr": usize => AtomicUsize, isize => AtomicIsize}

impl sealed::Sealed for u128 {}
impl sealed::Sealed for i128 {}

impl Integer for u128 {
    type Storage = AtomicU128;

    #[inline]
    fn into_underlying(self) -> u128 {
        self
    }

    #[inline]
    fn from_underlying(v: u128) -> Self {
        v
    }

    #[inline]
    fn get_mut(storage: &mut AtomicU128) -> &mut Self {
        storage.get_mut()
    }
}

// Two's complement makes the wrapping arithmetic identical on the unsigned cell.
impl Integer for i128 {
    type Storage = AtomicU128;

    #[inline]
    fn into_underlying(self) -> u128 {
        self as u128
    }

    #[inline]
    fn from_underlying(v: u128) -> Self {
        v as i128
    }

    #[inline]
    fn get_mut(storage: &mut AtomicU128) -> &mut Self {
        bytemuck::cast_mut(storage.get_mut())
    }
}

/// An integer which can be safely shared between threads.
///
/// The storage cell is chosen at compile time from `T`'s width and
/// signedness, see [`Integer::Storage`].
///
/// # Examples
///
/// ```
/// use atomic_storage::{Atomic, Ordering};
///
/// let a = Atomic::new(5u32);
/// assert_eq!(a.fetch_add(3, Ordering::SeqCst), 5);
/// assert_eq!(a.load(Ordering::SeqCst), 8);
///
/// let mut expected = 7;
/// assert!(!a.compare_exchange_strong(&mut expected, 1, Ordering::AcqRel, Ordering::Acquire));
/// assert_eq!(expected, 8);
/// ```
pub struct Atomic<T: Integer> {
    storage: T::Storage,
}

impl<T: Integer> Atomic<T> {
    /// Creates a new atomic integer initialized with `val`.
    #[inline]
    pub fn new(val: T) -> Self {
        Self {
            storage: T::Storage::new(val.into_underlying()),
        }
    }

    /// Consumes the atomic and returns the contained value.
    #[inline]
    pub fn into_inner(self) -> T {
        T::from_underlying(self.storage.into_inner())
    }

    /// Returns a mutable reference to the contained value.
    ///
    /// This is safe because the mutable reference guarantees that no other
    /// threads are concurrently accessing the atomic data.
    ///
    /// ```
    /// use atomic_storage::{Atomic, Ordering::SeqCst};
    ///
    /// let mut a = Atomic::new(-1i128);
    /// *a.get_mut() -= 1;
    /// assert_eq!(a.load(SeqCst), -2);
    /// ```
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        T::get_mut(&mut self.storage)
    }

    /// Returns the underlying storage cell.
    #[inline]
    pub fn storage(&self) -> &T::Storage {
        &self.storage
    }

    /// Loads the value. Release and AcqRel degrade to the load half of the
    /// ordering, see [`Ordering::for_load`].
    #[inline]
    pub fn load(&self, order: Ordering) -> T {
        T::from_underlying(self.storage.load(order))
    }

    /// Stores `val`. Acquire and AcqRel degrade to the store half of the
    /// ordering, see [`Ordering::for_store`].
    #[inline]
    pub fn store(&self, val: T, order: Ordering) {
        self.storage.store(val.into_underlying(), order)
    }

    /// Stores `val`, returning the previous value.
    #[inline]
    pub fn exchange(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.swap(val.into_underlying(), order))
    }

    /// Stores `desired` if the current value equals `*expected` and returns
    /// `true`. Otherwise writes the current value into `expected` and returns
    /// `false`. Never fails spuriously.
    #[inline]
    pub fn compare_exchange_strong(
        &self,
        expected: &mut T,
        desired: T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        match self.compare_exchange(*expected, desired, success, failure) {
            Ok(_) => true,
            Err(actual) => {
                *expected = actual;
                false
            }
        }
    }

    /// Like [`Atomic::compare_exchange_strong`], but may fail spuriously.
    #[inline]
    pub fn compare_exchange_weak(
        &self,
        expected: &mut T,
        desired: T,
        success: Ordering,
        failure: Ordering,
    ) -> bool {
        match self.storage.compare_exchange_weak(
            expected.into_underlying(),
            desired.into_underlying(),
            success,
            failure,
        ) {
            Ok(_) => true,
            Err(actual) => {
                *expected = T::from_underlying(actual);
                false
            }
        }
    }

    /// Stores `new` if the current value equals `current`, returning
    /// `Ok(previous)` or `Err(actual)`.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: T,
        new: T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<T, T> {
        self.storage
            .compare_exchange(
                current.into_underlying(),
                new.into_underlying(),
                success,
                failure,
            )
            .map(T::from_underlying)
            .map_err(T::from_underlying)
    }

    /// Adds `val`, wrapping on overflow, and returns the previous value.
    #[inline]
    pub fn fetch_add(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.fetch_add(val.into_underlying(), order))
    }

    /// Subtracts `val`, wrapping on overflow, and returns the previous value.
    #[inline]
    pub fn fetch_sub(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.fetch_sub(val.into_underlying(), order))
    }

    /// Bitwise "and" with `val`, returning the previous value.
    #[inline]
    pub fn fetch_and(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.fetch_and(val.into_underlying(), order))
    }

    /// Bitwise "or" with `val`, returning the previous value.
    #[inline]
    pub fn fetch_or(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.fetch_or(val.into_underlying(), order))
    }

    /// Bitwise "xor" with `val`, returning the previous value.
    #[inline]
    pub fn fetch_xor(&self, val: T, order: Ordering) -> T {
        T::from_underlying(self.storage.fetch_xor(val.into_underlying(), order))
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
    /// use atomic_storage::{Atomic, Ordering::SeqCst};
    ///
    /// let a = Atomic::new(7i64);
    /// assert_eq!(a.fetch_update(SeqCst, SeqCst, |_| None), Err(7));
    /// assert_eq!(a.fetch_update(SeqCst, SeqCst, |a| Some(a + 1)), Ok(7));
    /// assert_eq!(a.load(SeqCst), 8);
    /// ```
    pub fn fetch_update<F>(&self, set_order: Ordering, fetch_order: Ordering, mut f: F) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let mut prev = self.load(fetch_order);
        while let Some(next) = f(prev) {
            match self.storage.compare_exchange_weak(
                prev.into_underlying(),
                next.into_underlying(),
                set_order,
                fetch_order,
            ) {
                Ok(v) => return Ok(T::from_underlying(v)),
                Err(next_prev) => prev = T::from_underlying(next_prev),
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

impl<T: Integer + Default> Default for Atomic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Integer> From<T> for Atomic<T> {
    fn from(val: T) -> Self {
        Self::new(val)
    }
}

impl<T: Integer + fmt::Debug> fmt::Debug for Atomic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.load(Ordering::SeqCst).fmt(f)
    }
}
