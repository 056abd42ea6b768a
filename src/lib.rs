//! This crate provides atomic variables of every width from 1 to 16 bytes,
//! with an explicit memory [`Ordering`] on every operation.
//!
//! # How it Works
//!
//! Every atomic variable owns exactly one storage cell implementing
//! [`AtomicStorage`]. The cell is selected at compile time from the width and
//! category of the value:
//!
//! - integral: [`Atomic<T>`] for `u8` through `u128` and their signed
//!   counterparts, with arithmetic and bitwise read-modify-write operations.
//! - pointer: [`AtomicPointer<T>`], whose arithmetic is scaled by the size
//!   of `T`.
//! - generic: [`AtomicCell<T, S>`] for any [`bytemuck::NoUninit`] value, copied
//!   byte for byte into a cell `S` of the same size.
//!
//! Operations translate their ordering once (see [`native_order`]) and then
//! issue a single native instruction. Widths without one, the 16-byte cell in
//! particular, are built from a double-width compare-and-swap loop bracketed
//! by barriers.
//!
//! Which widths are available, and whether they are lock-free, is recorded in
//! the [`caps`] table.
//!
//! [`AtomicStorage`]: atomic::AtomicStorage
#![cfg_attr(feature = "const-type-name", feature(const_type_name))]
#![no_std]

pub mod atomic;
pub mod caps;
mod cell;
mod fence;
#[cfg(target_has_atomic = "8")]
mod flag;
mod integer;
mod order;
#[cfg(target_has_atomic = "ptr")]
mod ptr;

pub use cell::AtomicCell;
pub use fence::{signal_fence, thread_fence};
#[cfg(target_has_atomic = "8")]
pub use flag::AtomicFlag;
pub use integer::{Atomic, Integer};
pub use order::{native_order, NativeOrdering, Ordering};
#[cfg(target_has_atomic = "ptr")]
pub use ptr::AtomicPointer;
