//! Formatting targets: one API for writing formatted text, whatever the storage behind it.
//!
//! Code that produces text takes a [`&mut FormatTarget`](FormatTarget) and writes to it with
//! [`format_to!`], [`append()`](FormatTarget::append) and friends. The caller decides where the
//! bytes land:
//!
//! - a growable [`Buffer`](buffer::Buffer) it already has ([`BufferTarget`]),
//! - a buffer owned by the target ([`OwnedTarget`]),
//! - a fixed region such as a stack array, truncating silently when it fills up
//!   ([`FixedTarget`]),
//! - a fixed region that gets a NUL terminator once finished ([`TerminatedTarget`]).
//!
//! Fixed targets never write past the region they were given and never allocate. Running out of
//! room isn't an error: the bytes that fit are kept, later writes are dropped, and
//! [`has_overflowed()`](FormatTarget::has_overflowed) reports it to callers who care.
//!
//! # Quick start
//!
//! ```
//! use fmt_target::{FixedTarget, FormatTarget, OwnedTarget, format_to};
//!
//! fn status(out: &mut FormatTarget<'_>, done: u32, total: u32) {
//!     format_to!(out, "{done}/{total} done");
//! }
//!
//! // Growable: never truncates
//! let mut owned = OwnedTarget::new();
//! status(&mut owned, 3, 10);
//! assert_eq!(owned.as_str().unwrap(), "3/10 done");
//!
//! // Fixed: a 6 byte display label
//! let mut label = [0u8; 6];
//! let mut fixed = FixedTarget::new(&mut label);
//! status(&mut fixed, 3, 10);
//! assert_eq!(fixed.as_str().unwrap(), "3/10 d");
//! assert!(fixed.has_overflowed());
//! ```
//!
//! # Crate organisation
//!
//! - [`FormatTarget`]: the contract every target dereferences to.
//! - [`BufferTarget`], [`OwnedTarget`]: growable targets.
//! - [`FixedTarget`], [`TerminatedTarget`]: fixed-capacity targets.
//! - [`callback`]: rendering from inside a `Display` callback.
//! - [`buffer::Buffer`]: the growable byte buffer behind the growable targets.
//! - [`constants`]: size constants ([`CHUNK_SIZE`](constants::CHUNK_SIZE),
//!   [`DISCARD_SIZE`](constants::DISCARD_SIZE)) used throughout the crate.
//!
//! # Features
//!
//! - `std` (default): implements `std::io::Write` for [`FormatTarget`]. Without it the crate is
//!   `no_std` and only needs `alloc`.
//! - `log`: reports overflow and buffer growth through the `log` facade.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod buffer;
pub mod callback;
pub mod constants;
mod error;
mod fixed;
mod growable;
mod numeric;
mod target;

pub use error::RegionError;
pub use fixed::{FixedTarget, TerminatedTarget};
pub use growable::{BufferTarget, OwnedTarget};
pub use target::FormatTarget;

/// Renders a format string and its arguments into a target.
///
/// `format_to!(target, "...", args)` is `target.render(format_args!("...", args))`. It accepts any
/// [`FormatTarget`] wrapper or reference, as well as a
/// [`CallbackOutput`](callback::CallbackOutput).
///
/// # Examples
///
/// ```
/// use fmt_target::{OwnedTarget, format_to};
///
/// let mut target = OwnedTarget::new();
/// let width = 6;
/// format_to!(target, "{:>width$}|{:<4}|", "right", "left");
/// assert_eq!(target.as_str().unwrap(), " right|left|");
/// ```
#[macro_export]
macro_rules! format_to {
    ($target:expr, $($arg:tt)*) => {
        $target.render(::core::format_args!($($arg)*))
    };
}
