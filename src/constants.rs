//! Size constants for formatting targets.
//!
//! This module defines the constants shared by the growable [`Buffer`](crate::buffer::Buffer) and
//! the fixed-capacity targets. Growable capacities are managed as multiples of [`CHUNK_SIZE`].
//!
//! # Size Hierarchy
//!
//! - [`CHUNK_SIZE`]: The fundamental allocation unit of a growable buffer (64 bytes)
//! - [`PRACTICAL_MAX_SIZE`]: The theoretical platform maximum
//! - [`DISCARD_SIZE`]: The scratch region every fixed target carries for writes past its end
//!
//! # Invariant
//!
//! - `CHUNK_SIZE` is a power of 2
//! - `PRACTICAL_MAX_SIZE > CHUNK_SIZE` and is a power of 2 multiple of `CHUNK_SIZE`
//! - `DISCARD_SIZE` holds the widest text any built-in scalar writer produces

/// Buffer chunk size (64 bytes) used for growable buffer allocation.
///
/// Formatted text is usually short (labels, log lines, paths), so the unit is a cache line rather
/// than a page. The buffer capacity will always be a multiple of this value once it has allocated.
pub const CHUNK_SIZE: usize =
    // 2^6 = 64
    1 << 6;

/// Practical maximum buffer size.
///
/// This is a platform limit, not a recommended size. Its value is the largest power of two
/// multiple of [`CHUNK_SIZE`] that fits in usize, representing the theoretical maximum reachable
/// through exponential growth. Asking a growable buffer for more is treated like any other
/// allocation failure.
///
/// # Safety
///
/// While this is a massive number, it won't overflow as it resolves to `usize::MAX / 2 + 1` just
/// expressed in terms of `CHUNK_SIZE`.
pub const PRACTICAL_MAX_SIZE: usize = CHUNK_SIZE * (1 << CHUNK_SIZE.leading_zeros());

/// Size of the discard region carried by fixed-capacity targets.
///
/// Reserve-and-write requests that a fixed target can't satisfy from its own remaining space run
/// against this scratch region instead, and only the part that fits is copied back. It must be at
/// least as large as the largest single scalar rendering: the decimal form of `i64::MIN` is 20
/// bytes and the `0x`-prefixed hexadecimal form of `u64::MAX` is 18 bytes.
///
/// This is a tunable. Writers asking for more than this may be handed a shorter slice.
pub const DISCARD_SIZE: usize = 64;
