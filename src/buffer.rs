//! Growable byte buffer with chunked capacity management.
//!
//! The [`Buffer`] type is the reallocating byte store behind
//! [`BufferTarget`](crate::BufferTarget) and [`OwnedTarget`](crate::OwnedTarget). It can also be
//! used on its own: keep one around, point a fresh [`BufferTarget`](crate::BufferTarget) at it for
//! every message, and the allocation is reused.
//!
//! # Example
//!
//! ```
//! use fmt_target::buffer::Buffer;
//! use fmt_target::constants::CHUNK_SIZE;
//!
//! let mut buffer = Buffer::new();
//! assert_eq!(buffer.cap(), 0); // Nothing is allocated up front
//!
//! buffer.append(b"Hello, ");
//! buffer.append(b"World!");
//! assert_eq!(buffer.buf(), b"Hello, World!");
//! assert_eq!(buffer.cap(), CHUNK_SIZE);
//!
//! // Truncation keeps the allocation
//! buffer.truncate(5);
//! assert_eq!(buffer.as_str().unwrap(), "Hello");
//! assert_eq!(buffer.cap(), CHUNK_SIZE);
//! ```

use crate::constants::{CHUNK_SIZE, PRACTICAL_MAX_SIZE};
use alloc::vec::Vec;
use core::str::{self, Utf8Error};

/// A growable byte buffer with chunked capacity management.
///
/// `Buffer` grows in exponential steps (powers of 2) aligned to [`CHUNK_SIZE`] boundaries and
/// never gives memory back unless asked to with [`shrink()`](Self::shrink). Its spare capacity is
/// always initialized, so it can be handed out as a plain `&mut [u8]` to writers that produce
/// text in place.
///
/// # Invariants
///
/// This buffer maintains the invariant `0 <= self.len <= self.cap == self.buf.len() <=
/// self.buf.capacity()` at all times. Once it has allocated, `self.cap` is a multiple of
/// [`CHUNK_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    /// Internal buffer storage, zero-filled up to `cap`.
    buf: Vec<u8>,
    /// Logical capacity of the buffer (may be slightly less than `buf.capacity()`).
    cap: usize,
    /// Number of bytes currently stored in the buffer.
    len: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Creates a new, empty buffer.
    ///
    /// No memory is allocated until the first write.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let buffer = Buffer::new();
    /// assert_eq!(buffer.len(), 0);
    /// assert_eq!(buffer.cap(), 0);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cap: 0,
            len: 0,
        }
    }

    /// Creates a new buffer with at least the specified capacity.
    ///
    /// The actual capacity will be rounded up to the nearest [`CHUNK_SIZE`] multiple that can
    /// accommodate the requested capacity. A capacity of zero allocates nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// let buffer = Buffer::with_capacity(100);
    /// assert!(buffer.cap() >= 100);
    /// assert_eq!(buffer.cap() % CHUNK_SIZE, 0); // Aligned to CHUNK_SIZE
    ///
    /// // Gets exact multiple, not power-of-2
    /// let buffer = Buffer::with_capacity(5 * CHUNK_SIZE);
    /// assert_eq!(buffer.cap(), 5 * CHUNK_SIZE);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }

        // Round up to fit the requested capacity (linear, not exponential)
        let cap = Self::cap_up_linear(capacity);

        Self {
            buf: alloc::vec![0; cap],
            cap,
            len: 0,
        }
    }

    /// Returns the written contents of the buffer.
    #[expect(clippy::indexing_slicing, reason = "Safe by invariant")]
    #[inline]
    pub fn buf(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Returns the current capacity of the buffer in bytes.
    ///
    /// This is the number of bytes the buffer can hold before it has to reallocate.
    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Returns the number of bytes currently in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer contains no data.
    ///
    /// Equivalent to `self.len() == 0`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discards all data in the buffer without changing capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::{buffer::Buffer, constants::CHUNK_SIZE};
    /// let mut buffer = Buffer::with_capacity(8 * CHUNK_SIZE);
    /// buffer.append(b"data");
    /// buffer.clear();
    /// assert_eq!(buffer.len(), 0);
    /// assert_eq!(buffer.cap(), 8 * CHUNK_SIZE);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the buffer to `len` bytes, keeping the capacity.
    ///
    /// Has no effect if `len` is greater than or equal to the current length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append(b"Hello, World!");
    /// buffer.truncate(5);
    /// assert_eq!(buffer.buf(), b"Hello");
    ///
    /// buffer.truncate(100);
    /// assert_eq!(buffer.buf(), b"Hello");
    /// ```
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Rounds capacity up to the nearest power-of-2 multiple of [`CHUNK_SIZE`].
    ///
    /// This method implements the exponential growth strategy used by the buffer, with a minimum
    /// of [`CHUNK_SIZE`] and a maximum of [`PRACTICAL_MAX_SIZE`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// // Rounds up to nearest power-of-2 multiple of CHUNK_SIZE
    /// assert_eq!(Buffer::cap_up(CHUNK_SIZE), CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up(CHUNK_SIZE + 1), 2 * CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up(2 * CHUNK_SIZE), 2 * CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up(2 * CHUNK_SIZE + 1), 4 * CHUNK_SIZE);
    ///
    /// // Minimum is CHUNK_SIZE
    /// assert_eq!(Buffer::cap_up(0), CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up(10), CHUNK_SIZE);
    /// ```
    #[inline]
    #[expect(clippy::arithmetic_side_effects, reason = "Safe by bounds checks")]
    pub fn cap_up(capacity: usize) -> usize {
        // The bounds checks prevent both underflow and overflow problems by setting the minimum at
        // `CHUNK_SIZE` and maximum at [`PRACTICAL_MAX_SIZE`]. The early return for large capacities
        // ensures that power-of-two calculations cannot overflow.

        // Max bounds check
        if capacity >= PRACTICAL_MAX_SIZE >> 1 {
            return PRACTICAL_MAX_SIZE;
        }

        // Min bounds check
        if capacity < CHUNK_SIZE {
            return CHUNK_SIZE;
        }

        // Round up `capacity` to the nearest power of two multiple of `CHUNK_SIZE`
        capacity.div_ceil(CHUNK_SIZE).next_power_of_two() * CHUNK_SIZE
    }

    /// Rounds capacity up to the nearest [`CHUNK_SIZE`] multiple (linear).
    ///
    /// Unlike [`cap_up`](Self::cap_up) which uses exponential (power-of-2) rounding, this method
    /// provides exact multiples of [`CHUNK_SIZE`], with a minimum of [`CHUNK_SIZE`] and a maximum
    /// of [`PRACTICAL_MAX_SIZE`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// assert_eq!(Buffer::cap_up_linear(CHUNK_SIZE + 1), 2 * CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up_linear(2 * CHUNK_SIZE), 2 * CHUNK_SIZE);
    /// assert_eq!(Buffer::cap_up_linear(5 * CHUNK_SIZE - 1), 5 * CHUNK_SIZE);
    ///
    /// // Minimum is CHUNK_SIZE
    /// assert_eq!(Buffer::cap_up_linear(0), CHUNK_SIZE);
    /// ```
    #[inline]
    #[expect(clippy::arithmetic_side_effects, reason = "Safe by bounds checks")]
    pub fn cap_up_linear(capacity: usize) -> usize {
        // Max bounds check
        if capacity >= PRACTICAL_MAX_SIZE {
            return PRACTICAL_MAX_SIZE;
        }

        // Min bounds check
        if capacity < CHUNK_SIZE {
            return CHUNK_SIZE;
        }

        // Round up `capacity` to the nearest multiple of `CHUNK_SIZE`
        capacity.div_ceil(CHUNK_SIZE) * CHUNK_SIZE
    }

    /// Grows the buffer capacity to at least the specified target.
    ///
    /// If the buffer's current capacity already meets or exceeds `target`, no operation is
    /// performed. Otherwise, grows to the nearest power-of-2 multiple of [`CHUNK_SIZE`] that
    /// accommodates `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// let mut buffer = Buffer::new();
    /// buffer.grow_targeted(3 * CHUNK_SIZE);
    /// assert_eq!(buffer.cap(), 4 * CHUNK_SIZE);
    ///
    /// // No-op when already large enough
    /// buffer.grow_targeted(CHUNK_SIZE);
    /// assert_eq!(buffer.cap(), 4 * CHUNK_SIZE);
    /// ```
    #[inline]
    pub fn grow_targeted(&mut self, target: usize) {
        if target <= self.cap {
            return;
        }

        let next = Self::cap_up(target);

        #[cfg(feature = "log")]
        log::trace!("growing format buffer from {} to {} bytes", self.cap, next);

        self.buf.resize(next, 0);
        self.cap = next;
    }

    /// Makes room for at least `additional` more bytes past the current length.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity exceeds [`PRACTICAL_MAX_SIZE`], the same way `Vec` reports
    /// a capacity overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append(b"abc");
    /// buffer.reserve(100);
    /// assert!(buffer.cap() - buffer.len() >= 100);
    /// ```
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        let Some(target) = self
            .len
            .checked_add(additional)
            .filter(|&target| target <= PRACTICAL_MAX_SIZE)
        else {
            capacity_overflow()
        };

        self.grow_targeted(target);
    }

    /// Shrinks the buffer capacity to fit the current data.
    ///
    /// The minimum capacity is always [`CHUNK_SIZE`]. For more control over the target capacity,
    /// use [`shrink_targeted()`](Self::shrink_targeted).
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// let mut buffer = Buffer::with_capacity(8 * CHUNK_SIZE);
    /// buffer.append(b"Hello");
    ///
    /// buffer.shrink();
    /// assert_eq!(buffer.cap(), CHUNK_SIZE);  // Shrinks to minimum for small data
    /// assert_eq!(buffer.len(), 5);
    /// ```
    #[inline]
    pub fn shrink(&mut self) {
        self.shrink_targeted(CHUNK_SIZE);
    }

    /// Shrinks the buffer capacity to fit the current data or a target capacity, whichever is
    /// larger.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// let mut buffer = Buffer::with_capacity(8 * CHUNK_SIZE);
    /// buffer.append(b"Hello");
    ///
    /// // Shrink but keep at least 4x CHUNK_SIZE
    /// buffer.shrink_targeted(4 * CHUNK_SIZE);
    /// assert_eq!(buffer.cap(), 4 * CHUNK_SIZE);
    ///
    /// // Shrink to fit data (smaller than target)
    /// buffer.shrink_targeted(CHUNK_SIZE / 2);
    /// assert_eq!(buffer.cap(), CHUNK_SIZE);
    /// ```
    #[inline]
    pub fn shrink_targeted(&mut self, target: usize) {
        // Round `self.len()` up to the next chunk boundary to ensure `self.cap()` >= `self.len()`
        let next = Self::cap_up_linear(self.len).max(Self::cap_up_linear(target));

        if next >= self.cap {
            return;
        }

        self.buf.truncate(next);
        self.buf.shrink_to(next);
        self.cap = next;
    }

    /// Appends `bytes` to the end of the buffer, growing as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append(b"Hello");
    /// buffer.append(b"");
    /// buffer.append(b", World!");
    /// assert_eq!(buffer.buf(), b"Hello, World!");
    /// ```
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "Safe by invariant"
    )]
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());

        let end = self.len + bytes.len();
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
    }

    /// Appends a single byte to the end of the buffer, growing as needed.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "Safe by invariant"
    )]
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.reserve(1);

        self.buf[self.len] = byte;
        self.len += 1;
    }

    /// Returns the spare capacity past the written data, after reserving room for at least
    /// `reserve` bytes.
    ///
    /// Bytes written into the returned slice become part of the buffer once committed with
    /// [`advance()`](Self::advance). The slice may hold stale data from earlier writes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// let spare = buffer.spare_mut(3);
    /// assert!(spare.len() >= 3);
    ///
    /// spare[..3].copy_from_slice(b"abc");
    /// buffer.advance(3);
    /// assert_eq!(buffer.buf(), b"abc");
    /// ```
    #[expect(clippy::indexing_slicing, reason = "Safe by invariant")]
    #[inline]
    pub fn spare_mut(&mut self, reserve: usize) -> &mut [u8] {
        self.reserve(reserve);

        &mut self.buf[self.len..self.cap]
    }

    /// Commits `amt` bytes written into the spare capacity.
    ///
    /// `amt` is clamped to the spare capacity.
    #[expect(clippy::arithmetic_side_effects, reason = "Safe by invariant")]
    #[inline]
    pub fn advance(&mut self, amt: usize) {
        debug_assert!(amt <= self.cap - self.len, "advanced past the spare capacity");

        self.len = self.len.saturating_add(amt).min(self.cap);
    }

    /// Returns the written data followed by a NUL terminator.
    ///
    /// The terminator is placed one past the end of the data without changing the length, which
    /// may require growing the buffer by one byte.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append(b"abc");
    /// assert_eq!(buffer.with_nul(), b"abc\0");
    /// assert_eq!(buffer.len(), 3);
    /// ```
    #[expect(clippy::indexing_slicing, reason = "Safe by invariant")]
    pub fn with_nul(&mut self) -> &[u8] {
        self.reserve(1);

        self.buf[self.len] = 0;
        &self.buf[..=self.len]
    }

    /// Returns the buffer data as a UTF-8 string slice.
    ///
    /// An incomplete UTF-8 sequence at the end (left behind by a truncation) is trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append("Hello, 世界!".as_bytes()); // 世界 is World in Japanese
    /// assert_eq!(buffer.as_str().unwrap(), "Hello, 世界!");
    ///
    /// // Cut '界' in half
    /// buffer.truncate(12);
    /// assert_eq!(buffer.as_str().unwrap(), "Hello, 世");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`Utf8Error`] if the buffer contains invalid UTF-8 before its end.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        trim_partial_utf8(self.buf())
    }

    /// Converts the buffer into a `Vec<u8>` holding exactly the written data.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::buffer::Buffer;
    /// let mut buffer = Buffer::new();
    /// buffer.append(b"abc");
    /// assert_eq!(buffer.into_vec(), b"abc".to_vec());
    /// ```
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(mut buf: Vec<u8>) -> Self {
        let len = buf.len();
        let cap = if len == 0 {
            0
        } else {
            Self::cap_up_linear(len)
        };

        buf.resize(cap, 0);

        Self { buf, cap, len }
    }
}

/// Interprets `bytes` as UTF-8, trimming an incomplete sequence at the end.
#[expect(clippy::indexing_slicing, reason = "Safe by invariant")]
pub(crate) fn trim_partial_utf8(bytes: &[u8]) -> Result<&str, Utf8Error> {
    match str::from_utf8(bytes) {
        Ok(s) => Ok(s),
        // Invalid sequence in the middle
        Err(e) if e.error_len().is_some() => Err(e),
        // Incomplete sequence at the end, the prefix up to it is valid
        Err(e) => str::from_utf8(&bytes[..e.valid_up_to()]),
    }
}

#[cold]
#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}
