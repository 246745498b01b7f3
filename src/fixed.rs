//! Fixed-capacity formatting targets.
//!
//! Both targets here write into a caller-owned `&mut [u8]` and never reallocate or write past its
//! end. Once a write doesn't fit, the part that does is kept, the target is marked as overflowed,
//! and further writes are dropped.
//!
//! - [`FixedTarget`] uses the whole region for content and never terminates it.
//! - [`TerminatedTarget`] keeps the final byte of the region for a NUL terminator, written by
//!   [`finalize()`](TerminatedTarget::finalize).

use crate::buffer::trim_partial_utf8;
use crate::constants::DISCARD_SIZE;
use crate::error::RegionError;
use crate::target::{FormatTarget, Put, Sink, Storage};
use core::ops::{Deref, DerefMut};
use core::str::Utf8Error;

/// A caller-owned region with a write limit and a discard region for writes past it.
///
/// Invariant: `written <= limit <= buf.len()`.
#[derive(Debug)]
pub(crate) struct FixedRegion<'a> {
    buf: &'a mut [u8],
    /// Usable capacity, may be less than `buf.len()` to keep room for a terminator.
    limit: usize,
    written: usize,
    /// Landing zone for reserve-and-write requests the region can't satisfy itself.
    discard: [u8; DISCARD_SIZE],
}

impl<'a> FixedRegion<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        let limit = buf.len();

        Self::with_limit(buf, limit)
    }

    #[inline]
    pub(crate) fn with_limit(buf: &'a mut [u8], limit: usize) -> Self {
        debug_assert!(limit <= buf.len(), "limit past the end of the region");

        Self {
            limit: limit.min(buf.len()),
            buf,
            written: 0,
            discard: [0; DISCARD_SIZE],
        }
    }

    #[expect(clippy::arithmetic_side_effects, reason = "Safe by invariant")]
    #[inline]
    fn remaining(&self) -> usize {
        self.limit - self.written
    }

    /// Writes a NUL terminator right after the content and returns its offset.
    #[inline]
    pub(crate) fn terminate(self) -> usize {
        if let Some(slot) = self.buf.get_mut(self.written) {
            *slot = 0;
        }

        self.written
    }
}

impl Sink for FixedRegion<'_> {
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "Safe by invariant"
    )]
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Put {
        let kept = bytes.len().min(self.remaining());
        let end = self.written + kept;

        self.buf[self.written..end].copy_from_slice(&bytes[..kept]);
        self.written = end;

        Put {
            produced: bytes.len(),
            kept,
        }
    }

    #[expect(
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing,
        reason = "Safe by invariant"
    )]
    fn put_with<F>(&mut self, reserve: usize, tail: usize, f: F) -> Put
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        let remaining = self.remaining();
        let wanted = reserve.saturating_add(tail);

        // The tail may use bytes past the limit, such as the one kept for a terminator
        let end = self.limit.saturating_add(tail).min(self.buf.len());
        let room = end - self.written;

        // Write in place when the region covers the request, or when it offers more than the
        // discard region could
        let in_place = room >= wanted || (wanted > DISCARD_SIZE && room >= DISCARD_SIZE);
        let span = if in_place {
            room
        } else {
            wanted.min(DISCARD_SIZE)
        };

        let Some(content) = span.checked_sub(tail).filter(|&content| content > 0) else {
            return Put::whole(0);
        };

        let produced = if in_place {
            f(&mut self.buf[self.written..end]).min(content)
        } else {
            f(&mut self.discard[..span]).min(content)
        };

        // Keep the prefix that fits
        let kept = produced.min(remaining);
        let stop = self.written + kept;

        if !in_place {
            self.buf[self.written..stop].copy_from_slice(&self.discard[..kept]);
        }

        self.written = stop;

        // A writer that used every byte of a short span may have had more to write
        let produced = if span < wanted && produced == content {
            reserve
        } else {
            produced
        };

        Put { produced, kept }
    }

    #[inline]
    fn len(&self) -> usize {
        self.written
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.limit
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        self.written = self.written.min(len);
    }

    #[expect(clippy::indexing_slicing, reason = "Safe by invariant")]
    #[inline]
    fn bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }
}

/// A formatting target over a caller-owned fixed region.
///
/// The whole region is usable for content. Nothing is terminated: the content is the first
/// [`written()`](Self::written) bytes of the region.
///
/// # Examples
///
/// ```
/// use fmt_target::{FixedTarget, format_to};
///
/// let mut region = [0u8; 5];
/// let mut target = FixedTarget::new(&mut region);
///
/// target.append(b"hi");
/// target.append(b"!!!");
/// assert_eq!(target.as_str().unwrap(), "hi!!!");
/// assert!(!target.has_overflowed()); // Exactly full is not overflowed
///
/// format_to!(target, "{}", 42);
/// assert_eq!(target.written(), 5);
/// assert!(target.has_overflowed());
/// ```
pub struct FixedTarget<'a> {
    inner: FormatTarget<'a>,
}

impl<'a> FixedTarget<'a> {
    /// Creates a target that writes into `buf`, truncating at its end.
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            inner: FormatTarget::from_storage(Storage::Fixed(FixedRegion::new(buf))),
        }
    }

    /// Returns the number of content bytes written into the region.
    ///
    /// Once the target has overflowed, this is the region's length.
    #[inline]
    pub fn written(&self) -> usize {
        self.inner.size()
    }

    /// Returns the content as a string slice.
    ///
    /// Truncation works on bytes and may cut a multi-byte character in half, so an incomplete
    /// UTF-8 sequence at the end is left out.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::FixedTarget;
    /// let mut region = [0u8; 8];
    /// let mut target = FixedTarget::new(&mut region);
    /// target.append_str("Hello, 世界"); // '世' would need bytes 7..10
    /// assert_eq!(target.as_bytes().len(), 8);
    /// assert_eq!(target.as_str().unwrap(), "Hello, ");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`Utf8Error`] if raw bytes appended to the target aren't valid UTF-8.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        trim_partial_utf8(self.inner.as_bytes())
    }
}

impl<'a> Deref for FixedTarget<'a> {
    type Target = FormatTarget<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for FixedTarget<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl core::fmt::Debug for FixedTarget<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FixedTarget").field(&self.inner).finish()
    }
}

/// A fixed-capacity formatting target that is finalized with a NUL terminator.
///
/// The last byte of the region is kept for the terminator, so a region of `n` bytes holds at most
/// `n - 1` bytes of content. Nothing is terminated while writing; call
/// [`finalize()`](Self::finalize) once done, which consumes the target.
///
/// # Examples
///
/// ```
/// use fmt_target::TerminatedTarget;
///
/// let mut region = [0xffu8; 4];
/// let mut target = TerminatedTarget::new(&mut region).unwrap();
/// target.append(b"ab");
///
/// let end = target.finalize();
/// assert_eq!(end, 2);
/// assert_eq!(&region[..=end], b"ab\0");
/// ```
pub struct TerminatedTarget<'a> {
    inner: FormatTarget<'a>,
}

impl<'a> TerminatedTarget<'a> {
    /// Creates a target that writes into `buf`, keeping its last byte for the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Empty`] if `buf` has no room for the terminator.
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Result<Self, RegionError> {
        let Some(limit) = buf.len().checked_sub(1) else {
            return Err(RegionError::Empty);
        };

        Ok(Self {
            inner: FormatTarget::from_storage(Storage::Fixed(FixedRegion::with_limit(buf, limit))),
        })
    }

    /// Writes the NUL terminator after the content and returns its offset in the region.
    ///
    /// The offset is also the content length, which is never more than the region's length minus
    /// one, so the terminator always lands inside the region.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::{TerminatedTarget, format_to};
    /// let mut region = [0u8; 6];
    /// let mut target = TerminatedTarget::new(&mut region).unwrap();
    /// format_to!(target, "{}", 1234567);
    /// assert!(target.has_overflowed());
    ///
    /// let end = target.finalize();
    /// assert_eq!(end, 5);
    /// assert_eq!(&region, b"12345\0");
    /// ```
    pub fn finalize(self) -> usize {
        match self.inner.into_storage() {
            Storage::Fixed(region) => region.terminate(),
            Storage::Borrowed(_) | Storage::Owned(_) => {
                unreachable!("terminated targets always write into a fixed region")
            }
        }
    }
}

impl<'a> Deref for TerminatedTarget<'a> {
    type Target = FormatTarget<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for TerminatedTarget<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl core::fmt::Debug for TerminatedTarget<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TerminatedTarget").field(&self.inner).finish()
    }
}
