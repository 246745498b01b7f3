//! Growable formatting targets.
//!
//! These targets write into a [`Buffer`] and reallocate as needed, so they never truncate and
//! never overflow. Running out of memory is handled the way the allocator handles it.

use crate::buffer::Buffer;
use crate::target::{FormatTarget, Storage};
use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::str::Utf8Error;

/// A formatting target over a caller-owned [`Buffer`].
///
/// Writes go to the end of whatever the buffer already holds. The buffer keeps its contents and
/// allocation once the target is dropped.
///
/// # Examples
///
/// ```
/// use fmt_target::{BufferTarget, buffer::Buffer, format_to};
///
/// let mut buffer = Buffer::new();
/// buffer.append(b"[");
///
/// let mut target = BufferTarget::new(&mut buffer);
/// format_to!(target, "{:>4}", 7);
/// target.push(b']');
///
/// assert_eq!(buffer.as_str().unwrap(), "[   7]");
/// ```
pub struct BufferTarget<'a> {
    inner: FormatTarget<'a>,
}

impl<'a> BufferTarget<'a> {
    /// Creates a target that appends to `buffer`.
    #[inline]
    pub fn new(buffer: &'a mut Buffer) -> Self {
        Self {
            inner: FormatTarget::from_storage(Storage::Borrowed(buffer)),
        }
    }
}

impl<'a> Deref for BufferTarget<'a> {
    type Target = FormatTarget<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BufferTarget<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl fmt::Debug for BufferTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BufferTarget").field(&self.inner).finish()
    }
}

/// A formatting target that owns its [`Buffer`].
///
/// Besides the [`FormatTarget`] operations it offers views of the result: a zero-copy
/// [`as_str()`](Self::as_str), a NUL-terminated [`c_str()`](Self::c_str), and a
/// [`Display`](fmt::Display) impl so the target itself can be used as a formatting argument.
/// [`clear()`](Self::clear) resets it for reuse without giving back the allocation.
///
/// # Examples
///
/// ```
/// use fmt_target::{OwnedTarget, format_to};
///
/// let mut target = OwnedTarget::new();
/// format_to!(target, "{}+{}", 1, 2);
/// assert_eq!(target.as_str().unwrap(), "1+2");
///
/// // Usable as an argument, padding included
/// assert_eq!(format!("[{target:<5}]"), "[1+2  ]");
///
/// target.clear();
/// assert_eq!(target.size(), 0);
/// ```
pub struct OwnedTarget {
    inner: FormatTarget<'static>,
}

impl Default for OwnedTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnedTarget {
    /// Creates a target with an empty buffer. Nothing is allocated until the first write.
    #[inline]
    pub fn new() -> Self {
        Self::from(Buffer::new())
    }

    /// Creates a target whose buffer can hold at least `capacity` bytes without reallocating.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from(Buffer::with_capacity(capacity))
    }

    #[inline]
    fn buffer(&self) -> &Buffer {
        match self.inner.storage() {
            Storage::Owned(buffer) => buffer,
            Storage::Borrowed(_) | Storage::Fixed(_) => {
                unreachable!("owned targets always write into their own buffer")
            }
        }
    }

    #[inline]
    fn buffer_mut(&mut self) -> &mut Buffer {
        match self.inner.storage_mut() {
            Storage::Owned(buffer) => buffer,
            Storage::Borrowed(_) | Storage::Fixed(_) => {
                unreachable!("owned targets always write into their own buffer")
            }
        }
    }

    /// Discards the written data, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.inner.restore_size(0);
    }

    /// Gives back capacity the written data doesn't need, down to a single chunk.
    ///
    /// Useful after a long message when the target is kept around for short ones.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// # use fmt_target::constants::CHUNK_SIZE;
    /// let mut target = OwnedTarget::new();
    /// target.append(&[b'x'; 10 * CHUNK_SIZE]);
    ///
    /// target.clear();
    /// target.shrink_to_fit();
    /// assert_eq!(target.capacity(), CHUNK_SIZE);
    /// ```
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.buffer_mut().shrink();
    }

    /// Gives back capacity beyond `min_capacity`, never dropping below what the written data
    /// needs.
    #[inline]
    pub fn shrink_to(&mut self, min_capacity: usize) {
        self.buffer_mut().shrink_targeted(min_capacity);
    }

    /// Returns the written data as a string slice, without copying.
    ///
    /// An incomplete UTF-8 sequence at the end, left behind by a
    /// [`restore_size()`](FormatTarget::restore_size) in the middle of a character, is trimmed.
    ///
    /// # Errors
    ///
    /// Returns a [`Utf8Error`] if raw bytes appended to the target aren't valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        self.buffer().as_str()
    }

    /// Returns the written data as a string, replacing invalid UTF-8 with `U+FFFD`.
    ///
    /// Borrows when the data is valid UTF-8.
    #[inline]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.buffer().buf())
    }

    /// Returns the written data followed by a NUL terminator.
    ///
    /// The terminator is not part of the content: [`size()`](FormatTarget::size) is unchanged and
    /// the next write overwrites it. Making room for it may reallocate the buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.append_str("abc");
    /// assert_eq!(target.c_str(), b"abc\0");
    /// assert_eq!(target.size(), 3);
    /// ```
    #[inline]
    pub fn c_str(&mut self) -> &[u8] {
        self.buffer_mut().with_nul()
    }

    /// Consumes the target, returning its buffer.
    pub fn into_buffer(self) -> Buffer {
        match self.inner.into_storage() {
            Storage::Owned(buffer) => buffer,
            Storage::Borrowed(_) | Storage::Fixed(_) => {
                unreachable!("owned targets always write into their own buffer")
            }
        }
    }
}

impl From<Buffer> for OwnedTarget {
    /// Creates a target that appends to the end of `buffer`'s existing data.
    #[inline]
    fn from(buffer: Buffer) -> Self {
        Self {
            inner: FormatTarget::from_storage(Storage::Owned(buffer)),
        }
    }
}

impl Deref for OwnedTarget {
    type Target = FormatTarget<'static>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for OwnedTarget {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl fmt::Display for OwnedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_lossy())
    }
}

impl fmt::Debug for OwnedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedTarget")
            .field("content", &self.to_string_lossy())
            .field("capacity", &self.inner.capacity())
            .finish()
    }
}
