//! The formatting target contract.
//!
//! A [`FormatTarget`] is "somewhere formatted text can be written". It hides which storage
//! strategy sits behind it, so a function taking `&mut FormatTarget<'_>` works the same whether
//! its caller handed it a growable [`Buffer`], a fixed stack region or a region that gets a NUL
//! terminator at the end.
//!
//! Every write funnels through [`append()`](FormatTarget::append),
//! [`render()`](FormatTarget::render) or [`write_with_span()`](FormatTarget::write_with_span), so
//! the overflow policy lives in exactly one place. Writes never report errors: a fixed target
//! that runs out of room keeps the prefix that fit, raises its overflow flag, and drops
//! everything after that. Check [`has_overflowed()`](FormatTarget::has_overflowed) afterwards if
//! the truncation matters.
//!
//! # Example
//!
//! ```
//! use fmt_target::{FixedTarget, FormatTarget, OwnedTarget, format_to};
//!
//! fn describe(out: &mut FormatTarget<'_>, name: &str, count: u32) {
//!     format_to!(out, "{name}: {count} item");
//!     if count != 1 {
//!         out.push(b's');
//!     }
//! }
//!
//! let mut owned = OwnedTarget::new();
//! describe(&mut owned, "basket", 12);
//! assert_eq!(owned.as_str().unwrap(), "basket: 12 items");
//!
//! let mut label = [0u8; 10];
//! let mut fixed = FixedTarget::new(&mut label);
//! describe(&mut fixed, "basket", 12);
//! assert_eq!(fixed.as_str().unwrap(), "basket: 12");
//! assert!(fixed.has_overflowed());
//! ```

use crate::buffer::Buffer;
use crate::fixed::FixedRegion;
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// State bits of a [`FormatTarget`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Flags: u8 {
        /// The target writes into a fixed-capacity region.
        const FIXED = 1;
        /// A write has been cut short, later writes are dropped.
        const OVERFLOWED = 1 << 1;
    }
}

/// Outcome of a single write against a [`Sink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Put {
    /// Bytes the caller asked to write.
    pub(crate) produced: usize,
    /// Bytes the sink actually kept.
    pub(crate) kept: usize,
}

impl Put {
    /// A write that was kept in full.
    #[inline]
    pub(crate) const fn whole(len: usize) -> Self {
        Self {
            produced: len,
            kept: len,
        }
    }

    #[inline]
    pub(crate) const fn is_short(&self) -> bool {
        self.kept < self.produced
    }
}

/// What a storage strategy has to provide for [`FormatTarget`] to drive it.
pub(crate) trait Sink {
    /// Appends as much of `bytes` as fits.
    fn put(&mut self, bytes: &[u8]) -> Put;

    /// Runs `f` against writable space for `reserve` content bytes followed by `tail` bytes the
    /// writer may scribble on but that never become content. Keeps as much of the content `f`
    /// reports as fits.
    ///
    /// `f` is not called when the space on offer holds no content byte.
    fn put_with<F>(&mut self, reserve: usize, tail: usize, f: F) -> Put
    where
        F: FnOnce(&mut [u8]) -> usize;

    /// Number of bytes kept so far.
    fn len(&self) -> usize;

    /// Number of bytes the sink can hold without reallocating.
    fn capacity(&self) -> usize;

    /// Drops everything past `len`.
    fn truncate(&mut self, len: usize);

    /// The kept bytes.
    fn bytes(&self) -> &[u8];
}

impl Sink for Buffer {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Put {
        self.append(bytes);

        Put::whole(bytes.len())
    }

    #[inline]
    fn put_with<F>(&mut self, reserve: usize, tail: usize, f: F) -> Put
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        let spare = self.spare_mut(reserve.saturating_add(tail));

        let Some(content) = spare.len().checked_sub(tail).filter(|&content| content > 0) else {
            return Put::whole(0);
        };

        let produced = f(spare).min(content);
        self.advance(produced);

        Put::whole(produced)
    }

    #[inline]
    fn len(&self) -> usize {
        Buffer::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.cap()
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        Buffer::truncate(self, len);
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.buf()
    }
}

/// The storage strategies a [`FormatTarget`] can write into.
///
/// This is a closed set: dispatch is a `match` on the variant rather than a virtual call.
#[derive(Debug)]
pub(crate) enum Storage<'a> {
    /// A caller-owned growable buffer.
    Borrowed(&'a mut Buffer),
    /// A growable buffer owned by the target.
    Owned(Buffer),
    /// A caller-owned fixed region.
    Fixed(FixedRegion<'a>),
}

macro_rules! dispatch {
    ($storage:expr, $sink:ident => $call:expr) => {
        match $storage {
            Storage::Borrowed($sink) => $call,
            Storage::Owned($sink) => $call,
            Storage::Fixed($sink) => $call,
        }
    };
}

impl Sink for Storage<'_> {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Put {
        dispatch!(self, sink => sink.put(bytes))
    }

    #[inline]
    fn put_with<F>(&mut self, reserve: usize, tail: usize, f: F) -> Put
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        dispatch!(self, sink => sink.put_with(reserve, tail, f))
    }

    #[inline]
    fn len(&self) -> usize {
        dispatch!(self, sink => sink.len())
    }

    #[inline]
    fn capacity(&self) -> usize {
        dispatch!(self, sink => sink.capacity())
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        dispatch!(self, sink => sink.truncate(len))
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        dispatch!(self, sink => sink.bytes())
    }
}

/// A destination for formatted text.
///
/// `FormatTarget` is never constructed directly. Build one of the storage-specific wrappers,
/// which all dereference to it:
///
/// - [`BufferTarget`](crate::BufferTarget) writes into a caller-owned [`Buffer`].
/// - [`OwnedTarget`](crate::OwnedTarget) writes into a buffer it owns.
/// - [`FixedTarget`](crate::FixedTarget) writes into a caller-owned `&mut [u8]` and truncates.
/// - [`TerminatedTarget`](crate::TerminatedTarget) is a fixed target that is finalized with a
///   NUL terminator.
///
/// Functions that produce text should take `&mut FormatTarget<'_>`. Targets can't be cloned or
/// copied, so there is only ever one owner of a target's overflow state.
///
/// # Overflow
///
/// Only fixed targets can overflow. The write that crosses the end of the region keeps the bytes
/// that fit, after which [`size()`](Self::size) equals the capacity and every further write is a
/// no-op until [`restore_size()`](Self::restore_size) moves the end back.
///
/// The one exception is a reserve-and-write request that is larger than both the space left and
/// [`DISCARD_SIZE`](crate::constants::DISCARD_SIZE). Its writer gets a shorter slice, and a
/// `(pointer, last)` writer spends the final byte of the region on its `last` slot, so the target
/// can end up overflowed one byte short of its capacity.
pub struct FormatTarget<'a> {
    storage: Storage<'a>,
    flags: Flags,
}

impl<'a> FormatTarget<'a> {
    pub(crate) fn from_storage(storage: Storage<'a>) -> Self {
        let flags = match storage {
            Storage::Fixed(_) => Flags::FIXED,
            Storage::Borrowed(_) | Storage::Owned(_) => Flags::empty(),
        };

        Self { storage, flags }
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage<'a> {
        &self.storage
    }

    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut Storage<'a> {
        &mut self.storage
    }

    #[inline]
    pub(crate) fn into_storage(self) -> Storage<'a> {
        self.storage
    }

    /// Records the outcome of a write, raising the overflow flag if it was cut short.
    #[inline]
    fn settle(&mut self, put: Put) {
        if !put.is_short() {
            return;
        }

        debug_assert!(
            self.flags.contains(Flags::FIXED),
            "only fixed targets can overflow"
        );

        #[cfg(feature = "log")]
        log::debug!(
            "fixed format target overflowed at {} bytes, kept {} of {} bytes",
            self.storage.capacity(),
            put.kept,
            put.produced
        );

        self.flags.insert(Flags::OVERFLOWED);
    }

    /// Appends raw bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::FixedTarget;
    /// let mut region = [0u8; 5];
    /// let mut target = FixedTarget::new(&mut region);
    /// target.append(b"hello world");
    /// assert_eq!(target.as_bytes(), b"hello");
    /// assert_eq!(target.size(), 5);
    /// assert!(target.has_overflowed());
    /// ```
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        if self.has_overflowed() {
            return;
        }

        let put = self.storage.put(bytes);
        self.settle(put);
    }

    /// Appends a string slice.
    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.append(s.as_bytes());
    }

    /// Appends a single byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.append(core::slice::from_ref(&byte));
    }

    /// Appends a single character, UTF-8 encoded.
    ///
    /// A fixed target may keep only the leading bytes of the encoding.
    #[inline]
    pub fn push_char(&mut self, c: char) {
        self.append_str(c.encode_utf8(&mut [0; 4]));
    }

    /// Renders pre-parsed format arguments straight into the target.
    ///
    /// The result is byte-for-byte what rendering into a temporary and appending it would
    /// produce, without the temporary. Rendering stops as soon as the target overflows. See
    /// [`format_to!`](crate::format_to) for the macro form.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.render(format_args!("{}-{:03}", "id", 7));
    /// assert_eq!(target.as_str().unwrap(), "id-007");
    /// ```
    pub fn render(&mut self, args: fmt::Arguments<'_>) {
        if self.has_overflowed() {
            return;
        }

        if let Some(s) = args.as_str() {
            self.append_str(s);
            return;
        }

        // The only error is the one `Render` raises on overflow, which is recorded in the flags
        let _ = fmt::write(&mut Render(self), args);
    }

    /// Reserves room for `reserve` more bytes and hands it to `f` as a bounded slice.
    ///
    /// `f` writes its output at the start of the slice and returns how many bytes it wrote
    /// (clamped to the slice length). Growable targets always offer at least `reserve` bytes.
    /// Fixed targets offer their remaining space when it covers `reserve`; otherwise `f` runs
    /// against the target's discard region and only the part of its output that fits is kept, so
    /// the overflow flag is raised exactly when output was cut off.
    ///
    /// `f` must not index past the slice it is given. On a fixed target, a request larger than
    /// both the space left and [`DISCARD_SIZE`](crate::constants::DISCARD_SIZE) gets a shorter
    /// slice; if `f` fills all of it, the write counts as truncated and the overflow flag is
    /// raised.
    ///
    /// `f` is not called when the target has overflowed, or when the slice would be empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.write_with_span(8, |span| {
    ///     span[..3].copy_from_slice(b"abc");
    ///     3
    /// });
    /// assert_eq!(target.as_str().unwrap(), "abc");
    /// ```
    #[inline]
    pub fn write_with_span<F>(&mut self, reserve: usize, f: F)
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        self.put_with(reserve, 0, f);
    }

    /// Reserves room for `reserve` more bytes and hands it to `f` with a `last` slot.
    ///
    /// This is the form for writers that follow the "pointer and last" convention of C-style
    /// string routines: the final byte of the slice `f` receives is the `last` position, which `f`
    /// may use for a terminator but not for content. `f` returns the number of content bytes it
    /// wrote (clamped to one less than the slice length). The terminator never becomes part of
    /// the target's content and never takes the place of a content byte: `reserve` content bytes
    /// fit whenever the target has `reserve` bytes left.
    ///
    /// The same slice-length rules as [`write_with_span()`](Self::write_with_span) apply, counting
    /// the `last` slot as part of the request. `f` is only called when at least one content byte
    /// is available.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.write_with_last(2, |buf| {
    ///     buf[0] = b'o';
    ///     buf[1] = b'k';
    ///     buf[2] = 0;
    ///     2
    /// });
    /// assert_eq!(target.as_str().unwrap(), "ok");
    /// ```
    #[inline]
    pub fn write_with_last<F>(&mut self, reserve: usize, f: F)
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        self.put_with(reserve, 1, f);
    }

    #[inline]
    fn put_with<F>(&mut self, reserve: usize, tail: usize, f: F)
    where
        F: FnOnce(&mut [u8]) -> usize,
    {
        if self.has_overflowed() {
            return;
        }

        let put = self.storage.put_with(reserve, tail, f);
        self.settle(put);
    }

    /// Returns the number of bytes written so far.
    ///
    /// For a fixed target that has overflowed this is its capacity.
    #[inline]
    pub fn size(&self) -> usize {
        self.storage.len()
    }

    /// Moves the end of the written data back to a previously observed `size`.
    ///
    /// Capacity is kept. Because `size` is never past the capacity, this always clears the
    /// overflow flag of a fixed target.
    ///
    /// `size` must not be larger than [`size()`](Self::size). This is checked in debug builds; in
    /// release builds a larger value only clears the overflow flag.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::FixedTarget;
    /// let mut region = [0u8; 8];
    /// let mut target = FixedTarget::new(&mut region);
    /// target.append(b"key=");
    /// let mark = target.size();
    ///
    /// target.append(b"too long to fit");
    /// assert!(target.has_overflowed());
    ///
    /// target.restore_size(mark);
    /// assert!(!target.has_overflowed());
    /// target.append(b"42");
    /// assert_eq!(target.as_bytes(), b"key=42");
    /// ```
    pub fn restore_size(&mut self, size: usize) {
        debug_assert!(
            size <= self.size(),
            "restored size {size} is past the written size {}",
            self.size()
        );

        self.storage.truncate(size);

        if self.flags.contains(Flags::OVERFLOWED) {
            #[cfg(feature = "log")]
            log::trace!("fixed format target restored to {size} bytes, overflow cleared");

            self.flags.remove(Flags::OVERFLOWED);
        }
    }

    /// Returns `true` once a write has been cut short.
    ///
    /// Always `false` for growable targets.
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        self.flags.contains(Flags::OVERFLOWED)
    }

    /// Returns `true` if the target writes into a fixed-capacity region.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(Flags::FIXED)
    }

    /// Returns the number of bytes the target can hold without reallocating.
    ///
    /// For fixed targets this is the hard limit.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns the bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.bytes()
    }
}

impl fmt::Debug for FormatTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatTarget")
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("flags", &self.flags)
            .finish()
    }
}

/// Writing through `fmt::Write` never fails: text that doesn't fit is dropped.
impl fmt::Write for FormatTarget<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push_char(c);
        Ok(())
    }

    #[inline]
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.render(args);
        Ok(())
    }
}

/// Writing through `io::Write` never fails either: every byte is reported as accepted so
/// `write_all` doesn't spin on a full target.
#[cfg(feature = "std")]
impl std::io::Write for FormatTarget<'_> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Adapter handed to the `core::fmt` engine by [`FormatTarget::render`].
///
/// Unlike the public `fmt::Write` impl it raises `fmt::Error` once the target overflows, which
/// stops the engine from producing text that would be dropped anyway.
struct Render<'t, 'a>(&'t mut FormatTarget<'a>);

impl fmt::Write for Render<'_, '_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.append_str(s);

        if self.0.has_overflowed() {
            Err(fmt::Error)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
