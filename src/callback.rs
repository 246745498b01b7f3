//! Formatting from inside a callback.
//!
//! [`from_fn`] turns a closure into a value that implements [`Display`](fmt::Display). When the
//! value is rendered, the closure gets a [`CallbackOutput`] that writes straight to wherever the
//! outer render is going, so it can issue its own nested renders without a temporary buffer and
//! without knowing what kind of target is on the other end.
//!
//! The output does no capacity tracking of its own: the outer target decides what fits.
//!
//! # Examples
//!
//! ```
//! use fmt_target::{FixedTarget, OwnedTarget, callback, format_to};
//!
//! let items = ["a", "b", "c"];
//! let list = callback::from_fn(|out| {
//!     for (i, item) in items.iter().enumerate() {
//!         if i > 0 {
//!             out.append_str(", ");
//!         }
//!         format_to!(out, "{i}={item}");
//!     }
//! });
//!
//! let mut owned = OwnedTarget::new();
//! format_to!(owned, "[{list}]");
//! assert_eq!(owned.as_str().unwrap(), "[0=a, 1=b, 2=c]");
//!
//! let mut region = [0u8; 6];
//! let mut fixed = FixedTarget::new(&mut region);
//! format_to!(fixed, "[{list}]");
//! assert_eq!(fixed.as_str().unwrap(), "[0=a, ");
//! ```

use core::fmt;

/// The output handed to a [`from_fn`] callback.
///
/// It wraps the [`fmt::Formatter`] of the render in progress. Once a write fails (typically
/// because the outer target overflowed) later writes are skipped and the failure is passed back
/// to the outer render. It can't be constructed or copied outside this module.
pub struct CallbackOutput<'f, 'a> {
    f: &'f mut fmt::Formatter<'a>,
    result: fmt::Result,
}

impl CallbackOutput<'_, '_> {
    /// Renders pre-parsed format arguments at the current position.
    ///
    /// Unlike writing to the formatter directly, the outer argument's width, fill and precision
    /// flags don't apply to nested renders.
    #[inline]
    pub fn render(&mut self, args: fmt::Arguments<'_>) {
        if self.result.is_ok() {
            self.result = self.f.write_fmt(args);
        }
    }

    /// Appends a string slice at the current position.
    #[inline]
    pub fn append_str(&mut self, s: &str) {
        if self.result.is_ok() {
            self.result = self.f.write_str(s);
        }
    }

    /// Appends a single character at the current position.
    ///
    /// Same as [`FormatTarget::push_char()`](crate::FormatTarget::push_char), so code that writes
    /// characters reads the same against either output.
    #[inline]
    pub fn push_char(&mut self, c: char) {
        self.append_str(c.encode_utf8(&mut [0; 4]));
    }
}

impl<'a> CallbackOutput<'_, 'a> {
    /// Returns the formatter of the render in progress, with the outer argument's flags.
    #[inline]
    pub fn formatter(&mut self) -> &mut fmt::Formatter<'a> {
        self.f
    }
}

impl fmt::Write for CallbackOutput<'_, '_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        self.result
    }

    #[inline]
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.render(args);
        self.result
    }
}

/// A [`Display`](fmt::Display) value that runs a callback when rendered.
///
/// Created by [`from_fn`].
#[derive(Clone, Copy)]
pub struct DisplayFn<F> {
    callback: F,
}

/// Wraps `callback` so it can be used as a formatting argument.
///
/// The callback runs every time the value is rendered, receiving a [`CallbackOutput`] positioned
/// where the value appears in the outer template.
///
/// # Examples
///
/// ```
/// use fmt_target::callback;
///
/// let celsius = 21.5_f64;
/// let temperature = callback::from_fn(|out| {
///     out.render(format_args!("{celsius:.1}°C / {:.1}°F", celsius * 9.0 / 5.0 + 32.0));
/// });
///
/// assert_eq!(temperature.to_string(), "21.5°C / 70.7°F");
/// ```
#[inline]
pub fn from_fn<F>(callback: F) -> DisplayFn<F>
where
    F: Fn(&mut CallbackOutput<'_, '_>),
{
    DisplayFn { callback }
}

impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut CallbackOutput<'_, '_>),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = CallbackOutput { f, result: Ok(()) };

        (self.callback)(&mut output);

        output.result
    }
}

impl<F> fmt::Debug for DisplayFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayFn").finish_non_exhaustive()
    }
}
