//! Integer to text without an intermediate allocation.
//!
//! These writers reserve room for the widest possible output and produce their digits in place
//! through [`FormatTarget::write_with_span`]. On a fixed target that is nearly full they run
//! against the discard region instead, so a number that doesn't fit is truncated like any other
//! write.

use crate::target::FormatTarget;

/// Longest decimal rendering of a `u64` (`18446744073709551615`).
const MAX_DECIMAL_LEN: usize = 20;

/// Longest decimal rendering of an `i64` (`-9223372036854775808`).
const MAX_SIGNED_DECIMAL_LEN: usize = 20;

/// Longest `0x`-prefixed hexadecimal rendering of a `u64`.
const MAX_HEX_LEN: usize = 18;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

impl FormatTarget<'_> {
    /// Appends `value` in decimal.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.append_u64(0);
    /// target.push(b' ');
    /// target.append_u64(u64::MAX);
    /// assert_eq!(target.as_str().unwrap(), "0 18446744073709551615");
    /// ```
    #[inline]
    pub fn append_u64(&mut self, value: u64) {
        self.write_with_span(MAX_DECIMAL_LEN, |span| write_decimal(value, span));
    }

    /// Appends `value` in decimal, with a leading `-` when negative.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::FixedTarget;
    /// let mut region = [0u8; 4];
    /// let mut target = FixedTarget::new(&mut region);
    /// target.append_i64(-12345);
    /// assert_eq!(target.as_str().unwrap(), "-123");
    /// assert!(target.has_overflowed());
    /// ```
    #[inline]
    pub fn append_i64(&mut self, value: i64) {
        self.write_with_span(MAX_SIGNED_DECIMAL_LEN, |span| {
            if value >= 0 {
                return write_decimal(value.unsigned_abs(), span);
            }

            match span.split_first_mut() {
                Some((sign, digits)) => {
                    *sign = b'-';
                    write_decimal(value.unsigned_abs(), digits).saturating_add(1)
                }
                None => 0,
            }
        });
    }

    /// Appends `value` in lowercase hexadecimal with a `0x` prefix, matching `{:#x}`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fmt_target::OwnedTarget;
    /// let mut target = OwnedTarget::new();
    /// target.append_hex(0xbeef);
    /// assert_eq!(target.as_str().unwrap(), "0xbeef");
    /// ```
    #[inline]
    pub fn append_hex(&mut self, value: u64) {
        self.write_with_span(MAX_HEX_LEN, |span| write_hex(value, span));
    }
}

/// Number of decimal digits in `value`.
#[expect(clippy::arithmetic_side_effects, reason = "Bounded by the digit count of u64")]
fn decimal_len(mut value: u64) -> usize {
    let mut len = 1;

    while value >= 10 {
        value /= 10;
        len += 1;
    }

    len
}

/// Writes `value` in decimal at the start of `span`, returning the digit count, or 0 if `span` is
/// too short.
#[expect(clippy::arithmetic_side_effects, reason = "A remainder of 10 always fits in u8")]
fn write_decimal(mut value: u64, span: &mut [u8]) -> usize {
    let len = decimal_len(value);

    let Some(digits) = span.get_mut(..len) else {
        return 0;
    };

    // Fill from the least significant digit
    for slot in digits.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }

    len
}

/// Writes `value` as `0x`-prefixed hexadecimal at the start of `span`, returning the length, or 0
/// if `span` is too short.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "A nibble always indexes HEX_DIGITS"
)]
fn write_hex(mut value: u64, span: &mut [u8]) -> usize {
    // Nibbles needed, at least one for zero
    let nibbles = (64 - value.leading_zeros() as usize).div_ceil(4).max(1);
    let len = 2 + nibbles;

    let Some(out) = span.get_mut(..len) else {
        return 0;
    };

    out[0] = b'0';
    out[1] = b'x';

    for slot in out[2..].iter_mut().rev() {
        *slot = HEX_DIGITS[(value & 0xf) as usize];
        value >>= 4;
    }

    len
}
