//! Tests for the FormatTarget
//!
//! These tests are in the same narrative order as the main file. Most of them run the same
//! sequence of writes against a growable and a fixed target and compare the two, since the whole
//! point of the contract is that call sites can't tell them apart until the fixed one runs out of
//! room.

#![expect(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::unwrap_used,
    reason = "Okay in tests"
)]

use super::*;
use crate::constants::DISCARD_SIZE;
use crate::{FixedTarget, OwnedTarget, TerminatedTarget, format_to};
use core::cell::Cell;

/// A mixed sequence of writes, covering every write path.
fn produce(out: &mut FormatTarget<'_>) {
    out.append(b"id=");
    out.append_u64(4096);
    out.push(b' ');
    format_to!(out, "{:>6}|{:<3}|", "name", 7);
    out.append_str("tail");
    format_to!(out, "static");
    out.write_with_span(5, |span| {
        span[..5].copy_from_slice(b"span!");
        5
    });
}

fn reference() -> Vec<u8> {
    let mut owned = OwnedTarget::new();
    produce(&mut owned);
    owned.as_bytes().to_vec()
}

// -----------------------------------------------------------------------------
// Put
// -----------------------------------------------------------------------------

#[test]
fn test_put() {
    assert_eq!(
        Put::whole(3),
        Put {
            produced: 3,
            kept: 3
        }
    );
    assert!(!Put::whole(0).is_short());
    assert!(
        Put {
            produced: 4,
            kept: 1
        }
        .is_short()
    );
}

// -----------------------------------------------------------------------------
// FormatTarget - Creation
// -----------------------------------------------------------------------------

#[test]
fn test_target_flags_on_creation() {
    let owned = OwnedTarget::new();
    assert_eq!(owned.flags, Flags::empty());
    assert!(!owned.is_fixed());

    let mut region = [0u8; 4];
    let fixed = FixedTarget::new(&mut region);
    assert_eq!(fixed.flags, Flags::FIXED);
    assert!(fixed.is_fixed());
    assert!(!fixed.has_overflowed());
}

// -----------------------------------------------------------------------------
// FormatTarget - Appending
// -----------------------------------------------------------------------------

#[test]
fn test_target_append_exactly_full() {
    let mut region = [0u8; 5];
    let mut target = FixedTarget::new(&mut region);

    target.append(b"hi");
    target.append(b"!!!");

    // Filling the region to the last byte is not an overflow
    assert_eq!(target.as_bytes(), b"hi!!!");
    assert!(!target.has_overflowed());

    // An empty write on a full target isn't either
    target.append(b"");
    assert!(!target.has_overflowed());

    target.push(b'?');
    assert!(target.has_overflowed());
    assert_eq!(target.as_bytes(), b"hi!!!");
}

#[test]
fn test_target_overflow_is_sticky() {
    let mut region = [0u8; 6];
    let mut target = FixedTarget::new(&mut region);

    target.append(b"abcdefgh");
    assert_eq!(target.as_bytes(), b"abcdef");
    assert!(target.has_overflowed());

    // Every later write is a no-op
    target.append(b"x");
    target.append_str("y");
    target.push(b'z');
    format_to!(target, "{}", 1);
    target.write_with_span(0, |_| unreachable!("overflowed targets don't run writers"));

    assert_eq!(target.as_bytes(), b"abcdef");
    assert_eq!(target.size(), target.capacity());
    assert!(target.has_overflowed());
}

#[test]
fn test_target_growable_never_overflows() {
    let mut target = OwnedTarget::new();

    for _ in 0..100 {
        target.append(b"0123456789");
    }

    assert_eq!(target.size(), 1000);
    assert!(!target.has_overflowed());
    assert!(target.capacity() >= 1000);
}

#[test]
fn test_target_push_char() {
    let mut region = [0u8; 3];
    let mut target = FixedTarget::new(&mut region);

    target.push_char('a');
    target.push_char('€');

    // Only the first two bytes of '€' fit
    assert_eq!(target.as_bytes(), b"a\xe2\x82");
    assert_eq!(target.as_str().unwrap(), "a");
    assert!(target.has_overflowed());
}

// -----------------------------------------------------------------------------
// FormatTarget - Rendering
// -----------------------------------------------------------------------------

#[test]
fn test_target_render_matches_format() {
    let mut target = OwnedTarget::new();
    let value = 3.25_f64;

    target.render(format_args!("{value:>8.3}|{:#06x}|{:?}", 255, "q"));

    assert_eq!(
        target.as_str().unwrap(),
        format!("{value:>8.3}|{:#06x}|{:?}", 255, "q")
    );
}

#[test]
fn test_target_render_static() {
    let mut region = [0u8; 3];
    let mut target = FixedTarget::new(&mut region);

    // No arguments, goes straight to append
    format_to!(target, "abcd");

    assert_eq!(target.as_bytes(), b"abc");
    assert!(target.has_overflowed());
}

/// Writes `x` one character at a time, counting how many writes were attempted.
struct Xs<'c> {
    count: usize,
    attempts: &'c Cell<usize>,
}

impl fmt::Display for Xs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.count {
            self.attempts.set(self.attempts.get() + 1);
            f.write_str("x")?;
        }

        Ok(())
    }
}

#[test]
fn test_target_render_stops_on_overflow() {
    let attempts = Cell::new(0);
    let xs = Xs {
        count: 100,
        attempts: &attempts,
    };

    let mut region = [0u8; 4];
    let mut target = FixedTarget::new(&mut region);
    format_to!(target, "{xs}{xs}");

    // Four fit, the fifth overflows and stops the engine
    assert_eq!(target.as_bytes(), b"xxxx");
    assert!(target.has_overflowed());
    assert_eq!(attempts.get(), 5);
}

#[test]
fn test_target_render_growable_runs_to_completion() {
    let attempts = Cell::new(0);
    let xs = Xs {
        count: 100,
        attempts: &attempts,
    };

    let mut target = OwnedTarget::new();
    format_to!(target, "{xs}{xs}");

    assert_eq!(target.size(), 200);
    assert_eq!(attempts.get(), 200);
}

// -----------------------------------------------------------------------------
// FormatTarget - Prefix property
// -----------------------------------------------------------------------------

#[test]
fn test_target_fixed_is_prefix_of_growable() {
    let full = reference();

    for capacity in 0..full.len() + 8 {
        let mut region = vec![0u8; capacity];
        let mut target = FixedTarget::new(&mut region);
        produce(&mut target);

        let kept = capacity.min(full.len());
        assert_eq!(target.as_bytes(), &full[..kept], "capacity {capacity}");
        assert_eq!(
            target.has_overflowed(),
            capacity < full.len(),
            "capacity {capacity}"
        );
    }
}

#[test]
fn test_target_large_fixed_matches_growable() {
    let full = reference();

    let mut region = [0u8; 256];
    let mut target = FixedTarget::new(&mut region);
    produce(&mut target);

    assert_eq!(target.as_bytes(), full.as_slice());
    assert!(!target.has_overflowed());
}

// -----------------------------------------------------------------------------
// FormatTarget - Reserve and write
// -----------------------------------------------------------------------------

#[test]
fn test_target_write_with_span_growable() {
    let mut target = OwnedTarget::new();
    target.append(b"> ");

    target.write_with_span(100, |span| {
        assert!(span.len() >= 100);
        span[..3].copy_from_slice(b"abc");
        3
    });

    assert_eq!(target.as_bytes(), b"> abc");
}

#[test]
fn test_target_write_with_span_clamps_reported_length() {
    let mut target = OwnedTarget::new();

    // Reporting more than the slice holds keeps only the slice
    target.write_with_span(4, |span| span.len() + 10);

    assert_eq!(target.size(), target.capacity());
}

#[test]
fn test_target_write_with_span_fixed_in_place() {
    let mut region = [0u8; 10];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    target.write_with_span(4, |span| {
        // The rest of the region
        assert_eq!(span.len(), 8);
        span[..4].copy_from_slice(b"cdef");
        4
    });

    assert_eq!(target.as_bytes(), b"abcdef");
    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_span_fixed_discard() {
    let mut region = [0u8; 5];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    target.write_with_span(6, |span| {
        // Runs against the discard region, which covers the request
        assert_eq!(span.len(), 6);
        span[..6].copy_from_slice(b"cdefgh");
        6
    });

    assert_eq!(target.as_bytes(), b"abcde");
    assert!(target.has_overflowed());
}

#[test]
fn test_target_write_with_span_fixed_discard_fits() {
    let mut region = [0u8; 5];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    // More room asked for than used, the output itself fits
    target.write_with_span(10, |span| {
        span[..2].copy_from_slice(b"cd");
        2
    });

    assert_eq!(target.as_bytes(), b"abcd");
    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_span_full_zero_reserve() {
    let mut region = [0u8; 2];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    target.write_with_span(0, |_| unreachable!("no space to offer"));

    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_last_growable() {
    let mut target = OwnedTarget::new();

    target.write_with_last(3, |buf| {
        // Room for the content and the `last` slot
        assert!(buf.len() >= 4);
        buf[..4].copy_from_slice(b"xyz\0");
        3
    });

    assert_eq!(target.as_bytes(), b"xyz");
}

#[test]
fn test_target_write_with_last_terminator_not_content() {
    let mut region = [0u8; 4];
    let mut target = FixedTarget::new(&mut region);

    // Claims one more byte than it may, the `last` slot is dropped
    target.write_with_last(3, |buf| {
        let len = buf.len();
        buf.fill(b'q');
        len
    });

    assert_eq!(target.as_bytes(), b"qqq");
    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_last_fixed_short() {
    let mut region = [0u8; 3];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    target.write_with_last(3, |buf| {
        buf[..4].copy_from_slice(b"cde\0");
        3
    });

    assert_eq!(target.as_bytes(), b"abc");
    assert!(target.has_overflowed());
}

/// A `(pointer, last)` writer that fills every content byte it is offered, up to `len`, and
/// terminates its output.
fn fill_terminated(buf: &mut [u8], len: usize) -> usize {
    let content = (buf.len() - 1).min(len);
    buf[..content].fill(b'w');
    buf[content] = 0;
    content
}

#[test]
fn test_target_write_with_last_exact_fit_large_region() {
    let mut region = [0u8; 2 * DISCARD_SIZE];
    let mut target = FixedTarget::new(&mut region);
    target.append(&[b'a'; DISCARD_SIZE + 10]);

    // The content fills the region to the last byte, only the `last` slot is past it
    let rest = target.capacity() - target.size();
    target.write_with_last(rest, |buf| fill_terminated(buf, rest));

    assert_eq!(target.size(), 2 * DISCARD_SIZE);
    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_last_exact_fit_terminated() {
    let mut region = [0u8; 2 * DISCARD_SIZE + 1];
    let mut target = TerminatedTarget::new(&mut region).unwrap();
    let capacity = target.capacity();

    // More than the discard region holds, the terminator byte is the `last` slot
    target.write_with_last(capacity, |buf| fill_terminated(buf, capacity));

    assert_eq!(target.size(), capacity);
    assert!(!target.has_overflowed());
    assert_eq!(target.finalize(), capacity);
    assert_eq!(region[capacity], 0);
}

#[test]
fn test_target_write_with_last_large_request_overflows() {
    let mut region = [0u8; 2 * DISCARD_SIZE];
    let mut target = FixedTarget::new(&mut region);

    // Larger than the discard region and no byte past the end: the last region byte goes to the
    // `last` slot, and losing a content byte to it is reported
    target.write_with_last(2 * DISCARD_SIZE, |buf| fill_terminated(buf, 2 * DISCARD_SIZE));

    assert_eq!(target.size(), 2 * DISCARD_SIZE - 1);
    assert!(target.has_overflowed());
}

#[test]
fn test_target_write_with_span_large_request_overflows() {
    let mut region = [0u8; DISCARD_SIZE + 16];
    let mut target = FixedTarget::new(&mut region);

    // The writer honours the slice it was given, which is shorter than the request
    target.write_with_span(2 * DISCARD_SIZE, |span| {
        let len = span.len().min(2 * DISCARD_SIZE);
        span[..len].fill(b'w');
        len
    });

    assert_eq!(target.size(), DISCARD_SIZE + 16);
    assert!(target.has_overflowed());
}

#[test]
fn test_target_write_with_span_large_request_fits() {
    let mut region = [0u8; DISCARD_SIZE + 16];
    let mut target = FixedTarget::new(&mut region);

    // Short slice, but the writer finishes well inside it
    target.write_with_span(2 * DISCARD_SIZE, |span| {
        span[..5].copy_from_slice(b"short");
        5
    });

    assert_eq!(target.as_bytes(), b"short");
    assert!(!target.has_overflowed());
}

#[test]
fn test_target_write_with_span_large_request_growable() {
    let mut target = OwnedTarget::new();

    // Growable targets always honour the full request
    target.write_with_span(4 * DISCARD_SIZE, |span| {
        span[..4 * DISCARD_SIZE].fill(b'w');
        4 * DISCARD_SIZE
    });

    assert_eq!(target.size(), 4 * DISCARD_SIZE);
}

// -----------------------------------------------------------------------------
// FormatTarget - Size and restore
// -----------------------------------------------------------------------------

#[test]
fn test_target_restore_size_clears_overflow() {
    let mut region = [0u8; 8];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"key=");
    let mark = target.size();

    target.append(b"far too long");
    assert!(target.has_overflowed());

    target.restore_size(mark);
    assert!(!target.has_overflowed());
    assert_eq!(target.as_bytes(), b"key=");

    // Same operations, same output as a fresh target
    target.append(b"42");
    assert_eq!(target.as_bytes(), b"key=42");
}

#[test]
fn test_target_restore_size_to_capacity() {
    let mut region = [0u8; 4];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"abcdef");

    // Restoring to the current size still clears the flag
    let size = target.size();
    target.restore_size(size);

    assert!(!target.has_overflowed());
    assert_eq!(target.as_bytes(), b"abcd");
}

#[test]
fn test_target_restore_size_growable() {
    let mut target = OwnedTarget::new();
    target.append(b"hello world");
    let capacity = target.capacity();

    target.restore_size(5);
    target.append(b"!");

    assert_eq!(target.as_bytes(), b"hello!");
    assert_eq!(target.capacity(), capacity);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "past the written size")]
fn test_target_restore_size_past_end() {
    let mut target = OwnedTarget::new();
    target.append(b"abc");

    target.restore_size(4);
}

// -----------------------------------------------------------------------------
// impl fmt::Write and io::Write
// -----------------------------------------------------------------------------

#[test]
fn test_target_fmt_write_never_fails() {
    use core::fmt::Write as _;

    let mut region = [0u8; 3];
    let mut target = FixedTarget::new(&mut region);

    assert!(write!(target, "{}{}", 12, 34).is_ok());
    assert!(target.write_str("more").is_ok());
    assert!(target.write_char('é').is_ok());

    assert_eq!(target.as_bytes(), b"123");
    assert!(target.has_overflowed());
}

#[test]
fn test_target_fmt_write_char() {
    use core::fmt::Write as _;

    let mut target = OwnedTarget::new();
    target.write_char('a').unwrap();
    target.write_char('ß').unwrap();

    assert_eq!(target.as_str().unwrap(), "aß");
}

#[test]
fn test_target_io_write_never_fails() {
    use std::io::Write as _;

    let mut region = [0u8; 4];
    let mut target = FixedTarget::new(&mut region);

    // `write_all` would loop forever on Ok(0)
    target.write_all(b"abcdefgh").unwrap();
    assert_eq!(target.write(b"ij").unwrap(), 2);
    target.flush().unwrap();

    assert_eq!(target.as_bytes(), b"abcd");
    assert!(target.has_overflowed());
}

#[test]
fn test_target_io_write_growable() {
    use std::io::Write as _;

    let mut target = OwnedTarget::new();
    write!(target, "{}-{}", "io", 1).unwrap();

    assert_eq!(target.as_str().unwrap(), "io-1");
}

// -----------------------------------------------------------------------------
// impl Debug
// -----------------------------------------------------------------------------

#[test]
fn test_target_debug() {
    let mut region = [0u8; 4];
    let mut target = FixedTarget::new(&mut region);
    target.append(b"ab");

    let debug = format!("{:?}", *target);
    assert!(debug.starts_with("FormatTarget"));
    assert!(debug.contains("size: 2"));
    assert!(debug.contains("capacity: 4"));
}
