//! Construction errors.
//!
//! Writes never fail, so the only errors in this crate come from handing a target a region it
//! can't work with.

use core::fmt;

/// A caller-supplied region that can't back a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegionError {
    /// The region has no room for a terminator.
    Empty,
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "region has no room for a terminator"),
        }
    }
}

impl core::error::Error for RegionError {}
