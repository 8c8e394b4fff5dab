#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Thin newtypes over `u64` used throughout the index.
///
/// Each type gets the same conversions and formatting; arithmetic is added
/// per type below, only where it has a meaning.
macro_rules! impl_strong_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Get the raw value
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_strong_type!(
    /// Position within a file, in bytes from its start
    ByteOffset
);
impl_strong_type!(
    /// Zero-based line index
    LineNumber
);
impl_strong_type!(
    /// Number of lines
    LineCount
);

impl ByteOffset {
    /// Distance in bytes from `earlier` to `self`, saturating at zero
    pub fn distance_from(self, earlier: ByteOffset) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for ByteOffset {
    type Output = ByteOffset;

    fn add(self, rhs: u64) -> ByteOffset {
        ByteOffset(self.0 + rhs)
    }
}

impl AddAssign<u64> for ByteOffset {
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

impl Add<LineCount> for LineNumber {
    type Output = LineNumber;

    fn add(self, rhs: LineCount) -> LineNumber {
        LineNumber(self.0 + rhs.0)
    }
}

impl Sub<LineNumber> for LineCount {
    type Output = LineCount;

    /// Lines remaining after `rhs`, zero if `rhs` is past the end
    fn sub(self, rhs: LineNumber) -> LineCount {
        LineCount(self.0.saturating_sub(rhs.0))
    }
}

impl LineNumber {
    /// Index usable with slices; line numbers beyond `usize` saturate
    pub(crate) fn as_index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl LineCount {
    pub(crate) fn from_len(len: usize) -> Self {
        Self(len as u64)
    }

    pub(crate) fn as_len(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    /// True when `line` addresses an existing entry
    pub fn contains(self, line: LineNumber) -> bool {
        line.0 < self.0
    }
}
