use std::ops::Range;

use tracing::{debug, trace};

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::storage::{CompactOffsets, OffsetStorage, RawOffsets};
use crate::types::{ByteOffset, LineCount, LineNumber};

/// What the last stored entry stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// Nothing stored yet
    Empty,
    /// Last entry is the position right after a real line terminator
    Real,
    /// Last entry marks the end of file for an unterminated final line
    Synthetic,
}

/// List of end-of-line positions for a file.
///
/// On top of the offsets kept by the storage `S`, it remembers whether the
/// last entry is a synthetic end of file appended for a file that does not
/// end with a line terminator. That entry is removed as soon as more data
/// arrives, either through [`append`](Self::append) or
/// [`append_list`](Self::append_list).
///
/// The index is move-only: it can hold tens of millions of entries, so it
/// implements neither `Clone` nor `Copy`. Use [`duplicate`](Self::duplicate)
/// when a full copy is really wanted, and `std::mem::take` to move it out of
/// a live binding.
///
/// ```compile_fail
/// use linepos_core::FastLineIndex;
///
/// let index = FastLineIndex::new();
/// let copy = index.clone();
/// ```
///
/// ```compile_fail
/// use linepos_core::CompactLineIndex;
///
/// let index = CompactLineIndex::new();
/// let moved = index;
/// let _ = index.size();
/// ```
#[derive(Debug, Default)]
pub struct LineOffsetIndex<S: OffsetStorage> {
    array: S,
    synthetic_tail: bool,
}

/// Index over the uncompressed storage, fast to build
pub type FastLineIndex = LineOffsetIndex<RawOffsets>;

/// Index over the compressed storage, for long-lived indices of large files
pub type CompactLineIndex = LineOffsetIndex<CompactOffsets>;

impl<S: OffsetStorage> LineOffsetIndex<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &IndexConfig) -> Self {
        Self {
            array: S::with_config(config),
            synthetic_tail: false,
        }
    }

    /// Add a new line position.
    ///
    /// `pos` must be greater than the previous one; this is only checked in
    /// debug builds. A synthetic tail, if any, is dropped first.
    pub fn append(&mut self, pos: ByteOffset) {
        self.retract_synthetic_tail();

        debug_assert!(
            self.array.last().is_none_or(|last| pos > last),
            "line offsets must be strictly increasing"
        );
        self.array.append(pos);
    }

    /// Flag the entry just appended as a synthetic end of file.
    ///
    /// Must be called right after `append`-ing the end of file for an
    /// unterminated last line.
    pub fn mark_synthetic_tail(&mut self) {
        self.set_synthetic_tail(true);
    }

    /// Set the synthetic tail flag; ignored on an empty index
    pub fn set_synthetic_tail(&mut self, synthetic: bool) {
        self.synthetic_tail = synthetic && !self.array.is_empty();
    }

    pub fn has_synthetic_tail(&self) -> bool {
        self.synthetic_tail
    }

    pub fn tail_state(&self) -> TailState {
        if self.array.is_empty() {
            TailState::Empty
        } else if self.synthetic_tail {
            TailState::Synthetic
        } else {
            TailState::Real
        }
    }

    /// Add a freshly scanned chunk after this one.
    ///
    /// Our synthetic tail, if any, is removed first. The merged index then
    /// ends the way `other` ends: synthetic if `other` has a synthetic tail.
    /// All positions in `other` must be greater than ours (unchecked in
    /// release builds).
    pub fn append_list(&mut self, other: &FastLineIndex) {
        self.retract_synthetic_tail();

        debug_assert!(
            match (self.array.last(), other.array.as_slice().first()) {
                (Some(last), Some(&first)) => first > last,
                _ => true,
            },
            "merged line offsets must follow the existing ones"
        );
        self.array.append_list(other.array.as_slice());
        self.synthetic_tail = other.synthetic_tail;

        debug!(
            appended = %other.size(),
            total = %self.size(),
            synthetic_tail = self.synthetic_tail,
            "merged line positions"
        );
    }

    /// Number of lines, a synthetic tail included
    pub fn size(&self) -> LineCount {
        self.array.size()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// End position of `line`
    pub fn at(&self, line: LineNumber) -> Result<ByteOffset, IndexError> {
        self.array.at(line)
    }

    /// End positions of `count` lines from `first`, clipped to the index
    pub fn range(&self, first: LineNumber, count: LineCount) -> Vec<ByteOffset> {
        self.array.range(first, count)
    }

    pub fn last(&self) -> Option<ByteOffset> {
        self.array.last()
    }

    /// Byte range of `line`, terminator included
    pub fn line_span(&self, line: LineNumber) -> Result<Range<ByteOffset>, IndexError> {
        let end = self.array.at(line)?;
        let start = match line.get().checked_sub(1) {
            Some(previous) => self.array.at(LineNumber::new(previous))?,
            None => ByteOffset::default(),
        };
        Ok(start..end)
    }

    /// Bytes used by the backing storage
    pub fn allocated_size(&self) -> usize {
        self.array.allocated_size()
    }

    /// Full copy of this index, O(n) in time and memory
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::new();
        copy.array
            .append_list(&self.array.range(LineNumber::new(0), self.array.size()));
        copy.synthetic_tail = self.synthetic_tail;
        copy
    }

    /// Backing storage
    pub fn storage(&self) -> &S {
        &self.array
    }

    fn retract_synthetic_tail(&mut self) {
        if !std::mem::take(&mut self.synthetic_tail) {
            return;
        }

        // The flag is never set on an empty storage
        if let Ok(pos) = self.array.pop_back() {
            trace!(%pos, "retracted synthetic tail");
        }
    }
}

impl FastLineIndex {
    /// Borrow the stored offsets
    pub fn as_slice(&self) -> &[ByteOffset] {
        self.array.as_slice()
    }
}
