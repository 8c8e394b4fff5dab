//! Offset storage backends.
//!
//! A storage is an ordered sequence of [`ByteOffset`]s, one per line end, in
//! file order. [`RawOffsets`] is a plain vector and is fast to build;
//! [`CompactOffsets`] bit-packs the sequence and is meant for indices kept
//! alive for the whole lifetime of a large file. Both honour the same
//! contract, so [`LineOffsetIndex`](crate::LineOffsetIndex) is generic over
//! them and never pays for dynamic dispatch.

mod compact;
mod raw;

pub use compact::CompactOffsets;
pub use raw::RawOffsets;

use tracing::error;

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::types::{ByteOffset, LineCount, LineNumber};

/// Operations shared by every offset storage.
///
/// Offsets are expected to be strictly increasing. Storages do not enforce
/// it; feeding them out of order gives unspecified (but memory safe) results.
pub trait OffsetStorage: Default {
    /// Create a storage tuned by `config`
    fn with_config(_config: &IndexConfig) -> Self {
        Self::default()
    }

    /// Append the passed end-of-line to the storage
    fn append(&mut self, pos: ByteOffset);

    /// Number of stored entries
    fn size(&self) -> LineCount;

    /// Entry at `line`, or [`IndexError::OutOfRange`]
    fn at(&self, line: LineNumber) -> Result<ByteOffset, IndexError>;

    /// Copy of the entries `[first, first + count)`.
    ///
    /// The range is clipped to the storage: asking past the end silently
    /// returns fewer entries, and an empty vector if `first` is out of range.
    fn range(&self, first: LineNumber, count: LineCount) -> Vec<ByteOffset>;

    /// Add all `positions` after the existing entries, in order
    fn append_list(&mut self, positions: &[ByteOffset]);

    /// Remove and return the last entry
    fn pop_back(&mut self) -> Result<ByteOffset, IndexError>;

    /// Bytes used by the stored entries
    fn allocated_size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == LineCount::new(0)
    }

    fn last(&self) -> Option<ByteOffset> {
        let size = self.size().get();
        let last = size.checked_sub(1)?;
        self.at(LineNumber::new(last)).ok()
    }
}

/// Build the out-of-range error, logging it the way every backend does
pub(crate) fn out_of_range(line: LineNumber, size: LineCount) -> IndexError {
    error!(%line, %size, "line number not in storage");
    IndexError::OutOfRange { line, size }
}

/// Resolve `[first, first + count)` against `len` entries into slice bounds
pub(crate) fn clip_range(first: LineNumber, count: LineCount, len: usize) -> (usize, usize) {
    let begin = first.as_index().min(len);
    let end = begin.saturating_add(count.as_len()).min(len);
    (begin, end)
}
