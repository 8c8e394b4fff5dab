use std::mem::size_of;

use super::{OffsetStorage, clip_range, out_of_range};
use crate::config::{DEFAULT_INITIAL_CAPACITY, IndexConfig};
use crate::error::IndexError;
use crate::types::{ByteOffset, LineCount, LineNumber};

/// Uncompressed storage: one `u64` per line.
///
/// Used for per-chunk indices while scanning, where build speed matters
/// more than footprint.
#[derive(Debug)]
pub struct RawOffsets {
    storage: Vec<ByteOffset>,
}

impl Default for RawOffsets {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }
}

impl RawOffsets {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
        }
    }

    /// Borrow the stored offsets
    pub fn as_slice(&self) -> &[ByteOffset] {
        &self.storage
    }
}

impl OffsetStorage for RawOffsets {
    fn with_config(config: &IndexConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    fn append(&mut self, pos: ByteOffset) {
        self.storage.push(pos);
    }

    fn size(&self) -> LineCount {
        LineCount::from_len(self.storage.len())
    }

    fn at(&self, line: LineNumber) -> Result<ByteOffset, IndexError> {
        self.storage
            .get(line.as_index())
            .copied()
            .ok_or_else(|| out_of_range(line, self.size()))
    }

    fn range(&self, first: LineNumber, count: LineCount) -> Vec<ByteOffset> {
        let (begin, end) = clip_range(first, count, self.storage.len());
        self.storage[begin..end].to_vec()
    }

    fn append_list(&mut self, positions: &[ByteOffset]) {
        self.storage.extend_from_slice(positions);
    }

    fn pop_back(&mut self) -> Result<ByteOffset, IndexError> {
        self.storage.pop().ok_or(IndexError::Empty)
    }

    fn allocated_size(&self) -> usize {
        self.storage.len() * size_of::<ByteOffset>()
    }

    fn last(&self) -> Option<ByteOffset> {
        self.storage.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(values: &[u64]) -> Vec<ByteOffset> {
        values.iter().copied().map(ByteOffset::new).collect()
    }

    #[test]
    fn preallocates() {
        let storage = RawOffsets::default();
        assert!(storage.storage.capacity() >= DEFAULT_INITIAL_CAPACITY);
        assert!(storage.is_empty());
        assert_eq!(storage.allocated_size(), 0);
    }

    #[test]
    fn append_and_read_back() {
        let mut storage = RawOffsets::with_capacity(2);
        storage.append_list(&offsets(&[4, 9, 20]));
        storage.append(ByteOffset::new(31));

        assert_eq!(storage.size(), LineCount::new(4));
        assert_eq!(storage.at(LineNumber::new(3)), Ok(ByteOffset::new(31)));
        assert_eq!(storage.last(), Some(ByteOffset::new(31)));
        assert_eq!(storage.as_slice(), offsets(&[4, 9, 20, 31]).as_slice());
        assert_eq!(storage.allocated_size(), 4 * 8);
    }

    #[test]
    fn at_past_end_fails() {
        let mut storage = RawOffsets::default();
        storage.append(ByteOffset::new(1));
        assert_eq!(
            storage.at(LineNumber::new(1)),
            Err(IndexError::OutOfRange {
                line: LineNumber::new(1),
                size: LineCount::new(1),
            })
        );
    }

    #[test]
    fn pop_back() {
        let mut storage = RawOffsets::default();
        assert_eq!(storage.pop_back(), Err(IndexError::Empty));
        storage.append_list(&offsets(&[3, 6]));
        assert_eq!(storage.pop_back(), Ok(ByteOffset::new(6)));
        assert_eq!(storage.as_slice(), offsets(&[3]).as_slice());
    }
}
