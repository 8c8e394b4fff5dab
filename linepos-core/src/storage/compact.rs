use std::mem::size_of;

use tracing::trace;

use super::{OffsetStorage, clip_range, out_of_range};
use crate::error::IndexError;
use crate::types::{ByteOffset, LineCount, LineNumber};

/// Entries per packed block
const BLOCK_SIZE: usize = 128;

/// Compressed storage for increasing end-of-line offsets.
///
/// Entries are grouped in blocks of [`BLOCK_SIZE`]. The last, still open
/// block is kept as plain offsets. A full block is sealed with
/// frame-of-reference bit packing: its first offset goes to the block
/// metadata and every entry is stored as the distance from it, using only as
/// many bits as the largest distance of the block needs. Line ends in a log
/// file are close together, so a block of 128 lines typically costs a couple
/// of bytes per line instead of eight.
///
/// Any single entry decodes in constant time, without touching other blocks.
#[derive(Debug)]
pub struct CompactOffsets {
    blocks: Vec<BlockMetadata>,
    packed: Vec<u64>,
    current_block: Vec<ByteOffset>,
    nb_lines: usize,
}

#[derive(Debug, Clone, Copy)]
struct BlockMetadata {
    first_offset: ByteOffset,
    bit_width: u8,
    storage_offset: usize,
}

impl BlockMetadata {
    fn words<'a>(&self, packed: &'a [u64]) -> &'a [u64] {
        &packed[self.storage_offset..self.storage_offset + packed_words(self.bit_width)]
    }

    fn decode(&self, words: &[u64], index_in_block: usize) -> ByteOffset {
        let delta = unpack_one(words, self.bit_width, index_in_block);
        ByteOffset::new(self.first_offset.get().wrapping_add(delta))
    }
}

/// `u64` words holding one block packed at `bit_width` bits per entry
const fn packed_words(bit_width: u8) -> usize {
    BLOCK_SIZE * bit_width as usize / 64
}

fn pack(values: &[u64], bit_width: u8, out: &mut Vec<u64>) {
    let start = out.len();
    out.resize(start + packed_words(bit_width), 0);
    if bit_width == 0 {
        return;
    }

    let width = bit_width as usize;
    let words = &mut out[start..];
    for (index, &value) in values.iter().enumerate() {
        let bit = index * width;
        let (word, shift) = (bit / 64, bit % 64);
        words[word] |= value << shift;
        if shift + width > 64 {
            words[word + 1] |= value >> (64 - shift);
        }
    }
}

fn unpack_one(words: &[u64], bit_width: u8, index: usize) -> u64 {
    if bit_width == 0 {
        return 0;
    }

    let width = bit_width as usize;
    let bit = index * width;
    let (word, shift) = (bit / 64, bit % 64);
    let mut value = words[word] >> shift;
    if shift + width > 64 {
        value |= words[word + 1] << (64 - shift);
    }

    if width == 64 {
        value
    } else {
        value & ((1u64 << width) - 1)
    }
}

impl Default for CompactOffsets {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            packed: Vec::new(),
            current_block: Vec::with_capacity(BLOCK_SIZE),
            nb_lines: 0,
        }
    }
}

impl CompactOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    fn seal_current_block(&mut self) {
        let first_offset = self.current_block[0];
        // Wrapping keeps the encoding lossless even for out-of-order input
        let deltas: Vec<u64> = self
            .current_block
            .iter()
            .map(|pos| pos.get().wrapping_sub(first_offset.get()))
            .collect();
        let max_delta = deltas.iter().copied().max().unwrap_or(0);
        let bit_width = (u64::BITS - max_delta.leading_zeros()) as u8;

        let block = BlockMetadata {
            first_offset,
            bit_width,
            storage_offset: self.packed.len(),
        };
        pack(&deltas, bit_width, &mut self.packed);
        self.blocks.push(block);
        self.current_block.clear();

        trace!(
            block = self.blocks.len() - 1,
            %first_offset,
            bit_width,
            "sealed line offset block"
        );
    }

    /// Move the last sealed block back into the open block
    fn unseal_last_block(&mut self) {
        let Some(block) = self.blocks.pop() else {
            return;
        };

        let words = block.words(&self.packed);
        self.current_block
            .extend((0..BLOCK_SIZE).map(|index| block.decode(words, index)));
        self.packed.truncate(block.storage_offset);

        trace!(block = self.blocks.len(), "unsealed line offset block");
    }

    fn value(&self, index: usize) -> ByteOffset {
        let (block_index, index_in_block) = (index / BLOCK_SIZE, index % BLOCK_SIZE);
        match self.blocks.get(block_index) {
            Some(block) => block.decode(block.words(&self.packed), index_in_block),
            None => self.current_block[index_in_block],
        }
    }
}

impl OffsetStorage for CompactOffsets {
    fn append(&mut self, pos: ByteOffset) {
        debug_assert!(
            self.last().is_none_or(|last| pos > last),
            "line offsets must be stored in increasing order"
        );

        self.current_block.push(pos);
        self.nb_lines += 1;

        if self.current_block.len() == BLOCK_SIZE {
            self.seal_current_block();
        }
    }

    fn size(&self) -> LineCount {
        LineCount::from_len(self.nb_lines)
    }

    fn at(&self, line: LineNumber) -> Result<ByteOffset, IndexError> {
        if !self.size().contains(line) {
            return Err(out_of_range(line, self.size()));
        }

        Ok(self.value(line.as_index()))
    }

    fn range(&self, first: LineNumber, count: LineCount) -> Vec<ByteOffset> {
        let (begin, end) = clip_range(first, count, self.nb_lines);
        let mut result = Vec::with_capacity(end - begin);

        let mut index = begin;
        while index < end {
            let block_index = index / BLOCK_SIZE;
            let block_start = block_index * BLOCK_SIZE;
            let stop = end.min(block_start + BLOCK_SIZE);
            let (from, to) = (index - block_start, stop - block_start);

            match self.blocks.get(block_index) {
                Some(block) => {
                    let words = block.words(&self.packed);
                    result.extend((from..to).map(|i| block.decode(words, i)));
                }
                None => result.extend_from_slice(&self.current_block[from..to]),
            }

            index = stop;
        }

        result
    }

    fn append_list(&mut self, positions: &[ByteOffset]) {
        for &pos in positions {
            self.append(pos);
        }
    }

    fn pop_back(&mut self) -> Result<ByteOffset, IndexError> {
        if self.nb_lines == 0 {
            return Err(IndexError::Empty);
        }

        if self.current_block.is_empty() {
            // The last append sealed a block, reopen it to drop its last entry
            self.unseal_last_block();
        }

        let pos = self.current_block.pop().ok_or(IndexError::Empty)?;
        self.nb_lines -= 1;
        Ok(pos)
    }

    fn allocated_size(&self) -> usize {
        self.packed.len() * size_of::<u64>()
            + self.blocks.len() * size_of::<BlockMetadata>()
            + self.current_block.len() * size_of::<ByteOffset>()
    }

    fn last(&self) -> Option<ByteOffset> {
        self.nb_lines.checked_sub(1).map(|index| self.value(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: impl IntoIterator<Item = u64>) -> CompactOffsets {
        let mut storage = CompactOffsets::new();
        for value in values {
            storage.append(ByteOffset::new(value));
        }
        storage
    }

    #[test]
    fn pack_round_trips_every_width() {
        for bit_width in 0..=64u8 {
            let max = if bit_width == 0 {
                0
            } else {
                u64::MAX >> (64 - bit_width as u32)
            };
            let values: Vec<u64> = (0..BLOCK_SIZE as u64)
                .map(|i| if i % 3 == 0 { max } else { max / (i + 1) })
                .collect();

            let mut words = Vec::new();
            pack(&values, bit_width, &mut words);
            assert_eq!(words.len(), packed_words(bit_width));
            for (index, &value) in values.iter().enumerate() {
                assert_eq!(unpack_one(&words, bit_width, index), value, "width {bit_width}");
            }
        }
    }

    #[test]
    fn seals_full_blocks() {
        let storage = filled((1..=300).map(|line| line * 80));

        assert_eq!(storage.blocks.len(), 2);
        assert_eq!(storage.current_block.len(), 300 - 2 * BLOCK_SIZE);
        assert_eq!(storage.size(), LineCount::new(300));
        for line in 0..300u64 {
            assert_eq!(
                storage.at(LineNumber::new(line)),
                Ok(ByteOffset::new((line + 1) * 80))
            );
        }
    }

    #[test]
    fn smaller_than_raw_for_regular_lines() {
        let storage = filled((1..=10_000).map(|line| line * 120));
        // Deltas within a block stay under 2^14, so 14 bits per entry
        assert!(storage.allocated_size() < 10_000 * size_of::<u64>() / 3);
    }

    #[test]
    fn range_spans_blocks_and_open_block() {
        let storage = filled((0..200).map(|line| line * 2 + 1));

        let result = storage.range(LineNumber::new(120), LineCount::new(20));
        let expected: Vec<ByteOffset> = (120..140).map(|l| ByteOffset::new(l * 2 + 1)).collect();
        assert_eq!(result, expected);

        let tail = storage.range(LineNumber::new(190), LineCount::new(50));
        assert_eq!(tail.len(), 10);
        assert_eq!(tail.last(), Some(&ByteOffset::new(399)));

        assert!(storage.range(LineNumber::new(200), LineCount::new(1)).is_empty());
    }

    #[test]
    fn pop_back_reopens_sealed_block() {
        let mut storage = filled((1..=BLOCK_SIZE as u64).map(|line| line * 10));
        assert_eq!(storage.blocks.len(), 1);
        assert!(storage.current_block.is_empty());

        assert_eq!(storage.pop_back(), Ok(ByteOffset::new(1280)));
        assert!(storage.blocks.is_empty());
        assert!(storage.packed.is_empty());
        assert_eq!(storage.size(), LineCount::new(127));
        assert_eq!(storage.last(), Some(ByteOffset::new(1270)));

        // Refilling seals the block again with the new value
        storage.append(ByteOffset::new(1275));
        assert_eq!(storage.blocks.len(), 1);
        assert_eq!(storage.at(LineNumber::new(127)), Ok(ByteOffset::new(1275)));
    }

    #[test]
    fn pop_until_empty() {
        let mut storage = filled(1..=130);
        for expected in (1..=130).rev() {
            assert_eq!(storage.pop_back(), Ok(ByteOffset::new(expected)));
        }
        assert_eq!(storage.pop_back(), Err(IndexError::Empty));
        assert_eq!(storage.allocated_size(), 0);
    }

    #[test]
    fn huge_offsets_are_lossless() {
        let base = u64::MAX - 1_000_000;
        let storage = filled((0..BLOCK_SIZE as u64).map(|i| base + i * 7_000));
        assert_eq!(
            storage.at(LineNumber::new(127)),
            Ok(ByteOffset::new(base + 127 * 7_000))
        );
    }
}
