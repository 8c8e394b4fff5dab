//! Line terminator discovery for whole files and growing ("tailed") files.

use std::ops::Range;

use tracing::debug;

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::line_index::{CompactLineIndex, FastLineIndex};
use crate::types::{ByteOffset, LineNumber};

/// Index the line ends found in `chunk`, which starts at `start` in the file.
///
/// Each `\n` yields the offset right after it, so `"abc\n"` at offset 0
/// gives a single entry, 4. Bytes after the last `\n` are left out.
pub fn index_chunk(start: ByteOffset, chunk: &[u8]) -> FastLineIndex {
    let mut index = FastLineIndex::new();
    scan_terminators(&mut index, start, chunk);
    index
}

fn scan_terminators(index: &mut FastLineIndex, start: ByteOffset, chunk: &[u8]) {
    for newline_pos in memchr::memchr_iter(b'\n', chunk) {
        index.append(start + (newline_pos as u64 + 1));
    }
}

/// Builds a compact index for a file whose content arrives over time.
///
/// Data is scanned in chunks into fast indices, each folded into the
/// long-lived compact index. While the file does not end with a line
/// terminator, its last line is kept as a synthetic tail at the current end
/// of file, replaced once the line is completed.
#[derive(Debug, Default)]
pub struct TailingIndexer {
    index: CompactLineIndex,
    scanned_len: u64,
    config: IndexConfig,
}

impl TailingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            index: CompactLineIndex::with_config(&config),
            scanned_len: 0,
            config,
        }
    }

    /// Scan `data`, the bytes appended to the file since the last call
    pub fn feed(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let mut chunks = data.chunks(self.config.chunk_size.max(1)).peekable();
        while let Some(chunk) = chunks.next() {
            let start = ByteOffset::new(self.scanned_len);
            let mut lines = FastLineIndex::with_config(&self.config);
            scan_terminators(&mut lines, start, chunk);
            self.scanned_len += chunk.len() as u64;

            if chunks.peek().is_none() && chunk.last() != Some(&b'\n') {
                lines.append(ByteOffset::new(self.scanned_len));
                lines.mark_synthetic_tail();
            }

            debug!(
                %start,
                bytes = chunk.len(),
                lines = %lines.size(),
                "indexed chunk"
            );
            self.index.append_list(&lines);
        }
    }

    /// Bytes scanned so far, which is the known file size
    pub fn scanned_len(&self) -> u64 {
        self.scanned_len
    }

    pub fn index(&self) -> &CompactLineIndex {
        &self.index
    }

    /// Give the finished index away, leaving the indexer empty
    pub fn take_index(&mut self) -> CompactLineIndex {
        self.scanned_len = 0;
        std::mem::take(&mut self.index)
    }

    pub fn into_index(self) -> CompactLineIndex {
        self.index
    }

    /// Byte range of `line` in the file, terminator included
    pub fn line_span(&self, line: LineNumber) -> Result<Range<ByteOffset>, IndexError> {
        self.index.line_span(line)
    }
}
