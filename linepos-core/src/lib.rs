//! Line number to byte offset index for large and growing text files.
//!
//! Offsets of line ends are fed in file order, either one by one with
//! [`LineOffsetIndex::append`] or chunk by chunk with
//! [`LineOffsetIndex::append_list`], and looked up by line number without
//! re-scanning the file.
//!
//! ```
//! use linepos_core::{ByteOffset, FastLineIndex, LineCount, LineNumber};
//!
//! let mut index = FastLineIndex::new();
//! index.append(ByteOffset::new(4)); // "abc\n"
//! index.append(ByteOffset::new(9)); // "defg\n"
//!
//! assert_eq!(index.size(), LineCount::new(2));
//! assert_eq!(index.at(LineNumber::new(1)), Ok(ByteOffset::new(9)));
//! assert_eq!(
//!     index.range(LineNumber::new(0), LineCount::new(2)),
//!     vec![ByteOffset::new(4), ByteOffset::new(9)]
//! );
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod line_index;
#[cfg(feature = "scan")]
pub mod scan;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use config::IndexConfig;
pub use error::IndexError;
pub use line_index::{CompactLineIndex, FastLineIndex, LineOffsetIndex, TailState};
#[cfg(feature = "scan")]
pub use scan::{TailingIndexer, index_chunk};
pub use storage::{CompactOffsets, OffsetStorage, RawOffsets};
pub use types::{ByteOffset, LineCount, LineNumber};
