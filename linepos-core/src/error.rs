//! Index error types.

use thiserror::Error;

use crate::types::{LineCount, LineNumber};

/// Errors raised by offset storages and line indices.
///
/// Both variants are programmer errors: the caller asked for a line that
/// does not exist. Nothing in this crate retries or recovers from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Requested line is past the end of the storage
    #[error("line number not in storage: {line}, storage size is {size}")]
    OutOfRange { line: LineNumber, size: LineCount },

    /// Tried to remove the last entry of an empty storage
    #[error("cannot pop from an empty line storage")]
    Empty,
}
