//! Tuning knobs for building indices.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entries reserved up front by the raw backend; target files are large
pub const DEFAULT_INITIAL_CAPACITY: usize = 10_000;

/// Bytes handed to one fast index before it is folded into the long-lived one
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Index construction settings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Entries preallocated by each raw storage
    #[cfg_attr(feature = "serde", serde(default = "default_initial_capacity"))]
    pub initial_capacity: usize,

    /// Maximum bytes scanned into a single fast index
    #[cfg_attr(feature = "serde", serde(default = "default_chunk_size"))]
    pub chunk_size: usize,
}

#[cfg(feature = "serde")]
fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

#[cfg(feature = "serde")]
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl IndexConfig {
    /// Create with custom preallocation heuristics
    pub fn with_heuristics(initial_capacity: usize, chunk_size: usize) -> Self {
        Self {
            initial_capacity,
            // A zero chunk would never make progress
            chunk_size: chunk_size.max(1),
        }
    }
}
