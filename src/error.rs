//! Error types for the chunk codec

use thiserror::Error;

/// Result type alias for chunk operations
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Chunk codec error types.
///
/// Capacity exhaustion and end-of-stream are *not* represented here, per
/// the codec's contract they are ordinary control-flow outcomes
/// ([`crate::chunk::AppendOutcome`] and `Option::None`), not failures. This
/// enum only carries the precondition-violation / corruption class of error.
#[derive(Error, Debug, PartialEq)]
pub enum ChunkError {
    /// Caller attempted to append a timestamp earlier than the last one
    /// appended to this chunk.
    #[error("non-monotonic timestamp: {next} precedes previous {prev}")]
    NonMonotonicTimestamp {
        /// Previously appended timestamp
        prev: u64,
        /// Rejected timestamp
        next: u64,
    },

    /// A bit buffer operation was asked to read or write a width outside
    /// `1..=64`.
    #[error("bit width out of range: {width} (must be 1..=64)")]
    BitWidthOutOfRange {
        /// The offending width
        width: u32,
    },

    /// Header checksum did not match its payload.
    #[error("header checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum recorded in the header
        expected: u32,
        /// Checksum recomputed from the header fields
        actual: u32,
    },

    /// A header or payload failed to deserialize: truncated input or a bad
    /// length field.
    #[error("chunk data corrupted: {0}")]
    Corruption(String),
}

impl ChunkError {
    /// Check if this error indicates on-disk/on-wire corruption rather than
    /// a caller precondition violation.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ChunkError::Corruption(_) | ChunkError::ChecksumMismatch { .. }
        )
    }
}
