//! Gorilla-style time-series chunk codec
//!
//! Implements the compression technique from Facebook's paper:
//! "Gorilla: A Fast, Scalable, In-Memory Time Series Database":
//! delta-of-delta encoding for timestamps and XOR encoding for IEEE-754
//! doubles, bit-packed into a fixed-capacity byte buffer.
//!
//! # Architecture
//!
//! - [`bitbuffer`]: fixed-capacity bit buffer addressed as 64-bit bins,
//!   plus the delta-of-delta integer codec built on top of it.
//! - [`value`]: the XOR double codec.
//! - [`chunk`]: [`chunk::Chunk`], the append-only encoder, and
//!   [`chunk::ChunkIter`], the sequential decoder.
//! - [`header`]: on-wire framing of a chunk's metadata for an external
//!   collaborator (persistence, network transport) to use.
//!
//! This crate owns none of the chunk allocation/lifecycle, series or
//! database structures, configuration, or network transport that an
//! enclosing time-series database would layer on top of it; those are
//! external collaborators.

mod bitbuffer;
pub mod chunk;
pub mod config;
mod error;
pub mod header;
mod value;

pub use chunk::{AppendOutcome, Chunk, ChunkIter};
pub use error::{ChunkError, Result};
pub use header::ChunkHeader;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
