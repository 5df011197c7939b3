//! Named constants for the chunk codec, in place of magic numbers scattered
//! across the bit-level modules.

/// Default chunk capacity in bytes, matching the Gorilla paper's two-hour
/// block sizing for typical sampling intervals.
pub const DEFAULT_CHUNK_CAPACITY: usize = 2 * 1024;

/// Width in bits of the leading-zero-count field in a new XOR window
/// The field can only represent `0..=31`, so leading-zero counts are
/// clamped to this value before being written.
pub const XOR_LEADING_BITS: u32 = 5;

/// Maximum value the `XOR_LEADING_BITS`-wide field can hold; leading-zero
/// counts above this are silently clamped to it.
pub const XOR_LEADING_CLAMP: u32 = (1 << XOR_LEADING_BITS) - 1;

/// Width in bits of the significant-block-size field in a new XOR window,
/// stored with a bias of `-1` so that the range `1..=64` fits six bits.
pub const XOR_BLOCK_SIZE_BITS: u32 = 6;

/// One bucket of the delta-of-delta prefix code. The prefix is
/// `ones` consecutive `1` bits; for every bucket but the escape it is then
/// terminated by a `0` bit. The escape bucket is six `1` bits with no
/// terminator, so `ones == 6` is distinguishable from `ones == 5` (which is
/// always followed by a `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaBucket {
    /// Number of leading `1` bits in the prefix.
    pub ones: u32,
    /// Whether the prefix is terminated by a `0` bit (false only for the
    /// escape bucket).
    pub terminated: bool,
    /// Width in bits of the signed payload following the prefix. `0` for
    /// the degenerate `Δ = 0` bucket.
    pub payload_width: u32,
}

/// The six delta-of-delta buckets plus the 64-bit escape, in the order the
/// encoder tries them, narrowest first.
pub const DELTA_BUCKETS: [DeltaBucket; 7] = [
    DeltaBucket { ones: 0, terminated: true, payload_width: 0 },
    DeltaBucket { ones: 1, terminated: true, payload_width: 5 },
    DeltaBucket { ones: 2, terminated: true, payload_width: 8 },
    DeltaBucket { ones: 3, terminated: true, payload_width: 11 },
    DeltaBucket { ones: 4, terminated: true, payload_width: 15 },
    DeltaBucket { ones: 5, terminated: true, payload_width: 32 },
    DeltaBucket { ones: 6, terminated: false, payload_width: 64 },
];

/// Index of the 64-bit escape bucket within [`DELTA_BUCKETS`].
pub const DELTA_ESCAPE_INDEX: usize = DELTA_BUCKETS.len() - 1;
