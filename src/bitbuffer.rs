//! Fixed-capacity bit buffer addressed as an array of 64-bit little-endian
//! "bins".
//!
//! Global bit `g` lives at bit `g mod 64` of bin `g / 64`, bit 0 being the
//! least significant bit of its bin. Callers are responsible for checking
//! capacity before every append/read, the way the chunk encoder's own
//! capacity pre-check does.

use crate::config::{DELTA_BUCKETS, DELTA_ESCAPE_INDEX, XOR_LEADING_CLAMP};

/// A fixed-size byte region viewed as a stream of bits.
///
/// `BitBuffer` never allocates after construction and never grows; running
/// past its capacity is a caller bug, checked with `debug_assert!` rather
/// than returned as an error, because by the time `append_bits` is called
/// the chunk encoder has already performed the capacity check that makes
/// this a true invariant.
#[derive(Debug, Clone)]
pub struct BitBuffer {
    bins: Vec<u64>,
    capacity_bits: usize,
}

impl BitBuffer {
    /// Create a zero-initialized buffer with room for `capacity_bytes`
    /// bytes (rounded up to a whole number of 64-bit bins).
    pub fn new(capacity_bytes: usize) -> Self {
        let num_bins = capacity_bytes.div_ceil(8);
        Self {
            bins: vec![0u64; num_bins],
            capacity_bits: capacity_bytes * 8,
        }
    }

    /// Total addressable capacity in bits.
    pub fn capacity_bits(&self) -> usize {
        self.capacity_bits
    }

    /// Append the low `n` bits of `v` (1 ≤ n ≤ 64) at cursor `g`, OR-ing
    /// them into the target bin(s). Assumes the destination bits are
    /// currently zero.
    pub fn append_bits(&mut self, g: usize, v: u64, n: u32) {
        debug_assert!((1..=64).contains(&n));
        debug_assert!(g + n as usize <= self.capacity_bits);

        let v = if n == 64 { v } else { v & ((1u64 << n) - 1) };
        let bin_idx = g / 64;
        let lbit = (g % 64) as u32;
        let avail = 64 - lbit;

        if avail as u64 >= n as u64 {
            self.bins[bin_idx] |= v << lbit;
        } else {
            self.bins[bin_idx] |= v << lbit;
            let remaining = n - avail;
            let upper = v >> avail;
            self.bins[bin_idx + 1] |= upper;
            let _ = remaining;
        }
    }

    /// Read `n` bits (1 ≤ n ≤ 64) starting at cursor `g`. The result's top
    /// `64 - n` bits are zero.
    pub fn read_bits(&self, g: usize, n: u32) -> u64 {
        debug_assert!((1..=64).contains(&n));
        debug_assert!(g + n as usize <= self.capacity_bits);

        let bin_idx = g / 64;
        let lbit = (g % 64) as u32;
        let avail = 64 - lbit;

        let low = self.bins[bin_idx] >> lbit;
        let result = if avail >= n {
            low
        } else {
            let remaining = n - avail;
            let high = if remaining == 64 {
                self.bins[bin_idx + 1]
            } else {
                self.bins[bin_idx + 1] & ((1u64 << remaining) - 1)
            };
            low | (high << avail)
        };

        if n == 64 {
            result
        } else {
            result & ((1u64 << n) - 1)
        }
    }

    /// Read a single bit at `g`.
    #[inline]
    pub fn bit(&self, g: usize) -> bool {
        self.read_bits(g, 1) != 0
    }

    /// `true` iff bit `g` is zero.
    #[inline]
    pub fn bitoff(&self, g: usize) -> bool {
        !self.bit(g)
    }

    /// `true` iff bit `g` is one.
    #[inline]
    pub fn biton(&self, g: usize) -> bool {
        self.bit(g)
    }

    /// Append a single bit at `g`.
    #[inline]
    pub fn append_bit(&mut self, g: usize, bit: bool) {
        self.append_bits(g, bit as u64, 1);
    }

    /// Borrow the buffer's underlying bytes (little-endian bin order, bin 0
    /// first), for framing into a [`crate::header::ChunkHeader`] payload.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bins.len() * 8);
        for bin in &self.bins {
            out.extend_from_slice(&bin.to_le_bytes());
        }
        out.truncate(self.capacity_bits / 8);
        out
    }

    /// Reconstruct a buffer from raw bytes previously produced by
    /// [`BitBuffer::as_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let capacity_bits = bytes.len() * 8;
        let num_bins = bytes.len().div_ceil(8);
        let mut bins = vec![0u64; num_bins];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut padded = [0u8; 8];
            padded[..chunk.len()].copy_from_slice(chunk);
            bins[i] = u64::from_le_bytes(padded);
        }
        Self { bins, capacity_bits }
    }
}

/// Write the delta-of-delta prefix + sign-extended payload for `delta` at
/// cursor `g`, returning the new cursor. Picks the narrowest bucket from
/// [`crate::config::DELTA_BUCKETS`] whose range contains `delta`.
pub(crate) fn write_delta(buf: &mut BitBuffer, mut g: usize, delta: i64) -> usize {
    for bucket in &DELTA_BUCKETS[..DELTA_ESCAPE_INDEX] {
        if bucket.payload_width == 0 {
            if delta == 0 {
                g = write_prefix(buf, g, bucket.ones, bucket.terminated);
                return g;
            }
            continue;
        }
        let half = 1i64 << (bucket.payload_width - 1);
        if delta >= -half && delta <= half - 1 {
            g = write_prefix(buf, g, bucket.ones, bucket.terminated);
            buf.append_bits(g, delta as u64, bucket.payload_width);
            return g + bucket.payload_width as usize;
        }
    }
    let escape = DELTA_BUCKETS[DELTA_ESCAPE_INDEX];
    g = write_prefix(buf, g, escape.ones, escape.terminated);
    buf.append_bits(g, delta as u64, 64);
    g + 64
}

fn write_prefix(buf: &mut BitBuffer, mut g: usize, ones: u32, terminated: bool) -> usize {
    for _ in 0..ones {
        buf.append_bit(g, true);
        g += 1;
    }
    if terminated {
        buf.append_bit(g, false);
        g += 1;
    }
    g
}

/// Number of bits `write_delta` would emit for `delta`, used by the
/// capacity pre-check in `chunk.rs`.
pub(crate) fn delta_bit_len(delta: i64) -> u32 {
    for bucket in &DELTA_BUCKETS[..DELTA_ESCAPE_INDEX] {
        if bucket.payload_width == 0 {
            if delta == 0 {
                return bucket.ones + 1;
            }
            continue;
        }
        let half = 1i64 << (bucket.payload_width - 1);
        if delta >= -half && delta <= half - 1 {
            return bucket.ones + 1 + bucket.payload_width;
        }
    }
    let escape = DELTA_BUCKETS[DELTA_ESCAPE_INDEX];
    escape.ones + 64
}

/// Read one delta-of-delta value starting at cursor `g`, returning the
/// decoded value and the new cursor.
pub(crate) fn read_delta(buf: &BitBuffer, mut g: usize) -> (i64, usize) {
    let mut ones = 0u32;
    while ones < 6 && buf.bit(g) {
        ones += 1;
        g += 1;
    }
    if ones < 6 {
        // terminating 0
        g += 1;
    }
    let bucket = DELTA_BUCKETS
        .iter()
        .find(|b| b.ones == ones)
        .expect("ones count 0..=6 always matches a bucket");
    if bucket.payload_width == 0 {
        return (0, g);
    }
    let raw = buf.read_bits(g, bucket.payload_width);
    let delta = sign_extend(raw, bucket.payload_width);
    (delta, g + bucket.payload_width as usize)
}

/// Sign-extend the low `width` bits of `raw` to a full `i64`.
pub(crate) fn sign_extend(raw: u64, width: u32) -> i64 {
    if width == 64 {
        return raw as i64;
    }
    let sign_bit = 1u64 << (width - 1);
    if raw & sign_bit != 0 {
        (raw as i64) - (1i64 << width)
    } else {
        raw as i64
    }
}

/// Clamp a leading-zero count to what the `XOR_LEADING_BITS`-wide field can
/// hold.
pub(crate) fn clamp_leading(leading: u32) -> u32 {
    leading.min(XOR_LEADING_CLAMP)
}

/// Bias a block size (`1..=64`) down into the `XOR_BLOCK_SIZE_BITS`-wide
/// field (stored with a −1 bias).
pub(crate) fn bias_block_size(block_size: u32) -> u64 {
    debug_assert!((1..=64).contains(&block_size));
    (block_size - 1) as u64
}

/// Undo [`bias_block_size`].
pub(crate) fn unbias_block_size(raw: u64) -> u32 {
    raw as u32 + 1
}
