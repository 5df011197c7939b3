//! Chunk encoder/decoder: owns the rolling codec state and exposes
//! `append` with transactional rollback, plus a forward iterator.

use tracing::{debug, warn};

use crate::bitbuffer::{delta_bit_len, read_delta, write_delta, BitBuffer};
use crate::error::{ChunkError, Result};
use crate::value::{read_value, value_bit_len, write_value, XorWindow};

/// Outcome of a successful [`Chunk::append`] call, not an error: the
/// sample either fit (`Written`) or the chunk ran out of room (`End`), in
/// which case the caller is expected to seal the chunk and start a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The sample was encoded; `numSamples` advanced by one.
    Written,
    /// The chunk has no room left for this sample. The chunk's state is
    /// unchanged from immediately before the call.
    End,
}

/// A fixed-capacity, append-only time-series chunk.
///
/// A `Chunk` exclusively owns its byte buffer; [`ChunkIter`] borrows it.
/// Appends require `&mut self`; any number of iterators may read
/// concurrently as long as no append is in flight.
#[derive(Debug, Clone)]
pub struct Chunk {
    buf: BitBuffer,
    size_bytes: usize,
    num_samples: u64,
    base_timestamp: u64,
    base_value_bits: u64,
    idx: usize,
    prev_timestamp: u64,
    prev_timestamp_delta: i64,
    xor_window: XorWindow,
}

impl Chunk {
    /// Create an empty chunk with `capacity_bytes` of payload capacity.
    /// The underlying buffer is zero-initialized.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            buf: BitBuffer::new(capacity_bytes),
            size_bytes: capacity_bytes,
            num_samples: 0,
            base_timestamp: 0,
            base_value_bits: 0,
            idx: 0,
            prev_timestamp: 0,
            prev_timestamp_delta: 0,
            xor_window: XorWindow::new(0),
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.size_bytes
    }

    /// Number of samples currently encoded.
    pub fn num_samples(&self) -> u64 {
        self.num_samples
    }

    /// Bit length of the encoded payload (the write cursor).
    pub fn bit_len(&self) -> usize {
        self.idx
    }

    /// First sample's timestamp, once at least one sample has been
    /// appended.
    pub fn base_timestamp(&self) -> Option<u64> {
        (self.num_samples > 0).then_some(self.base_timestamp)
    }

    /// First sample's value, once at least one sample has been appended.
    pub fn base_value(&self) -> Option<f64> {
        (self.num_samples > 0).then_some(f64::from_bits(self.base_value_bits))
    }

    /// Append `(ts, value)` to the chunk.
    ///
    /// Returns [`ChunkError::NonMonotonicTimestamp`] if `ts` is earlier than
    /// the last appended timestamp, a caller precondition violation,
    /// not a capacity condition. Returns `Ok(AppendOutcome::End)` if the
    /// chunk has no room left; in that case the chunk's observable state is
    /// identical to its state immediately before the call.
    pub fn append(&mut self, ts: u64, value: f64) -> Result<AppendOutcome> {
        if self.num_samples > 0 && ts < self.prev_timestamp {
            return Err(ChunkError::NonMonotonicTimestamp {
                prev: self.prev_timestamp,
                next: ts,
            });
        }

        if self.num_samples == 0 {
            self.base_timestamp = ts;
            self.base_value_bits = value.to_bits();
            self.prev_timestamp = ts;
            self.prev_timestamp_delta = 0;
            self.xor_window = XorWindow::new(value.to_bits());
            self.num_samples = 1;
            debug!(ts, value, "appended base sample");
            return Ok(AppendOutcome::Written);
        }

        let snapshot = (self.idx, self.prev_timestamp, self.prev_timestamp_delta, self.xor_window);

        let delta = ts.wrapping_sub(self.prev_timestamp) as i64;
        let delta_of_delta = delta - self.prev_timestamp_delta;
        let int_bits = delta_bit_len(delta_of_delta);

        // Minimum the double codec needs: one reserve bit for the
        // XOR-equals-0 case.
        let remaining = self.buf.capacity_bits() - self.idx;
        if (int_bits as usize) + 1 > remaining {
            self.restore(snapshot);
            warn!(num_samples = self.num_samples, "append: end of chunk (integer encoding)");
            return Ok(AppendOutcome::End);
        }

        let value_bits = value.to_bits();
        let val_bits_len = value_bit_len(&self.xor_window, value_bits);
        if (int_bits as usize) + (val_bits_len as usize) > remaining {
            self.restore(snapshot);
            warn!(num_samples = self.num_samples, "append: end of chunk (double encoding)");
            return Ok(AppendOutcome::End);
        }

        let g = write_delta(&mut self.buf, self.idx, delta_of_delta);
        let g = write_value(&mut self.buf, g, &mut self.xor_window, value_bits);

        self.idx = g;
        self.prev_timestamp_delta = delta;
        self.prev_timestamp = ts;
        self.num_samples += 1;

        debug!(num_samples = self.num_samples, bit_len = self.idx, "appended sample");
        Ok(AppendOutcome::Written)
    }

    fn restore(&mut self, snapshot: (usize, u64, i64, XorWindow)) {
        let (idx, prev_timestamp, prev_timestamp_delta, xor_window) = snapshot;
        self.idx = idx;
        self.prev_timestamp = prev_timestamp;
        self.prev_timestamp_delta = prev_timestamp_delta;
        self.xor_window = xor_window;
    }

    /// A forward iterator over this chunk's samples, starting at sample 0.
    pub fn iter(&self) -> ChunkIter<'_> {
        ChunkIter {
            chunk: self,
            idx: 0,
            count: 0,
            prev_timestamp: 0,
            prev_timestamp_delta: 0,
            xor_window: XorWindow::new(0),
        }
    }

    pub(crate) fn buf(&self) -> &BitBuffer {
        &self.buf
    }
}

impl Default for Chunk {
    /// An empty chunk sized at [`crate::config::DEFAULT_CHUNK_CAPACITY`].
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CHUNK_CAPACITY)
    }
}

/// Read-only forward iterator over a [`Chunk`]'s samples, yielding
/// `(timestamp, value)` pairs in insertion order. Decoding is
/// strictly sequential; there is no random access.
#[derive(Debug)]
pub struct ChunkIter<'a> {
    chunk: &'a Chunk,
    idx: usize,
    count: u64,
    prev_timestamp: u64,
    prev_timestamp_delta: i64,
    xor_window: XorWindow,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = (u64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.count >= self.chunk.num_samples {
            debug!(count = self.count, "iterator reached end of stream");
            return None;
        }

        if self.count == 0 {
            self.prev_timestamp = self.chunk.base_timestamp;
            self.prev_timestamp_delta = 0;
            self.xor_window = XorWindow::new(self.chunk.base_value_bits);
            self.count = 1;
            return Some((self.chunk.base_timestamp, f64::from_bits(self.chunk.base_value_bits)));
        }

        let (delta_of_delta, g) = read_delta(self.chunk.buf(), self.idx);
        let delta = self.prev_timestamp_delta + delta_of_delta;
        let ts = self.prev_timestamp.wrapping_add(delta as u64);

        let (value_bits, g) = read_value(self.chunk.buf(), g, &mut self.xor_window);

        self.idx = g;
        self.prev_timestamp = ts;
        self.prev_timestamp_delta = delta;
        self.count += 1;

        Some((ts, f64::from_bits(value_bits)))
    }
}
