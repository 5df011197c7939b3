//! On-wire chunk header framing, how an external collaborator
//! (persistence, network transport) would frame a chunk's metadata. The
//! in-memory [`crate::chunk::Chunk`] itself does not require this framing
//! for append/iterate use.
//!
//! Fixed-width little-endian layout, mirroring this codebase's SSTable
//! block header (`crc32fast` checksum over everything preceding it):
//!
//! ```text
//! size                  u64
//! num_samples           u64
//! base_timestamp        u64
//! base_value_bits        u64
//! idx                   u64
//! prev_timestamp        u64
//! prev_timestamp_delta  i64
//! prev_value_bits       u64
//! prev_leading          u8
//! prev_trailing         u8
//! crc32                 u32
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ChunkError, Result};

/// The ten semantically-required header fields, plus a trailing
/// checksum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkHeader {
    /// Capacity of the chunk's payload, in bytes.
    pub size: u64,
    /// Number of samples encoded.
    pub num_samples: u64,
    /// Sample 0's timestamp.
    pub base_timestamp: u64,
    /// Sample 0's value, as raw IEEE-754 bits.
    pub base_value_bits: u64,
    /// Bit length of the encoded payload.
    pub idx: u64,
    /// Rolling encoder state: last timestamp.
    pub prev_timestamp: u64,
    /// Rolling encoder state: last delta.
    pub prev_timestamp_delta: i64,
    /// Rolling encoder state: last value, as raw IEEE-754 bits.
    pub prev_value_bits: u64,
    /// Rolling encoder state: leading zero count of the last XOR window.
    pub prev_leading: u8,
    /// Rolling encoder state: trailing zero count of the last XOR window.
    pub prev_trailing: u8,
}

impl ChunkHeader {
    /// Size of the encoded header in bytes, including the trailing CRC32.
    pub const ENCODED_LEN: usize = 8 * 8 + 1 + 1 + 4;

    /// Serialize to a fixed-width little-endian byte sequence with a
    /// trailing CRC32 over the preceding fields.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::ENCODED_LEN);
        self.put_fields(&mut buf);
        let crc = crc32fast::hash(&buf);
        buf.put_u32_le(crc);
        buf.freeze()
    }

    fn put_fields(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.size);
        buf.put_u64_le(self.num_samples);
        buf.put_u64_le(self.base_timestamp);
        buf.put_u64_le(self.base_value_bits);
        buf.put_u64_le(self.idx);
        buf.put_u64_le(self.prev_timestamp);
        buf.put_i64_le(self.prev_timestamp_delta);
        buf.put_u64_le(self.prev_value_bits);
        buf.put_u8(self.prev_leading);
        buf.put_u8(self.prev_trailing);
    }

    /// Deserialize from bytes, validating length and checksum.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::ENCODED_LEN {
            return Err(ChunkError::Corruption(format!(
                "header too short: got {} bytes, need {}",
                data.len(),
                Self::ENCODED_LEN
            )));
        }

        let fields_len = Self::ENCODED_LEN - 4;
        let expected = crc32fast::hash(&data[..fields_len]);

        let mut cursor = &data[..Self::ENCODED_LEN];
        let size = cursor.get_u64_le();
        let num_samples = cursor.get_u64_le();
        let base_timestamp = cursor.get_u64_le();
        let base_value_bits = cursor.get_u64_le();
        let idx = cursor.get_u64_le();
        let prev_timestamp = cursor.get_u64_le();
        let prev_timestamp_delta = cursor.get_i64_le();
        let prev_value_bits = cursor.get_u64_le();
        let prev_leading = cursor.get_u8();
        let prev_trailing = cursor.get_u8();
        let actual = cursor.get_u32_le();

        if actual != expected {
            return Err(ChunkError::ChecksumMismatch { expected, actual });
        }

        Ok(Self {
            size,
            num_samples,
            base_timestamp,
            base_value_bits,
            idx,
            prev_timestamp,
            prev_timestamp_delta,
            prev_value_bits,
            prev_leading,
            prev_trailing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ChunkHeader {
        ChunkHeader {
            size: 2048,
            num_samples: 42,
            base_timestamp: 1_700_000_000,
            base_value_bits: 3.14f64.to_bits(),
            idx: 512,
            prev_timestamp: 1_700_000_410,
            prev_timestamp_delta: 10,
            prev_value_bits: 2.71f64.to_bits(),
            prev_leading: 5,
            prev_trailing: 3,
        }
    }

    #[test]
    fn round_trip() {
        let header = sample_header();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), ChunkHeader::ENCODED_LEN);
        let decoded = ChunkHeader::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn truncated_input_is_corruption() {
        let header = sample_header();
        let bytes = header.to_bytes();
        let err = ChunkHeader::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ChunkError::Corruption(_)));
    }

    #[test]
    fn corrupted_byte_fails_checksum() {
        let header = sample_header();
        let mut bytes = header.to_bytes().to_vec();
        bytes[0] ^= 0xFF;
        let err = ChunkHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ChunkError::ChecksumMismatch { .. }));
    }
}
