//! XOR-based double encoding.
//!
//! Each sample after the first is encoded as the XOR of its raw IEEE-754
//! bit pattern against the previous sample's, using either a freshly
//! emitted `(leading, block-size)` window or a reuse of the previous one.

use crate::bitbuffer::{bias_block_size, clamp_leading, unbias_block_size, BitBuffer};
use crate::config::{XOR_BLOCK_SIZE_BITS, XOR_LEADING_BITS};

/// Rolling XOR-codec state mirrored by both the encoder and the iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct XorWindow {
    pub prev_value_bits: u64,
    pub prev_leading: u32,
    pub prev_trailing: u32,
}

impl XorWindow {
    pub fn new(first_value_bits: u64) -> Self {
        Self {
            prev_value_bits: first_value_bits,
            prev_leading: 0,
            prev_trailing: 0,
        }
    }
}

/// Number of bits [`write_value`] would emit for `value` against `window`,
/// without mutating anything, used by the chunk encoder's capacity
/// pre-check.
pub(crate) fn value_bit_len(window: &XorWindow, value_bits: u64) -> u32 {
    let xor = value_bits ^ window.prev_value_bits;
    if xor == 0 {
        return 1;
    }
    let leading = clamp_leading(xor.leading_zeros());
    let trailing = xor.trailing_zeros();
    let block = 64 - leading - trailing;

    let prev_block = 64 - window.prev_leading - window.prev_trailing;
    if leading >= window.prev_leading
        && trailing >= window.prev_trailing
        && (XOR_LEADING_BITS + XOR_BLOCK_SIZE_BITS + block) > prev_block
    {
        1 + 1 + prev_block
    } else {
        1 + 1 + XOR_LEADING_BITS + XOR_BLOCK_SIZE_BITS + block
    }
}

/// Encode `value`'s XOR against `window.prev_value_bits` at cursor `g`,
/// updating `window` in place, and return the new cursor.
pub(crate) fn write_value(buf: &mut BitBuffer, mut g: usize, window: &mut XorWindow, value_bits: u64) -> usize {
    let xor = value_bits ^ window.prev_value_bits;

    if xor == 0 {
        buf.append_bit(g, false);
        g += 1;
        window.prev_value_bits = value_bits;
        return g;
    }

    buf.append_bit(g, true);
    g += 1;

    let leading = clamp_leading(xor.leading_zeros());
    let trailing = xor.trailing_zeros();
    let block = 64 - leading - trailing;
    let prev_block = 64 - window.prev_leading - window.prev_trailing;

    let reuse = leading >= window.prev_leading
        && trailing >= window.prev_trailing
        && (XOR_LEADING_BITS + XOR_BLOCK_SIZE_BITS + block) > prev_block;

    if reuse {
        buf.append_bit(g, false);
        g += 1;
        let shifted = xor >> window.prev_trailing;
        buf.append_bits(g, shifted, prev_block);
        g += prev_block as usize;
    } else {
        buf.append_bit(g, true);
        g += 1;
        buf.append_bits(g, leading as u64, XOR_LEADING_BITS);
        g += XOR_LEADING_BITS as usize;
        buf.append_bits(g, bias_block_size(block), XOR_BLOCK_SIZE_BITS);
        g += XOR_BLOCK_SIZE_BITS as usize;
        let shifted = xor >> trailing;
        buf.append_bits(g, shifted, block);
        g += block as usize;
        window.prev_leading = leading;
        window.prev_trailing = trailing;
    }

    window.prev_value_bits = value_bits;
    g
}

/// Decode the next double at cursor `g`, updating `window` in place, and
/// return the decoded raw bit pattern and the new cursor.
pub(crate) fn read_value(buf: &BitBuffer, mut g: usize, window: &mut XorWindow) -> (u64, usize) {
    let is_nonzero = buf.bit(g);
    g += 1;

    if !is_nonzero {
        return (window.prev_value_bits, g);
    }

    let new_window = buf.bit(g);
    g += 1;

    let (_leading, trailing, block) = if new_window {
        let leading = buf.read_bits(g, XOR_LEADING_BITS) as u32;
        g += XOR_LEADING_BITS as usize;
        let block = unbias_block_size(buf.read_bits(g, XOR_BLOCK_SIZE_BITS));
        g += XOR_BLOCK_SIZE_BITS as usize;
        let trailing = 64 - leading - block;
        window.prev_leading = leading;
        window.prev_trailing = trailing;
        (leading, trailing, block)
    } else {
        let block = 64 - window.prev_leading - window.prev_trailing;
        (window.prev_leading, window.prev_trailing, block)
    };

    let raw = buf.read_bits(g, block);
    g += block as usize;
    let xor = raw << trailing;
    let value_bits = window.prev_value_bits ^ xor;
    window.prev_value_bits = value_bits;

    (value_bits, g)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(values: &[f64]) {
        let mut buf = BitBuffer::new(4096);
        let mut g = 0usize;
        let mut enc_window = XorWindow::new(values[0].to_bits());
        for &v in &values[1..] {
            g = write_value(&mut buf, g, &mut enc_window, v.to_bits());
        }

        let mut dec_window = XorWindow::new(values[0].to_bits());
        let mut cursor = 0usize;
        for &v in &values[1..] {
            let (bits, next) = read_value(&buf, cursor, &mut dec_window);
            assert_eq!(bits, v.to_bits(), "expected {v} got {}", f64::from_bits(bits));
            cursor = next;
        }
    }

    #[test]
    fn identical_values_compact() {
        round_trip(&[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn xor_zero_is_one_bit() {
        let mut buf = BitBuffer::new(64);
        let mut window = XorWindow::new(1.0f64.to_bits());
        let end = write_value(&mut buf, 0, &mut window, 1.0f64.to_bits());
        assert_eq!(end, 1);
    }

    #[test]
    fn varying_values_round_trip() {
        let values: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin() * 100.0).collect();
        round_trip(&values);
    }

    #[test]
    fn nan_and_signed_zero_preserved() {
        let values = [1.0, f64::NAN, -0.0, 0.0, f64::NAN];
        let mut buf = BitBuffer::new(4096);
        let mut enc_window = XorWindow::new(values[0].to_bits());
        let mut g = 0usize;
        for &v in &values[1..] {
            g = write_value(&mut buf, g, &mut enc_window, v.to_bits());
        }
        let mut dec_window = XorWindow::new(values[0].to_bits());
        let mut cursor = 0usize;
        for &v in &values[1..] {
            let (bits, next) = read_value(&buf, cursor, &mut dec_window);
            assert_eq!(bits, v.to_bits());
            cursor = next;
        }
    }

    #[test]
    fn reuse_branch_is_preferred_when_cheaper() {
        // After a new window is established, a second XOR with the same
        // leading/trailing zero counts should reuse it (no second '1' bit
        // for new-window).
        let mut buf = BitBuffer::new(4096);
        let mut window = XorWindow::new(0.0f64.to_bits());
        let v1 = f64::from_bits(0x0000_0000_0000_00F0);
        let v2 = f64::from_bits(0x0000_0000_0000_00F1);
        let g1 = write_value(&mut buf, 0, &mut window, v1.to_bits());
        let leading_after_first = window.prev_leading;
        let trailing_after_first = window.prev_trailing;
        let _g2 = write_value(&mut buf, g1, &mut window, v2.to_bits());
        assert_eq!(window.prev_leading, leading_after_first);
        assert_eq!(window.prev_trailing, trailing_after_first);
    }
}
