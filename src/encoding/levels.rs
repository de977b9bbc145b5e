//! Wire format of repetition and definition level streams.

use std::io::Write;

use crate::error::{Error, Result};

use super::{bitpacked, get_length, hybrid_rle, log2};

/// Returns the number of bits needed to encode levels up to `max_level`.
#[inline]
pub fn get_bit_width(max_level: u32) -> u8 {
    log2(u64::from(max_level) + 1) as u8
}

/// Encodes `levels` onto `writer` as a length-prefixed RLE/bit-packed
/// hybrid stream. A maximum level of 0 writes nothing at all.
pub fn encode<W: Write>(writer: &mut W, levels: &[u32], max_level: u32) -> std::io::Result<()> {
    let num_bits = get_bit_width(max_level);
    if num_bits == 0 {
        return Ok(());
    }
    hybrid_rle::encode(writer, levels, num_bits)
}

/// Decodes `length` levels from `values`. A maximum level of 0 has no
/// stream and decodes to zeros.
pub fn decode(values: &[u8], max_level: u32, length: usize) -> Result<Vec<u32>> {
    let num_bits = get_bit_width(max_level);
    if num_bits == 0 {
        return Ok(vec![0; length]);
    }
    if values.len() < 4 {
        return Err(Error::OutOfSpec(
            "a level stream is at least its 4-byte length prefix".to_string(),
        ));
    }
    let payload_length = get_length(values) as usize;
    if values.len() < 4 + payload_length {
        return Err(Error::OutOfSpec(format!(
            "a level stream declares {} bytes but holds {}",
            payload_length,
            values.len() - 4
        )));
    }

    let mut decoded = Vec::with_capacity(length);
    for run in hybrid_rle::Decoder::new(&values[4..4 + payload_length], num_bits) {
        match run? {
            hybrid_rle::HybridEncoded::Bitpacked(compressed) => {
                let pack_length = compressed.len() * 8 / num_bits as usize;
                decoded.extend(bitpacked::Decoder::new(compressed, num_bits, pack_length));
            }
            hybrid_rle::HybridEncoded::Rle(pack, run_length) => {
                let mut bytes = [0u8; 4];
                pack.iter().enumerate().for_each(|(i, byte)| bytes[i] = *byte);
                let value = u32::from_le_bytes(bytes);
                decoded.extend(std::iter::repeat(value).take(run_length));
            }
        }
    }
    if decoded.len() < length {
        return Err(Error::OutOfSpec(format!(
            "a level stream ended after {} of {} levels",
            decoded.len(),
            length
        )));
    }
    decoded.truncate(length);
    Ok(decoded)
}
