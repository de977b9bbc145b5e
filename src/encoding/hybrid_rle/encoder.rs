use std::io::Write;

use super::super::{bitpacked, ceil8, uleb128};

/// The smallest equal-run for which an RLE run encodes shorter than keeping
/// the values bit-packed: the count of values that fit in the bytes an RLE
/// run must spend (the fixed-width value, its header, and the header of the
/// bit-packed run it splits).
fn rle_run_threshold(num_bits: u8) -> usize {
    let minimum_bytes = ceil8(num_bits as usize) + 1 + 1;
    (minimum_bytes * 8 + num_bits as usize - 1) / num_bits as usize
}

/// Encodes `values` as the RLE/bit-packed hybrid, prefixed with the 4-byte
/// little-endian length of the encoded runs.
pub fn encode<W: Write>(writer: &mut W, values: &[u32], num_bits: u8) -> std::io::Result<()> {
    let mut buffer = Vec::<u8>::new();
    encode_runs(&mut buffer, values, num_bits);
    writer.write_all(&(buffer.len() as u32).to_le_bytes())?;
    writer.write_all(&buffer)
}

fn encode_runs(buffer: &mut Vec<u8>, values: &[u32], num_bits: u8) {
    if num_bits == 0 || values.is_empty() {
        return;
    }
    let threshold = rle_run_threshold(num_bits);
    let mut container = [0u8; 10];

    // short runs accumulate and flush as a single bit-packed run; a
    // non-terminal bit-packed run must cover whole groups of 8, so it
    // extends into the head of the equal-run that follows it
    let mut pending = 0usize;
    let mut index = 0;
    while index < values.len() {
        let value = values[index];
        let mut run = 1;
        while index + run < values.len() && values[index + run] == value {
            run += 1;
        }
        let stolen = (8 - pending % 8) % 8;
        if run > threshold && run > stolen {
            flush_bitpacked(
                buffer,
                &values[index - pending..index + stolen],
                num_bits,
                &mut container,
            );
            pending = 0;

            let used = uleb128::encode(((run - stolen) as u64) << 1, &mut container);
            buffer.extend_from_slice(&container[..used]);
            buffer.extend_from_slice(&value.to_le_bytes()[..ceil8(num_bits as usize)]);
        } else {
            pending += run;
        }
        index += run;
    }
    flush_bitpacked(buffer, &values[index - pending..index], num_bits, &mut container);
}

fn flush_bitpacked(buffer: &mut Vec<u8>, values: &[u32], num_bits: u8, container: &mut [u8; 10]) {
    if values.is_empty() {
        return;
    }
    let header = ((ceil8(values.len()) as u64) << 1) | 1;
    let used = uleb128::encode(header, container);
    buffer.extend_from_slice(&container[..used]);
    bitpacked::encode(values, num_bits, buffer);
}
