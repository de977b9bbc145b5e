//! Plain encoding of leaf column values: byte arrays carry a 4-byte
//! little-endian length prefix; fixed-width values are little-endian.

use crate::error::{Error, Result};
use crate::types::NativeType;

pub fn encode_byte_array<'a, I: Iterator<Item = &'a [u8]>>(buffer: &mut Vec<u8>, values: I) {
    for value in values {
        buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
        buffer.extend_from_slice(value);
    }
}

pub fn encode_native<T: NativeType, I: Iterator<Item = T>>(buffer: &mut Vec<u8>, values: I) {
    for value in values {
        buffer.extend_from_slice(value.to_le_bytes().as_ref());
    }
}

/// Decodes every byte array of a leaf column. A length prefix that is cut
/// short, or that claims more bytes than remain, is corrupt input.
pub fn decode_byte_array(mut values: &[u8]) -> Result<Vec<&[u8]>> {
    let mut decoded = vec![];
    while !values.is_empty() {
        if values.len() < 4 {
            return Err(Error::OutOfSpec(
                "a byte array length prefix is cut short".to_string(),
            ));
        }
        let length = u32::from_le_bytes(values[0..4].try_into().unwrap()) as usize;
        values = &values[4..];
        if values.len() < length {
            return Err(Error::OutOfSpec(format!(
                "a byte array declares {} bytes but only {} remain",
                length,
                values.len()
            )));
        }
        let (bytes, rest) = values.split_at(length);
        decoded.push(bytes);
        values = rest;
    }
    Ok(decoded)
}

pub fn decode_native<T: NativeType>(values: &[u8]) -> Vec<T> {
    values
        .chunks_exact(std::mem::size_of::<T>())
        .map(|chunk| {
            // infalible: `chunks_exact` yields whole chunks
            T::from_le_bytes(chunk.try_into().unwrap())
        })
        .collect()
}
