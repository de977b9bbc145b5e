// See https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
mod decoder;
mod encoder;
pub use decoder::Decoder;
pub use encoder::encode;

#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bitpacked slice covering whole groups of 8 values.
    Bitpacked(&'a [u8]),
    /// A repeated fixed-width little-endian value and its run length.
    Rle(&'a [u8], usize),
}
