mod decode;
mod encode;

pub use decode::Decoder;
pub use encode::encode;

#[inline]
fn mask(num_bits: u8) -> u32 {
    if num_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << num_bits) - 1
    }
}
