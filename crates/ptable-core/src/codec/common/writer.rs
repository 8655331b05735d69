use bytes::BufMut;

use crate::Color;
use crate::checksum::checksum;

pub(crate) fn put_colors(buf: &mut Vec<u8>, colors: &[Color]) {
    for color in colors {
        buf.put_slice(&color.to_bytes());
    }
}

/// Append the checksum of `buf[start..]` as a little-endian u32.
pub(crate) fn put_checksum(buf: &mut Vec<u8>, start: usize) -> u32 {
    let sum = checksum(&buf[start..]);
    buf.put_u32_le(sum);
    sum
}
