use bytes::BufMut;
use tracing::debug;

use super::layout::{FILE_HEADER_SIZE, FrameLayout};
use crate::codec::common::writer::{put_checksum, put_colors};
use crate::codec::error::CodecError;
use crate::{Color, FrameRecord, Version};

/// Encode one record whose every channel shows `color` when `is_lit`, or is
/// dark otherwise.
///
/// # Examples
/// ```
/// use ptable_core::{Color, FrameLayout, encode_uniform_record};
///
/// let layout = FrameLayout::new(2, vec![1]);
/// let bytes = encode_uniform_record(100, true, Color::new(255, 255, 0), true, &layout);
/// assert_eq!(bytes.len(), layout.record_len());
/// assert_eq!(&bytes[5..8], &[255, 255, 0]);
/// ```
pub fn encode_uniform_record(
    start_time: u32,
    fade: bool,
    color: Color,
    is_lit: bool,
    layout: &FrameLayout,
) -> Vec<u8> {
    let color = if is_lit { color } else { Color::OFF };
    let record = FrameRecord::uniform(start_time, fade, color, color, layout);
    let mut buf = Vec::with_capacity(layout.record_len());
    put_record(&mut buf, &record);
    buf
}

/// Encode one record with arbitrary per-channel colors.
///
/// # Errors
/// Returns `LayoutMismatch` when the record's color counts disagree with
/// `layout`.
pub fn encode_record(record: &FrameRecord, layout: &FrameLayout) -> Result<Vec<u8>, CodecError> {
    check_layout(record, layout)?;
    let mut buf = Vec::with_capacity(layout.record_len());
    put_record(&mut buf, record);
    Ok(buf)
}

/// Encode a complete frame file: version header, then every record in order.
///
/// # Errors
/// Returns `LayoutMismatch` for the first record that does not fit `layout`.
pub fn encode_frame_file(
    version: Version,
    records: &[FrameRecord],
    layout: &FrameLayout,
) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(FILE_HEADER_SIZE + records.len() * layout.record_len());
    buf.put_u8(version.major);
    buf.put_u8(version.minor);
    for record in records {
        check_layout(record, layout)?;
        put_record(&mut buf, record);
    }
    debug!(
        %version,
        records = records.len(),
        record_len = layout.record_len(),
        bytes = buf.len(),
        "encoded frame file"
    );
    Ok(buf)
}

fn put_record(buf: &mut Vec<u8>, record: &FrameRecord) -> u32 {
    let start = buf.len();
    buf.put_u32_le(record.start_time);
    buf.put_u8(u8::from(record.fade));
    put_colors(buf, &record.of_colors);
    put_colors(buf, &record.strip_colors);
    put_checksum(buf, start)
}

fn check_layout(record: &FrameRecord, layout: &FrameLayout) -> Result<(), CodecError> {
    if record.of_colors.len() != layout.of_count {
        return Err(CodecError::LayoutMismatch {
            field: "of_colors",
            expected: layout.of_count,
            actual: record.of_colors.len(),
        });
    }
    if record.strip_colors.len() != layout.total_leds() {
        return Err(CodecError::LayoutMismatch {
            field: "strip_colors",
            expected: layout.total_leds(),
            actual: record.strip_colors.len(),
        });
    }
    Ok(())
}
