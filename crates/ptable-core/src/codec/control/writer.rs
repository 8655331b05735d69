use bytes::BufMut;
use tracing::debug;

use super::layout::{self, Schema};
use crate::codec::common::writer::put_checksum;
use crate::codec::error::CodecError;
use crate::checksum::CHECKSUM_SIZE;
use crate::{ChannelConfig, ControlFile};

/// Encode a control file using the given channel-table schema.
///
/// Layout: version, channel tables, frame count, one timestamp per frame,
/// then the checksum of every preceding byte. All multi-byte fields are
/// little-endian.
///
/// # Errors
/// Returns `CodecError` when the channel tables do not fit `schema` or the
/// frame count does not fit in 32 bits.
pub fn encode_control(file: &ControlFile, schema: Schema) -> Result<Vec<u8>, CodecError> {
    let frame_count = u32::try_from(file.timestamps.len()).map_err(|_| CodecError::OutOfRange {
        field: "frame_count",
        value: file.timestamps.len() as u64,
        max: u64::from(u32::MAX),
    })?;

    let mut buf = Vec::with_capacity(encoded_len(file, schema));
    buf.put_u8(file.version.major);
    buf.put_u8(file.version.minor);
    put_channel_tables(&mut buf, &file.channels, schema)?;
    buf.put_u32_le(frame_count);
    for &timestamp in &file.timestamps {
        buf.put_u32_le(timestamp);
    }
    let sum = put_checksum(&mut buf, 0);

    debug!(
        schema = schema.name(),
        frame_count,
        bytes = buf.len(),
        checksum = sum,
        "encoded control file"
    );
    Ok(buf)
}

fn put_channel_tables(
    buf: &mut Vec<u8>,
    channels: &ChannelConfig,
    schema: Schema,
) -> Result<(), CodecError> {
    match schema {
        Schema::Fixed {
            of_channels,
            strips,
        } => {
            require_count("OF", of_channels, channels.of_enabled.len())?;
            require_count("strip", strips, channels.strip_led_counts.len())?;
            for &enabled in &channels.of_enabled {
                buf.put_u8(u8::from(enabled));
            }
        }
        Schema::Variable => {
            if let Some(index) = channels.of_enabled.iter().position(|enabled| !enabled) {
                return Err(CodecError::DisabledChannel { index });
            }
            buf.put_u8(count_byte("OF_NUM", channels.of_enabled.len())?);
            buf.put_u8(count_byte("STRIP_NUM", channels.strip_led_counts.len())?);
        }
    }
    buf.put_slice(&channels.strip_led_counts);
    Ok(())
}

fn require_count(kind: &'static str, expected: u8, actual: usize) -> Result<(), CodecError> {
    if actual != usize::from(expected) {
        return Err(CodecError::ChannelCount {
            kind,
            expected: usize::from(expected),
            actual,
        });
    }
    Ok(())
}

fn count_byte(field: &'static str, count: usize) -> Result<u8, CodecError> {
    u8::try_from(count).map_err(|_| CodecError::OutOfRange {
        field,
        value: count as u64,
        max: u64::from(u8::MAX),
    })
}

fn encoded_len(file: &ControlFile, schema: Schema) -> usize {
    let tables = match schema {
        Schema::Fixed { .. } => file.channels.of_enabled.len(),
        Schema::Variable => 2,
    } + file.channels.strip_led_counts.len();
    layout::CHANNELS_OFFSET
        + tables
        + layout::FRAME_COUNT_SIZE
        + file.timestamps.len() * layout::TIMESTAMP_SIZE
        + CHECKSUM_SIZE
}
