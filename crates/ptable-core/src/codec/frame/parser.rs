use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layout::{self, FrameLayout};
use crate::checksum::{ChecksumCheck, checksum};
use crate::codec::common::reader::PatternReader;
use crate::codec::error::CodecError;
use crate::{ControlFile, FrameRecord, Version};

/// One decoded record plus its integrity status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    pub record: FrameRecord,
    pub checksum: ChecksumCheck,
}

/// Records recovered from a frame stream.
///
/// Decoding stops at the first record that is not fully present; the stream
/// reports what it recovered instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStream {
    /// Fully decoded records in file order.
    pub frames: Vec<DecodedFrame>,
    /// Number of records the caller asked for.
    pub expected: usize,
    /// Bytes left unconsumed after the last decoded record.
    pub leftover_bytes: usize,
}

impl FrameStream {
    /// Fewer records were present than expected.
    pub fn is_partial(&self) -> bool {
        self.frames.len() < self.expected
    }

    /// Every expected record was decoded and nothing was left over.
    pub fn is_complete(&self) -> bool {
        !self.is_partial() && self.leftover_bytes == 0
    }

    pub fn checksum_mismatches(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| !frame.checksum.is_match())
            .count()
    }
}

/// Decode the first record in `bytes`.
///
/// # Errors
/// Returns `TruncatedInput` when `bytes` is shorter than
/// `layout.record_len()`. Checksum mismatches are reported on the result.
pub fn decode_record(bytes: &[u8], layout: &FrameLayout) -> Result<DecodedFrame, CodecError> {
    let reader = PatternReader::new(bytes);
    reader.require_len(layout.record_len())?;

    let start_time = reader.read_u32_le(layout::START_TIME_OFFSET)?;
    let fade = reader.read_u8(layout::FADE_OFFSET)? != 0;
    let of_colors = reader.read_colors(layout::COLORS_OFFSET, layout.of_count)?;
    let strip_colors = reader.read_colors(layout.strip_colors_offset(), layout.total_leds())?;

    let checksum_offset = layout.checksum_offset();
    let stored = reader.read_u32_le(checksum_offset)?;
    let computed = checksum(reader.read_slice(0..checksum_offset)?);

    Ok(DecodedFrame {
        record: FrameRecord {
            start_time,
            fade,
            of_colors,
            strip_colors,
        },
        checksum: ChecksumCheck { stored, computed },
    })
}

/// Decode up to `record_count` consecutive records.
///
/// A record cut short by the end of `bytes` ends the stream; the result is
/// then partial. Any other decoding error is returned.
///
/// # Errors
/// Returns the first non-truncation `CodecError` raised by [`decode_record`].
///
/// # Examples
/// ```
/// use ptable_core::{Color, FrameLayout, decode_stream, encode_uniform_record};
///
/// let layout = FrameLayout::new(1, vec![]);
/// let mut bytes = encode_uniform_record(0, true, Color::OFF, false, &layout);
/// bytes.extend_from_slice(&[0, 0, 0]);
///
/// let stream = decode_stream(&bytes, 2, &layout)?;
/// assert_eq!(stream.frames.len(), 1);
/// assert!(stream.is_partial());
/// assert_eq!(stream.leftover_bytes, 3);
/// # Ok::<(), ptable_core::CodecError>(())
/// ```
pub fn decode_stream(
    bytes: &[u8],
    record_count: usize,
    layout: &FrameLayout,
) -> Result<FrameStream, CodecError> {
    let record_len = layout.record_len();
    let mut frames = Vec::new();
    let mut offset = 0;

    while frames.len() < record_count {
        match decode_record(&bytes[offset..], layout) {
            Ok(frame) => {
                frames.push(frame);
                offset += record_len;
            }
            Err(CodecError::TruncatedInput { needed, actual }) => {
                debug!(record = frames.len(), needed, actual, "frame stream ends early");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(FrameStream {
        frames,
        expected: record_count,
        leftover_bytes: bytes.len() - offset,
    })
}

/// Decode a frame file using the geometry and frame count of its control file.
///
/// # Errors
/// Returns `TruncatedInput` when the version header is missing and
/// `SchemaMismatch` when the header differs from the control file's version;
/// no record is read in either case.
pub fn decode_frame_file(bytes: &[u8], control: &ControlFile) -> Result<FrameStream, CodecError> {
    let reader = PatternReader::new(bytes);
    let header = reader.read_slice(0..layout::FILE_HEADER_SIZE)?;
    let version = Version::new(header[0], header[1]);
    if version != control.version {
        return Err(CodecError::SchemaMismatch {
            control: control.version,
            frame: version,
        });
    }

    let frame_layout = control.channels.layout();
    let stream = decode_stream(
        &bytes[layout::FILE_HEADER_SIZE..],
        control.frame_count(),
        &frame_layout,
    )?;
    debug!(
        %version,
        decoded = stream.frames.len(),
        expected = stream.expected,
        leftover_bytes = stream.leftover_bytes,
        "decoded frame file"
    );
    Ok(stream)
}
