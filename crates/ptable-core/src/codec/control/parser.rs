use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layout::{self, Schema};
use crate::checksum::{CHECKSUM_SIZE, ChecksumCheck, checksum};
use crate::codec::common::reader::PatternReader;
use crate::codec::error::CodecError;
use crate::{ChannelConfig, ControlFile, Version};

/// A parsed control file plus its integrity status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedControl {
    pub file: ControlFile,
    pub checksum: ChecksumCheck,
    /// Bytes found after the checksum field (zero for a well-formed file).
    pub trailing_bytes: usize,
}

/// Decode a control file written with `schema`.
///
/// # Errors
/// Returns `TruncatedInput` whenever the header, the declared timestamps or
/// the trailing checksum extend past the end of `bytes`, and
/// `InvalidEnableFlag` for OF flags other than 0 or 1. A checksum mismatch is
/// not an error; see [`DecodedControl::checksum`].
pub fn decode_control(bytes: &[u8], schema: Schema) -> Result<DecodedControl, CodecError> {
    let reader = PatternReader::new(bytes);
    let version_bytes = reader.read_slice(layout::VERSION_RANGE)?;
    let version = Version::new(version_bytes[0], version_bytes[1]);

    let (channels, frame_count_offset) = read_channel_tables(&reader, schema)?;
    let frame_count = reader.read_u32_le(frame_count_offset)?;

    let timestamps_offset = frame_count_offset + layout::FRAME_COUNT_SIZE;
    let checksum_offset = (frame_count as usize)
        .saturating_mul(layout::TIMESTAMP_SIZE)
        .saturating_add(timestamps_offset);
    reader.require_len(checksum_offset.saturating_add(CHECKSUM_SIZE))?;

    let timestamps = (0..frame_count as usize)
        .map(|i| reader.read_u32_le(timestamps_offset + i * layout::TIMESTAMP_SIZE))
        .collect::<Result<Vec<_>, _>>()?;

    let stored = reader.read_u32_le(checksum_offset)?;
    let computed = checksum(reader.read_slice(0..checksum_offset)?);
    let trailing_bytes = reader.len() - (checksum_offset + CHECKSUM_SIZE);

    debug!(
        schema = schema.name(),
        %version,
        frame_count,
        checksum_ok = stored == computed,
        "decoded control file"
    );

    Ok(DecodedControl {
        file: ControlFile {
            version,
            channels,
            timestamps,
        },
        checksum: ChecksumCheck { stored, computed },
        trailing_bytes,
    })
}

/// Read the OF and strip tables, returning the offset of the frame count.
fn read_channel_tables(
    reader: &PatternReader<'_>,
    schema: Schema,
) -> Result<(ChannelConfig, usize), CodecError> {
    let mut offset = layout::CHANNELS_OFFSET;
    let (of_enabled, strip_num) = match schema {
        Schema::Fixed {
            of_channels,
            strips,
        } => {
            let flags = reader.read_slice(offset..offset + usize::from(of_channels))?;
            let of_enabled = flags
                .iter()
                .enumerate()
                .map(|(index, &value)| match value {
                    0 => Ok(false),
                    1 => Ok(true),
                    _ => Err(CodecError::InvalidEnableFlag { index, value }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            offset += flags.len();
            (of_enabled, usize::from(strips))
        }
        Schema::Variable => {
            let of_num = reader.read_u8(offset)?;
            let strip_num = reader.read_u8(offset + 1)?;
            offset += 2;
            (vec![true; usize::from(of_num)], usize::from(strip_num))
        }
    };

    let strip_led_counts = reader.read_slice(offset..offset + strip_num)?.to_vec();
    offset += strip_num;
    Ok((ChannelConfig::new(of_enabled, strip_led_counts), offset))
}

#[cfg(test)]
mod tests {
    use super::decode_control;
    use crate::codec::control::encode_control;
    use crate::codec::control::layout::Schema;
    use crate::codec::error::CodecError;
    use crate::{ChannelConfig, ControlFile, Version};

    fn sample(schema: Schema) -> ControlFile {
        let channels = match schema {
            Schema::Fixed { .. } => {
                let mut of_enabled = vec![false; 40];
                of_enabled[0] = true;
                of_enabled[7] = true;
                ChannelConfig::new(of_enabled, vec![3, 0, 2, 0, 0, 0, 0, 0])
            }
            Schema::Variable => ChannelConfig::all_enabled(10, vec![5, 10]),
        };
        ControlFile::with_interval(Version::new(1, 2), channels, 3, 100).unwrap()
    }

    #[test]
    fn decode_fixed_round_trip() {
        let file = sample(Schema::FIXED);
        let bytes = encode_control(&file, Schema::FIXED).unwrap();
        let decoded = decode_control(&bytes, Schema::FIXED).unwrap();
        assert_eq!(decoded.file, file);
        assert!(decoded.checksum.is_match());
        assert_eq!(decoded.trailing_bytes, 0);
        assert_eq!(decoded.file.timestamps, vec![0, 100, 200]);
    }

    #[test]
    fn decode_variable_round_trip() {
        let file = sample(Schema::Variable);
        let bytes = encode_control(&file, Schema::Variable).unwrap();
        let decoded = decode_control(&bytes, Schema::Variable).unwrap();
        assert_eq!(decoded.file, file);
        assert!(decoded.checksum.is_match());
    }

    #[test]
    fn decode_reports_checksum_mismatch() {
        let mut bytes = encode_control(&sample(Schema::FIXED), Schema::FIXED).unwrap();
        bytes[2] = 0;
        let decoded = decode_control(&bytes, Schema::FIXED).unwrap();
        assert!(!decoded.checksum.is_match());
        assert_eq!(decoded.checksum.computed + 1, decoded.checksum.stored);
    }

    #[test]
    fn every_truncation_is_reported() {
        let bytes = encode_control(&sample(Schema::FIXED), Schema::FIXED).unwrap();
        for len in 0..bytes.len() {
            let err = decode_control(&bytes[..len], Schema::FIXED).unwrap_err();
            assert!(
                matches!(err, CodecError::TruncatedInput { actual, .. } if actual == len),
                "length {len} gave {err:?}"
            );
        }
    }

    #[test]
    fn huge_frame_count_is_truncated_not_allocated() {
        let mut bytes = encode_control(&sample(Schema::Variable), Schema::Variable).unwrap();
        let offset = 2 + 2 + 2;
        bytes[offset..offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = decode_control(&bytes, Schema::Variable).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { .. }));
    }

    #[test]
    fn invalid_enable_flag_is_rejected() {
        let mut bytes = encode_control(&sample(Schema::FIXED), Schema::FIXED).unwrap();
        bytes[2 + 5] = 2;
        let err = decode_control(&bytes, Schema::FIXED).unwrap_err();
        assert_eq!(err, CodecError::InvalidEnableFlag { index: 5, value: 2 });
    }

    #[test]
    fn trailing_bytes_are_counted() {
        let mut bytes = encode_control(&sample(Schema::FIXED), Schema::FIXED).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        let decoded = decode_control(&bytes, Schema::FIXED).unwrap();
        assert_eq!(decoded.trailing_bytes, 2);
        assert!(decoded.checksum.is_match());
    }
}
