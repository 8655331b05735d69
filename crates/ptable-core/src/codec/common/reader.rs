use crate::Color;
use crate::codec::error::CodecError;

/// Bounds-checked byte access shared by the control and frame parsers.
///
/// Every read either returns the requested bytes or `TruncatedInput`; no
/// parser indexes the payload directly.
pub(crate) struct PatternReader<'a> {
    payload: &'a [u8],
}

impl<'a> PatternReader<'a> {
    pub(crate) fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub(crate) fn len(&self) -> usize {
        self.payload.len()
    }

    pub(crate) fn require_len(&self, needed: usize) -> Result<(), CodecError> {
        if self.payload.len() < needed {
            return Err(CodecError::TruncatedInput {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn read_u8(&self, offset: usize) -> Result<u8, CodecError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(CodecError::TruncatedInput {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub(crate) fn read_u32_le(&self, offset: usize) -> Result<u32, CodecError> {
        let bytes = self.read_slice(offset..offset + 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_colors(&self, offset: usize, count: usize) -> Result<Vec<Color>, CodecError> {
        let end = count
            .checked_mul(Color::SIZE)
            .and_then(|len| offset.checked_add(len))
            .ok_or(CodecError::TruncatedInput {
                needed: usize::MAX,
                actual: self.payload.len(),
            })?;
        let bytes = self.read_slice(offset..end)?;
        Ok(bytes
            .chunks_exact(Color::SIZE)
            .map(|c| Color::from_bytes([c[0], c[1], c[2]]))
            .collect())
    }

    pub(crate) fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], CodecError> {
        self.payload
            .get(range.clone())
            .ok_or(CodecError::TruncatedInput {
                needed: range.end,
                actual: self.payload.len(),
            })
    }
}
