use thiserror::Error;

use crate::Version;

/// Errors returned by the control and frame codecs.
///
/// # Examples
/// ```
/// use ptable_core::CodecError;
///
/// let err = CodecError::TruncatedInput { needed: 14, actual: 9 };
/// assert!(err.to_string().contains("truncated input"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated input: need {needed} bytes, got {actual}")]
    TruncatedInput { needed: usize, actual: usize },
    #[error("version mismatch: control file is {control}, frame file is {frame}")]
    SchemaMismatch { control: Version, frame: Version },
    #[error("invalid OF enable flag at index {index}: {value} (expected 0 or 1)")]
    InvalidEnableFlag { index: usize, value: u8 },
    #[error("{kind} channel count mismatch: schema expects {expected}, got {actual}")]
    ChannelCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("OF channel {index} is disabled; the variable schema only stores enabled channels")]
    DisabledChannel { index: usize },
    #[error("{field} out of range: {value} exceeds {max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error("record does not match frame layout: {field} expects {expected}, got {actual}")]
    LayoutMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
