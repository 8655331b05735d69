use thiserror::Error;

use crate::codec::error::CodecError;

/// Errors raised while turning a pattern configuration into records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid color selector '{selector}' (expected one of: g, r, b, rg, gb, rb, w)")]
    InvalidColorSelector { selector: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
}
