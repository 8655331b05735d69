use std::path::PathBuf;

use thiserror::Error;

use crate::codec::error::CodecError;

/// Errors returned while reading or writing pattern files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl FileError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn codec(path: &std::path::Path, source: CodecError) -> Self {
        FileError::Codec {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The codec error behind this failure, if any.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            FileError::Codec { source, .. } => Some(source),
            FileError::Io { .. } => None,
        }
    }
}
