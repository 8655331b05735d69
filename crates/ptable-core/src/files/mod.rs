//! Pattern file I/O.
//!
//! This is the only module that touches the filesystem. Each call reads or
//! writes whole files, so handles never outlive a single operation.
//!
//! [`write_pattern`] replaces the pair as a unit: both files are encoded in
//! memory, staged next to their targets as `<name>.tmp`, and only then
//! renamed into place. A failed call leaves the previous pair untouched and
//! removes its staging files.

mod error;

pub use error::FileError;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::codec::control::{DecodedControl, Schema, decode_control, encode_control};
use crate::codec::frame::{FrameStream, decode_frame_file, encode_frame_file};
use crate::pattern::GeneratedPattern;

pub const CONTROL_FILE_NAME: &str = "control.dat";
pub const FRAME_FILE_NAME: &str = "frame.dat";

/// Locations of a control/frame file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternPaths {
    pub control: PathBuf,
    pub frame: PathBuf,
}

impl PatternPaths {
    pub fn new(control: impl Into<PathBuf>, frame: impl Into<PathBuf>) -> Self {
        Self {
            control: control.into(),
            frame: frame.into(),
        }
    }

    /// `control.dat` and `frame.dat` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONTROL_FILE_NAME), dir.join(FRAME_FILE_NAME))
    }
}

/// Sizes of the files produced by [`write_pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub control_bytes: usize,
    pub frame_bytes: usize,
    pub record_len: usize,
}

/// A decoded control/frame pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPattern {
    pub control: DecodedControl,
    pub frames: FrameStream,
    /// Record length derived from the control file's channel tables.
    pub record_len: usize,
}

impl DecodedPattern {
    /// Control checksum matches, every record was recovered, every record
    /// checksum matches and no bytes were left over in either file.
    pub fn is_intact(&self) -> bool {
        self.control.checksum.is_match()
            && self.control.trailing_bytes == 0
            && self.frames.is_complete()
            && self.frames.checksum_mismatches() == 0
    }
}

/// Encode `pattern` and write both files.
///
/// # Errors
/// Returns `FileError::Codec` when the pattern does not fit `schema` and
/// `FileError::Io` when a file cannot be staged or renamed. In both cases
/// the files at `paths` keep their previous contents.
pub fn write_pattern(
    paths: &PatternPaths,
    schema: Schema,
    pattern: &GeneratedPattern,
) -> Result<WriteSummary, FileError> {
    let control = &pattern.control;
    let layout = control.channels.layout();
    let control_bytes =
        encode_control(control, schema).map_err(|err| FileError::codec(&paths.control, err))?;
    let frame_bytes = encode_frame_file(control.version, &pattern.frames, &layout)
        .map_err(|err| FileError::codec(&paths.frame, err))?;

    replace_pair(paths, &control_bytes, &frame_bytes)?;

    info!(
        control = %paths.control.display(),
        frame = %paths.frame.display(),
        frames = pattern.frames.len(),
        "pattern written"
    );
    Ok(WriteSummary {
        control_bytes: control_bytes.len(),
        frame_bytes: frame_bytes.len(),
        record_len: layout.record_len(),
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn discard<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let _ = fs::remove_file(path.as_ref());
    }
}

/// Stage both files, then rename frame and control into place. If the
/// control rename fails the previous frame file is restored.
fn replace_pair(paths: &PatternPaths, control: &[u8], frame: &[u8]) -> Result<(), FileError> {
    let control_tmp = staging_path(&paths.control);
    let frame_tmp = staging_path(&paths.frame);

    let staged = fs::write(&control_tmp, control)
        .map_err(|err| FileError::io(&control_tmp, err))
        .and_then(|()| fs::write(&frame_tmp, frame).map_err(|err| FileError::io(&frame_tmp, err)));
    if let Err(err) = staged {
        discard(&[&control_tmp, &frame_tmp]);
        return Err(err);
    }

    let previous_frame = match fs::read(&paths.frame) {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            discard(&[&control_tmp, &frame_tmp]);
            return Err(FileError::io(&paths.frame, err));
        }
    };

    if let Err(err) = fs::rename(&frame_tmp, &paths.frame) {
        discard(&[&control_tmp, &frame_tmp]);
        return Err(FileError::io(&paths.frame, err));
    }

    if let Err(err) = fs::rename(&control_tmp, &paths.control) {
        discard(&[&control_tmp]);
        let restored = match previous_frame {
            Some(bytes) => fs::write(&paths.frame, bytes),
            None => fs::remove_file(&paths.frame),
        };
        if let Err(restore_err) = restored {
            warn!(
                path = %paths.frame.display(),
                error = %restore_err,
                "failed to restore previous frame file"
            );
        }
        return Err(FileError::io(&paths.control, err));
    }
    Ok(())
}

/// Read and decode a control/frame pair.
///
/// Integrity problems that do not stop decoding (checksum mismatches, a
/// partial stream, leftover bytes, non-monotonic timestamps) are logged and
/// reported on the result.
///
/// # Errors
/// Returns `FileError::Io` when a file cannot be read and `FileError::Codec`
/// when the control file is malformed or the versions differ.
pub fn read_pattern(paths: &PatternPaths, schema: Schema) -> Result<DecodedPattern, FileError> {
    let control_bytes = fs::read(&paths.control).map_err(|err| FileError::io(&paths.control, err))?;
    let control = decode_control(&control_bytes, schema)
        .map_err(|err| FileError::codec(&paths.control, err))?;
    report_control_issues(&paths.control, &control);

    let frame_bytes = fs::read(&paths.frame).map_err(|err| FileError::io(&paths.frame, err))?;
    let frames = decode_frame_file(&frame_bytes, &control.file)
        .map_err(|err| FileError::codec(&paths.frame, err))?;
    report_frame_issues(&paths.frame, &frames);

    let record_len = control.file.channels.layout().record_len();
    Ok(DecodedPattern {
        control,
        frames,
        record_len,
    })
}

fn report_control_issues(path: &Path, control: &DecodedControl) {
    if !control.checksum.is_match() {
        warn!(
            path = %path.display(),
            stored = control.checksum.stored,
            computed = control.checksum.computed,
            "control checksum mismatch"
        );
    }
    if control.trailing_bytes > 0 {
        warn!(path = %path.display(), bytes = control.trailing_bytes, "trailing bytes after control checksum");
    }
    if let Some(index) = control.file.first_non_monotonic() {
        warn!(path = %path.display(), index, "timestamps are not monotonic");
    }
}

fn report_frame_issues(path: &Path, frames: &FrameStream) {
    if frames.is_partial() {
        warn!(
            path = %path.display(),
            decoded = frames.frames.len(),
            expected = frames.expected,
            "frame file ends early"
        );
    }
    if frames.leftover_bytes > 0 {
        warn!(path = %path.display(), bytes = frames.leftover_bytes, "unconsumed bytes in frame file");
    }
    let mismatches = frames.checksum_mismatches();
    if mismatches > 0 {
        warn!(path = %path.display(), records = mismatches, "frame checksum mismatch");
    }
}
