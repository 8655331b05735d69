//! ptable core library: LED pattern-table codec.
//!
//! A pattern table is a pair of flat binary files. `control.dat` declares the
//! channel geometry (enabled OF channels, LEDs per strip), the frame count and
//! one timestamp per frame. `frame.dat` holds one fixed-size record per frame
//! with a start time, a fade flag and a color triple for every enabled channel.
//! Both files start with the same major/minor version pair and carry additive
//! checksums.
//!
//! The crate is layered like this: `checksum` is the shared integrity
//! primitive, `codec` holds the pure byte-level encoders and decoders,
//! `pattern` turns a [`PatternConfig`] into records, and `files` does the only
//! I/O. Writer and reader derive the record layout from the same
//! [`ChannelConfig`], so record length is never stored in the files.
//!
//! Invariants:
//! - Every byte read is bounds-checked; short input yields `TruncatedInput`.
//! - Checksums cover exactly the bytes that precede them.
//! - Color triples are stored in (G, R, B) order and decoded positionally.
//!
//! # Examples
//! ```
//! use ptable_core::{PatternConfig, Schema, decode_control, decode_frame_file, generate};
//! use ptable_core::{encode_control, encode_frame_file};
//!
//! let pattern = generate(&PatternConfig::default())?;
//! let control = encode_control(&pattern.control, Schema::FIXED)?;
//! let frames = encode_frame_file(
//!     pattern.control.version,
//!     &pattern.frames,
//!     &pattern.control.channels.layout(),
//! )?;
//!
//! let decoded = decode_control(&control, Schema::FIXED)?;
//! let stream = decode_frame_file(&frames, &decoded.file)?;
//! assert!(stream.is_complete());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod checksum;
pub mod codec;
pub mod files;
pub mod pattern;

pub use checksum::{Checksum, ChecksumCheck, checksum, verify};
pub use codec::control::{DecodedControl, Schema, decode_control, encode_control};
pub use codec::error::CodecError;
pub use codec::frame::{
    DecodedFrame, FrameLayout, FrameStream, decode_frame_file, decode_record, decode_stream,
    encode_frame_file, encode_record, encode_uniform_record,
};
pub use files::{
    CONTROL_FILE_NAME, DecodedPattern, FRAME_FILE_NAME, FileError, PatternPaths, WriteSummary,
    read_pattern, write_pattern,
};
pub use pattern::{
    ColorSelector, GeneratedPattern, LitPhase, PatternConfig, PatternError, PatternKind, generate,
};

/// Major/minor version pair written at the start of both files.
///
/// # Examples
/// ```
/// use ptable_core::Version;
///
/// let version: Version = "1.2".parse().unwrap();
/// assert_eq!(version, Version::new(1, 2));
/// assert_eq!(version.to_string(), "1.2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("invalid version '{s}': expected MAJOR.MINOR"))?;
        let parse = |part: &str| {
            part.parse::<u8>()
                .map_err(|_| format!("invalid version '{s}': parts must be 0-255"))
        };
        Ok(Self::new(parse(major)?, parse(minor)?))
    }
}

/// One color triple in stored byte order.
///
/// Files store `(G, R, B)`; readers interpret position, so the fields are
/// declared in that order and [`Color::to_bytes`] never reorders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub g: u8,
    pub r: u8,
    pub b: u8,
}

impl Color {
    pub const SIZE: usize = 3;
    pub const OFF: Color = Color::new(0, 0, 0);

    pub const fn new(g: u8, r: u8, b: u8) -> Self {
        Self { g, r, b }
    }

    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [self.g, self.r, self.b]
    }
}

/// Channel geometry shared by the control and frame codecs.
///
/// `of_count` and `total_leds` are always derived from the two tables so the
/// writer and the reader compute the same record layout.
///
/// # Examples
/// ```
/// use ptable_core::ChannelConfig;
///
/// let channels = ChannelConfig::new(vec![true, false, true], vec![5, 0, 10]);
/// assert_eq!(channels.of_count(), 2);
/// assert_eq!(channels.total_leds(), 15);
/// assert_eq!(channels.layout().record_len(), 4 + 1 + 2 * 3 + 15 * 3 + 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Per-OF-channel enable flags.
    pub of_enabled: Vec<bool>,
    /// LEDs per strip; 0 marks an absent strip.
    pub strip_led_counts: Vec<u8>,
}

impl ChannelConfig {
    pub fn new(of_enabled: Vec<bool>, strip_led_counts: Vec<u8>) -> Self {
        Self {
            of_enabled,
            strip_led_counts,
        }
    }

    /// `of_num` enabled OF channels, as written by the variable schema.
    pub fn all_enabled(of_num: usize, strip_led_counts: Vec<u8>) -> Self {
        Self::new(vec![true; of_num], strip_led_counts)
    }

    pub fn of_count(&self) -> usize {
        self.of_enabled.iter().filter(|&&enabled| enabled).count()
    }

    /// Strips with at least one LED.
    pub fn active_strips(&self) -> usize {
        self.strip_led_counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn total_leds(&self) -> usize {
        self.strip_led_counts
            .iter()
            .map(|&count| usize::from(count))
            .sum()
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout::new(self.of_count(), self.strip_led_counts.clone())
    }
}

/// Decoded or to-be-encoded control file contents.
///
/// The frame count is the number of timestamps; it is not stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFile {
    pub version: Version,
    pub channels: ChannelConfig,
    /// Start time of each frame, in frame order.
    pub timestamps: Vec<u32>,
}

impl ControlFile {
    /// Build a control file whose timestamps are `index * time_interval`.
    ///
    /// # Errors
    /// Returns `OutOfRange` when the last timestamp does not fit in 32 bits.
    ///
    /// # Examples
    /// ```
    /// use ptable_core::{ChannelConfig, ControlFile, Version};
    ///
    /// let channels = ChannelConfig::all_enabled(2, vec![1]);
    /// let control = ControlFile::with_interval(Version::new(1, 2), channels, 3, 100)?;
    /// assert_eq!(control.timestamps, vec![0, 100, 200]);
    /// # Ok::<(), ptable_core::CodecError>(())
    /// ```
    pub fn with_interval(
        version: Version,
        channels: ChannelConfig,
        frame_count: u32,
        time_interval: u32,
    ) -> Result<Self, CodecError> {
        let timestamps = (0..frame_count)
            .map(|index| frame_start_time(index, time_interval))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version,
            channels,
            timestamps,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Index of the first timestamp that is smaller than its predecessor.
    pub fn first_non_monotonic(&self) -> Option<usize> {
        self.timestamps
            .windows(2)
            .position(|pair| pair[1] < pair[0])
            .map(|index| index + 1)
    }
}

/// `index * time_interval`, rejecting values that do not fit in 32 bits.
pub fn frame_start_time(index: u32, time_interval: u32) -> Result<u32, CodecError> {
    index
        .checked_mul(time_interval)
        .ok_or(CodecError::OutOfRange {
            field: "timestamp",
            value: u64::from(index) * u64::from(time_interval),
            max: u64::from(u32::MAX),
        })
}

/// One frame's lighting state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub start_time: u32,
    pub fade: bool,
    /// One color per enabled OF channel.
    pub of_colors: Vec<Color>,
    /// One color per strip LED, strip-major then LED-minor.
    pub strip_colors: Vec<Color>,
}

impl FrameRecord {
    /// A record where every OF channel shows `of_color` and every strip LED
    /// shows `strip_color`.
    pub fn uniform(
        start_time: u32,
        fade: bool,
        of_color: Color,
        strip_color: Color,
        layout: &FrameLayout,
    ) -> Self {
        Self {
            start_time,
            fade,
            of_colors: vec![of_color; layout.of_count],
            strip_colors: vec![strip_color; layout.total_leds()],
        }
    }

    /// Colors of strip `strip`, or `None` when the strip index is out of range.
    pub fn strip(&self, layout: &FrameLayout, strip: usize) -> Option<&[Color]> {
        let count = usize::from(*layout.led_counts.get(strip)?);
        let start: usize = layout.led_counts[..strip]
            .iter()
            .map(|&c| usize::from(c))
            .sum();
        self.strip_colors.get(start..start + count)
    }
}
