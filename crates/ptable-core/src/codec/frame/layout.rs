use serde::{Deserialize, Serialize};

use crate::Color;
use crate::checksum::CHECKSUM_SIZE;

/// `[major][minor]` header at the start of frame.dat.
pub const FILE_HEADER_SIZE: usize = 2;

pub const START_TIME_OFFSET: usize = 0;
pub const FADE_OFFSET: usize = 4;
pub const COLORS_OFFSET: usize = 5;

/// Per-record geometry derived from a control file's channel tables.
///
/// # Examples
/// ```
/// use ptable_core::FrameLayout;
///
/// let layout = FrameLayout::new(2, vec![1]);
/// assert_eq!(layout.record_len(), 4 + 1 + 2 * 3 + 1 * 3 + 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    /// Number of enabled OF channels.
    pub of_count: usize,
    /// LED count per strip, in strip order.
    pub led_counts: Vec<u8>,
}

impl FrameLayout {
    pub fn new(of_count: usize, led_counts: Vec<u8>) -> Self {
        Self {
            of_count,
            led_counts,
        }
    }

    pub fn total_leds(&self) -> usize {
        self.led_counts.iter().map(|&count| usize::from(count)).sum()
    }

    /// Offset of the first strip color within a record.
    pub fn strip_colors_offset(&self) -> usize {
        COLORS_OFFSET + self.of_count * Color::SIZE
    }

    /// Offset of the checksum field within a record.
    pub fn checksum_offset(&self) -> usize {
        self.strip_colors_offset() + self.total_leds() * Color::SIZE
    }

    /// Full record length including the trailing checksum.
    pub fn record_len(&self) -> usize {
        self.checksum_offset() + CHECKSUM_SIZE
    }
}
