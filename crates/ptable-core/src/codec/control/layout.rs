use serde::{Deserialize, Serialize};

pub const VERSION_RANGE: std::ops::Range<usize> = 0..2;
pub const CHANNELS_OFFSET: usize = 2;

pub const FRAME_COUNT_SIZE: usize = 4;
pub const TIMESTAMP_SIZE: usize = 4;

pub const FIXED_OF_CHANNELS: u8 = 40;
pub const FIXED_STRIPS: u8 = 8;

/// Channel-table encoding used by a control file.
///
/// The two variants are not mutually readable: a reader must be told which
/// one produced the file.
///
/// - `Fixed`: `of_channels` enable flags then `strips` LED counts, one byte
///   each, with no count prefix.
/// - `Variable`: an `OF_NUM` byte and a `STRIP_NUM` byte, then `STRIP_NUM`
///   LED counts. Every OF channel is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Schema {
    Fixed {
        #[serde(default = "default_of_channels")]
        of_channels: u8,
        #[serde(default = "default_strips")]
        strips: u8,
    },
    Variable,
}

impl Schema {
    pub const FIXED: Schema = Schema::Fixed {
        of_channels: FIXED_OF_CHANNELS,
        strips: FIXED_STRIPS,
    };

    pub fn name(&self) -> &'static str {
        match self {
            Schema::Fixed { .. } => "fixed",
            Schema::Variable => "variable",
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::FIXED
    }
}

fn default_of_channels() -> u8 {
    FIXED_OF_CHANNELS
}

fn default_strips() -> u8 {
    FIXED_STRIPS
}
