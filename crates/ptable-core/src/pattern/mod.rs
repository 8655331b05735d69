//! Pattern generation.
//!
//! A [`PatternConfig`] carries every parameter the generator needs (channel
//! geometry, color, fade, timing, frame count) so callers never prompt or
//! touch global tables. [`generate`] turns it into a control file and one
//! record per frame; the `files` module writes them out.
//!
//! OF channels and strip LEDs follow independent [`LitPhase`] policies. The
//! default lights both classes on odd frame indices.

mod color;
mod error;

pub use color::ColorSelector;
pub use error::PatternError;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::control::Schema;
use crate::{ChannelConfig, Color, ControlFile, FrameLayout, FrameRecord, Version};

/// When a channel class is lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LitPhase {
    /// Lit on odd frame indices, dark on even ones.
    #[default]
    Odd,
    /// Lit on even frame indices.
    Even,
    Always,
    Never,
}

impl LitPhase {
    pub fn is_lit(self, frame_index: u32) -> bool {
        match self {
            LitPhase::Odd => frame_index % 2 == 1,
            LitPhase::Even => frame_index % 2 == 0,
            LitPhase::Always => true,
            LitPhase::Never => false,
        }
    }
}

/// Color program applied to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Every channel shows the selected color or is dark, per its phase.
    #[default]
    Blink,
    /// Test ramp: channel `i` in frame `k` is `((i+1+k), (i+2+k), (i+3+k)) mod 255`.
    /// Strip LED `j` of strip `s` uses `s*10 + j` for `i`.
    Ramp,
}

/// Everything needed to generate a pattern table.
///
/// # Examples
/// ```
/// use ptable_core::PatternConfig;
///
/// let config: PatternConfig = serde_json::from_str(r#"{"color": "gb", "frame_count": 4}"#)?;
/// assert_eq!(config.frame_count, 4);
/// assert_eq!(config.time_interval, 100);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    pub schema: Schema,
    pub version: Version,
    pub channels: ChannelConfig,
    pub color: ColorSelector,
    pub fade: bool,
    /// Milliseconds between consecutive frame start times.
    pub time_interval: u32,
    pub frame_count: u32,
    pub pattern: PatternKind,
    pub of_phase: LitPhase,
    pub strip_phase: LitPhase,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            schema: Schema::FIXED,
            version: Version::default(),
            channels: ChannelConfig::all_enabled(40, vec![0; 8]),
            color: ColorSelector::default(),
            fade: true,
            time_interval: 100,
            frame_count: 100,
            pattern: PatternKind::default(),
            of_phase: LitPhase::default(),
            strip_phase: LitPhase::default(),
        }
    }
}

/// Control file and frame records produced by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPattern {
    pub control: ControlFile,
    pub frames: Vec<FrameRecord>,
}

/// Build the control file and every frame record for `config`.
///
/// Start times equal the control timestamps: `index * time_interval`.
///
/// # Errors
/// Returns `PatternError::Codec` when a timestamp overflows 32 bits.
pub fn generate(config: &PatternConfig) -> Result<GeneratedPattern, PatternError> {
    let control = ControlFile::with_interval(
        config.version,
        config.channels.clone(),
        config.frame_count,
        config.time_interval,
    )?;
    let layout = control.channels.layout();
    let frames = (0u32..)
        .zip(&control.timestamps)
        .map(|(index, &start_time)| match config.pattern {
            PatternKind::Blink => blink_frame(config, &layout, index, start_time),
            PatternKind::Ramp => ramp_frame(config, index, start_time),
        })
        .collect::<Vec<_>>();

    debug!(
        pattern = ?config.pattern,
        frames = frames.len(),
        of_count = layout.of_count,
        total_leds = layout.total_leds(),
        "generated pattern"
    );
    Ok(GeneratedPattern { control, frames })
}

fn blink_frame(
    config: &PatternConfig,
    layout: &FrameLayout,
    index: u32,
    start_time: u32,
) -> FrameRecord {
    let color = config.color.color();
    let pick = |phase: LitPhase| if phase.is_lit(index) { color } else { Color::OFF };
    FrameRecord::uniform(
        start_time,
        config.fade,
        pick(config.of_phase),
        pick(config.strip_phase),
        layout,
    )
}

fn ramp_frame(config: &PatternConfig, index: u32, start_time: u32) -> FrameRecord {
    let channels = &config.channels;
    let of_colors = channels
        .of_enabled
        .iter()
        .enumerate()
        .filter(|(_, enabled)| **enabled)
        .map(|(channel, _)| ramp_color(channel as u64, index))
        .collect();
    let strip_colors = channels
        .strip_led_counts
        .iter()
        .enumerate()
        .flat_map(|(strip, &count)| {
            (0..u64::from(count)).map(move |led| ramp_color(strip as u64 * 10 + led, index))
        })
        .collect();

    FrameRecord {
        start_time,
        fade: config.fade,
        of_colors,
        strip_colors,
    }
}

fn ramp_color(base: u64, frame_index: u32) -> Color {
    let step = |offset: u64| ((base + offset + u64::from(frame_index)) % 255) as u8;
    Color::new(step(1), step(2), step(3))
}

#[cfg(test)]
mod tests {
    use super::{LitPhase, PatternConfig, PatternKind, generate};
    use crate::pattern::ColorSelector;
    use crate::{ChannelConfig, Color, CodecError, PatternError};

    fn small_config() -> PatternConfig {
        PatternConfig {
            channels: ChannelConfig::all_enabled(2, vec![1]),
            color: ColorSelector::Rg,
            frame_count: 3,
            ..PatternConfig::default()
        }
    }

    #[test]
    fn blink_alternates_from_dark() {
        let pattern = generate(&small_config()).unwrap();
        assert_eq!(pattern.control.timestamps, vec![0, 100, 200]);
        let lit = Color::new(255, 255, 0);
        let colors: Vec<_> = pattern.frames.iter().map(|f| f.of_colors[0]).collect();
        assert_eq!(colors, vec![Color::OFF, lit, Color::OFF]);
        assert_eq!(pattern.frames[1].strip_colors, vec![lit]);
        assert!(pattern.frames.iter().all(|f| f.fade));
    }

    #[test]
    fn phases_are_independent_per_class() {
        let config = PatternConfig {
            of_phase: LitPhase::Odd,
            strip_phase: LitPhase::Even,
            ..small_config()
        };
        let pattern = generate(&config).unwrap();
        let frame0 = &pattern.frames[0];
        assert_eq!(frame0.of_colors[0], Color::OFF);
        assert_eq!(frame0.strip_colors[0], Color::new(255, 255, 0));
        let frame1 = &pattern.frames[1];
        assert_eq!(frame1.of_colors[0], Color::new(255, 255, 0));
        assert_eq!(frame1.strip_colors[0], Color::OFF);
    }

    #[test]
    fn always_and_never_ignore_index() {
        for index in 0..4 {
            assert!(LitPhase::Always.is_lit(index));
            assert!(!LitPhase::Never.is_lit(index));
        }
    }

    #[test]
    fn ramp_uses_physical_channel_and_strip_indices() {
        let config = PatternConfig {
            channels: ChannelConfig::new(vec![false, true], vec![0, 2]),
            pattern: PatternKind::Ramp,
            frame_count: 2,
            ..PatternConfig::default()
        };
        let pattern = generate(&config).unwrap();
        let frame1 = &pattern.frames[1];
        assert_eq!(frame1.of_colors, vec![Color::new(3, 4, 5)]);
        assert_eq!(
            frame1.strip_colors,
            vec![Color::new(12, 13, 14), Color::new(13, 14, 15)]
        );
    }

    #[test]
    fn ramp_wraps_modulo_255() {
        let config = PatternConfig {
            channels: ChannelConfig::all_enabled(1, vec![]),
            pattern: PatternKind::Ramp,
            frame_count: 254,
            ..PatternConfig::default()
        };
        let pattern = generate(&config).unwrap();
        assert_eq!(pattern.frames[253].of_colors[0], Color::new(254, 0, 1));
    }

    #[test]
    fn timestamp_overflow_is_reported() {
        let config = PatternConfig {
            time_interval: u32::MAX,
            ..small_config()
        };
        let err = generate(&config).unwrap_err();
        assert!(matches!(
            err,
            PatternError::Codec(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let err = serde_json::from_str::<PatternConfig>(r#"{"colour": "g"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
