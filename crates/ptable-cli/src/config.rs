use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use ptable_core::{ColorSelector, LitPhase, PatternConfig, PatternKind, Schema, Version};

use crate::CliError;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SchemaArg {
    /// 40 OF enable flags and 8 strip LED counts, no count prefix
    Fixed,
    /// OF_NUM and STRIP_NUM count bytes, all OF channels enabled
    Variable,
}

impl From<SchemaArg> for Schema {
    fn from(value: SchemaArg) -> Self {
        match value {
            SchemaArg::Fixed => Schema::FIXED,
            SchemaArg::Variable => Schema::Variable,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PatternArg {
    Blink,
    Ramp,
}

impl From<PatternArg> for PatternKind {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Blink => PatternKind::Blink,
            PatternArg::Ramp => PatternKind::Ramp,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PhaseArg {
    Odd,
    Even,
    Always,
    Never,
}

impl From<PhaseArg> for LitPhase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Odd => LitPhase::Odd,
            PhaseArg::Even => LitPhase::Even,
            PhaseArg::Always => LitPhase::Always,
            PhaseArg::Never => LitPhase::Never,
        }
    }
}

/// Command-line values that override the config file. `None` keeps the
/// file's (or the default) value.
#[derive(Debug, Default)]
pub struct Overrides {
    pub schema: Option<SchemaArg>,
    pub of_channels: Option<u8>,
    pub strip_slots: Option<u8>,
    pub version: Option<Version>,
    pub of_enabled: Option<Vec<u8>>,
    pub of_count: Option<u8>,
    pub strips: Option<Vec<u16>>,
    pub color: Option<String>,
    pub fade: Option<u8>,
    pub interval: Option<u32>,
    pub frames: Option<u32>,
    pub pattern: Option<PatternArg>,
    pub of_phase: Option<PhaseArg>,
    pub strip_phase: Option<PhaseArg>,
}

/// Build the pattern configuration: defaults, then the config file, then flags.
///
/// The color selector is validated here, before any file is touched.
pub fn build_config(path: Option<&Path>, overrides: Overrides) -> Result<PatternConfig, CliError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => PatternConfig::default(),
    };

    if let Some(color) = overrides.color {
        config.color = color.parse::<ColorSelector>().map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("choose one of: g, r, b, rg, gb, rb, w".to_string()),
            )
        })?;
    }
    config.schema = apply_schema_flags(
        config.schema,
        overrides.schema,
        overrides.of_channels,
        overrides.strip_slots,
    )?;
    if let Some(version) = overrides.version {
        config.version = version;
    }
    if let Some(flags) = overrides.of_enabled {
        config.channels.of_enabled = parse_enable_flags(&flags)?;
    }
    if let Some(count) = overrides.of_count {
        let width = match config.schema {
            Schema::Fixed { of_channels, .. } => of_channels.max(count),
            Schema::Variable => count,
        };
        config.channels.of_enabled = (0..width).map(|i| i < count).collect();
    }
    if let Some(strips) = overrides.strips {
        config.channels.strip_led_counts = parse_strip_counts(&strips)?;
    }
    if let Some(fade) = overrides.fade {
        config.fade = fade != 0;
    }
    if let Some(interval) = overrides.interval {
        config.time_interval = interval;
    }
    if let Some(frames) = overrides.frames {
        config.frame_count = frames;
    }
    if let Some(pattern) = overrides.pattern {
        config.pattern = pattern.into();
    }
    if let Some(phase) = overrides.of_phase {
        config.of_phase = phase.into();
    }
    if let Some(phase) = overrides.strip_phase {
        config.strip_phase = phase.into();
    }

    pad_to_schema(&mut config);
    Ok(config)
}

/// Schema used to read a pattern table: the config file's schema (or the
/// default fixed 40/8), then the command-line schema flags.
pub fn resolve_schema(
    config: Option<&Path>,
    schema: Option<SchemaArg>,
    of_channels: Option<u8>,
    strip_slots: Option<u8>,
) -> Result<Schema, CliError> {
    let base = match config {
        Some(path) => load_config(path)?.schema,
        None => Schema::FIXED,
    };
    apply_schema_flags(base, schema, of_channels, strip_slots)
}

/// `--schema fixed` keeps a fixed geometry that is already set;
/// `--of-channels` and `--strip-slots` resize it.
fn apply_schema_flags(
    current: Schema,
    schema: Option<SchemaArg>,
    of_channels: Option<u8>,
    strip_slots: Option<u8>,
) -> Result<Schema, CliError> {
    let selected = match (schema, current) {
        (Some(SchemaArg::Fixed), Schema::Fixed { .. }) | (None, _) => current,
        (Some(arg), _) => arg.into(),
    };
    if of_channels.is_none() && strip_slots.is_none() {
        return Ok(selected);
    }
    match selected {
        Schema::Fixed {
            of_channels: current_of,
            strips: current_strips,
        } => Ok(Schema::Fixed {
            of_channels: of_channels.unwrap_or(current_of),
            strips: strip_slots.unwrap_or(current_strips),
        }),
        Schema::Variable => Err(CliError::new(
            "--of-channels and --strip-slots only apply to the fixed schema",
            Some("drop them or pass --schema fixed".to_string()),
        )),
    }
}

fn load_config(path: &Path) -> Result<PatternConfig, CliError> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&json).map_err(|err| {
        CliError::new(
            format!("invalid config file {}: {}", path.display(), err),
            Some("expected a JSON object with fields such as schema, channels, color, frame_count".to_string()),
        )
    })
}

fn parse_enable_flags(flags: &[u8]) -> Result<Vec<bool>, CliError> {
    flags
        .iter()
        .enumerate()
        .map(|(index, &flag)| match flag {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CliError::new(
                format!("invalid OF enable flag at index {index}: {flag}"),
                Some("use 0 or 1 for each OF channel".to_string()),
            )),
        })
        .collect()
}

fn parse_strip_counts(counts: &[u16]) -> Result<Vec<u8>, CliError> {
    counts
        .iter()
        .enumerate()
        .map(|(strip, &count)| {
            u8::try_from(count).map_err(|_| {
                CliError::new(
                    format!("strip {strip} LED count out of range: {count} exceeds 255"),
                    Some("each strip holds at most 255 LEDs".to_string()),
                )
            })
        })
        .collect()
}

/// Fixed tables shorter than the schema are padded with disabled channels
/// and empty strips.
fn pad_to_schema(config: &mut PatternConfig) {
    if let Schema::Fixed {
        of_channels,
        strips,
    } = config.schema
    {
        let channels = &mut config.channels;
        if channels.of_enabled.len() < usize::from(of_channels) {
            channels.of_enabled.resize(usize::from(of_channels), false);
        }
        if channels.strip_led_counts.len() < usize::from(strips) {
            channels.strip_led_counts.resize(usize::from(strips), 0);
        }
    }
}
