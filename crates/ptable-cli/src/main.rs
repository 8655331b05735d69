use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ptable_core::{
    CodecError, DecodedPattern, FileError, PatternPaths, Version, generate, read_pattern,
    write_pattern,
};

mod config;
mod logging;
mod present;

use config::{Overrides, PatternArg, PhaseArg, SchemaArg, build_config, resolve_schema};
use logging::{LogFormat, LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(name = "ptable")]
#[command(version)]
#[command(
    about = "Generate and inspect LED pattern-table files (control.dat / frame.dat).",
    long_about = None,
    after_help = "Examples:\n  ptable generate out/ --color rg --frames 100 --interval 100\n  ptable generate out/ --config pattern.json --strips 5,10,15\n  ptable inspect out/\n  ptable inspect out/ --json --pretty"
)]
struct Cli {
    /// Log verbosity (stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate control.dat and frame.dat from a pattern configuration.
    #[command(alias = "gen")]
    Generate(GenerateArgs),
    /// Decode a control.dat/frame.dat pair and report its contents.
    #[command(alias = "read")]
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory (created if missing)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Control file path (overrides DIR/control.dat)
    #[arg(long)]
    control: Option<PathBuf>,

    /// Frame file path (overrides DIR/frame.dat)
    #[arg(long)]
    frame: Option<PathBuf>,

    /// JSON pattern configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel-table schema
    #[arg(long, value_enum)]
    schema: Option<SchemaArg>,

    /// OF enable-flag slots in a fixed control file (default 40)
    #[arg(long)]
    of_channels: Option<u8>,

    /// Strip LED-count slots in a fixed control file (default 8)
    #[arg(long)]
    strip_slots: Option<u8>,

    /// Version pair written to both files (MAJOR.MINOR)
    #[arg(long)]
    table_version: Option<Version>,

    /// OF enable flags, comma separated (e.g. 1,1,0,1)
    #[arg(long, value_delimiter = ',', conflicts_with = "of_count")]
    of_enabled: Option<Vec<u8>>,

    /// Enable the first N OF channels
    #[arg(long)]
    of_count: Option<u8>,

    /// LED count per strip, comma separated (e.g. 5,10,15)
    #[arg(long, value_delimiter = ',')]
    strips: Option<Vec<u16>>,

    /// Color selector: g, r, b, rg, gb, rb or w
    #[arg(long)]
    color: Option<String>,

    /// Fade flag written to every frame (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    fade: Option<u8>,

    /// Milliseconds between frames
    #[arg(long)]
    interval: Option<u32>,

    /// Number of frames
    #[arg(long)]
    frames: Option<u32>,

    /// Color program
    #[arg(long, value_enum)]
    pattern: Option<PatternArg>,

    /// When OF channels are lit
    #[arg(long, value_enum)]
    of_phase: Option<PhaseArg>,

    /// When strip LEDs are lit
    #[arg(long, value_enum)]
    strip_phase: Option<PhaseArg>,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Directory holding control.dat and frame.dat
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Control file path (overrides DIR/control.dat)
    #[arg(long)]
    control: Option<PathBuf>,

    /// Frame file path (overrides DIR/frame.dat)
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Pattern configuration the files were generated from; its schema is reused
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel-table schema the control file was written with (default fixed)
    #[arg(long, value_enum)]
    schema: Option<SchemaArg>,

    /// OF enable-flag slots in a fixed control file (default 40)
    #[arg(long)]
    of_channels: Option<u8>,

    /// Strip LED-count slots in a fixed control file (default 8)
    #[arg(long)]
    strip_slots: Option<u8>,

    /// Write the decoded pattern as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// One line per frame instead of per-LED colors
    #[arg(long, conflicts_with = "json")]
    summary: bool,

    /// Exit with a non-zero code on checksum mismatches, missing records or leftover bytes
    #[arg(long)]
    strict: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = match &cli.command {
        Commands::Generate(args) => args.quiet,
        Commands::Inspect(args) => args.quiet,
    };
    init_logging(cli.log_format, cli.log_level, quiet);

    let result = match cli.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::Inspect(args) => cmd_inspect(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let overrides = Overrides {
        schema: args.schema,
        of_channels: args.of_channels,
        strip_slots: args.strip_slots,
        version: args.table_version,
        of_enabled: args.of_enabled,
        of_count: args.of_count,
        strips: args.strips,
        color: args.color,
        fade: args.fade,
        interval: args.interval,
        frames: args.frames,
        pattern: args.pattern,
        of_phase: args.of_phase,
        strip_phase: args.strip_phase,
    };
    let config = build_config(args.config.as_deref(), overrides)?;
    let paths = resolve_paths(&args.dir, args.control, args.frame)?;

    let pattern = generate(&config).context("pattern generation failed")?;

    for path in [&paths.control, &paths.frame] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
    }

    let summary = write_pattern(&paths, config.schema, &pattern).map_err(file_error)?;

    if !args.quiet {
        eprintln!(
            "OK: {} frames ({} bytes each) -> {}, {}",
            pattern.frames.len(),
            summary.record_len,
            paths.control.display(),
            paths.frame.display()
        );
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> Result<(), CliError> {
    let paths = resolve_paths(&args.dir, args.control, args.frame)?;
    validate_input_file(&paths.control)?;
    validate_input_file(&paths.frame)?;

    let schema = resolve_schema(
        args.config.as_deref(),
        args.schema,
        args.of_channels,
        args.strip_slots,
    )?;
    let decoded = read_pattern(&paths, schema).map_err(file_error)?;

    if !args.quiet {
        if args.json {
            println!("{}", serialize_pattern(&decoded, args.pretty)?);
        } else {
            print!("{}", present::render_text(&decoded, schema, args.summary));
        }
    }

    if args.strict && !decoded.is_intact() {
        return Err(CliError::new(
            "pattern integrity check failed",
            Some("run without --strict to see per-frame checksum status".to_string()),
        ));
    }
    Ok(())
}

fn serialize_pattern(pattern: &DecodedPattern, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(pattern)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(pattern)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn file_error(err: FileError) -> CliError {
    let hint = match err.codec_error() {
        Some(CodecError::SchemaMismatch { .. }) => Some("regenerate both files together"),
        Some(CodecError::TruncatedInput { .. } | CodecError::InvalidEnableFlag { .. }) => {
            Some("pass the --schema, --of-channels/--strip-slots or --config the files were generated with")
        }
        Some(CodecError::ChannelCount { .. } | CodecError::DisabledChannel { .. }) => {
            Some("adjust the channel tables or choose another --schema")
        }
        _ => None,
    };
    CliError::new(err.to_string(), hint.map(str::to_string))
}

fn resolve_paths(
    dir: &Path,
    control: Option<PathBuf>,
    frame: Option<PathBuf>,
) -> Result<PatternPaths, CliError> {
    let defaults = PatternPaths::in_dir(dir);
    let paths = PatternPaths::new(
        control.unwrap_or(defaults.control),
        frame.unwrap_or(defaults.frame),
    );
    if paths.control == paths.frame {
        return Err(CliError::new(
            format!(
                "control and frame paths must differ: {}",
                paths.control.display()
            ),
            Some("choose a different --control or --frame path".to_string()),
        ));
    }
    Ok(paths)
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("run `ptable generate` first or pass --control/--frame".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass the path of a .dat file".to_string()),
        ));
    }
    Ok(())
}
