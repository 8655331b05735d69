use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ptable_core::{
    ChannelConfig, CodecError, ColorSelector, FileError, PatternConfig, PatternPaths, Schema,
    Version, generate, read_pattern, write_pattern,
};

fn temp_dir(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ptable_{label}_{unique}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config() -> PatternConfig {
    PatternConfig {
        channels: ChannelConfig::new(
            (0..40).map(|i| i % 3 == 0).collect(),
            vec![4, 0, 0, 7, 0, 0, 0, 1],
        ),
        color: ColorSelector::B,
        frame_count: 6,
        time_interval: 40,
        ..PatternConfig::default()
    }
}

#[test]
fn write_then_read_round_trips() {
    let dir = temp_dir("round_trip");
    let paths = PatternPaths::in_dir(&dir);
    let pattern = generate(&config()).unwrap();

    let summary = write_pattern(&paths, Schema::FIXED, &pattern).unwrap();
    assert_eq!(summary.frame_bytes, 2 + 6 * summary.record_len);

    let decoded = read_pattern(&paths, Schema::FIXED).unwrap();
    let _ = fs::remove_dir_all(&dir);

    assert!(decoded.is_intact());
    assert_eq!(decoded.control.file, pattern.control);
    assert_eq!(decoded.frames.frames.len(), 6);
    assert_eq!(decoded.record_len, summary.record_len);
}

#[test]
fn truncated_frame_file_yields_partial_stream() {
    let dir = temp_dir("partial");
    let paths = PatternPaths::in_dir(&dir);
    let pattern = generate(&config()).unwrap();
    let summary = write_pattern(&paths, Schema::FIXED, &pattern).unwrap();

    let mut bytes = fs::read(&paths.frame).unwrap();
    bytes.truncate(bytes.len() - summary.record_len / 2);
    fs::write(&paths.frame, &bytes).unwrap();

    let decoded = read_pattern(&paths, Schema::FIXED).unwrap();
    let _ = fs::remove_dir_all(&dir);

    assert!(decoded.frames.is_partial());
    assert_eq!(decoded.frames.frames.len(), 5);
    assert!(!decoded.is_intact());
}

#[test]
fn version_mismatch_stops_before_records() {
    let dir = temp_dir("version");
    let paths = PatternPaths::in_dir(&dir);
    let pattern = generate(&config()).unwrap();
    write_pattern(&paths, Schema::FIXED, &pattern).unwrap();

    let mut bytes = fs::read(&paths.frame).unwrap();
    bytes[1] = 9;
    fs::write(&paths.frame, &bytes).unwrap();

    let err = read_pattern(&paths, Schema::FIXED).unwrap_err();
    let _ = fs::remove_dir_all(&dir);

    assert_eq!(
        err.codec_error(),
        Some(&CodecError::SchemaMismatch {
            control: Version::new(1, 2),
            frame: Version::new(1, 9),
        })
    );
}

#[test]
fn schema_violation_writes_nothing() {
    let dir = temp_dir("schema");
    let paths = PatternPaths::in_dir(&dir);
    let pattern = generate(&config()).unwrap();

    let err = write_pattern(&paths, Schema::Variable, &pattern).unwrap_err();
    let exists = paths.control.exists() || paths.frame.exists();
    let _ = fs::remove_dir_all(&dir);

    assert!(matches!(
        err.codec_error(),
        Some(CodecError::DisabledChannel { index: 1 })
    ));
    assert!(!exists);
}

#[test]
fn missing_control_file_is_io_error() {
    let dir = temp_dir("missing");
    let err = read_pattern(&PatternPaths::in_dir(&dir), Schema::FIXED).unwrap_err();
    let _ = fs::remove_dir_all(&dir);

    assert!(matches!(err, FileError::Io { .. }));
    assert!(err.to_string().contains("control.dat"));
}

fn shorter(frame_count: u32) -> PatternConfig {
    PatternConfig {
        frame_count,
        ..config()
    }
}

fn staging_leftovers(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn failed_frame_replace_keeps_previous_control() {
    let dir = temp_dir("frame_blocked");
    let paths = PatternPaths::in_dir(&dir);
    write_pattern(&paths, Schema::FIXED, &generate(&config()).unwrap()).unwrap();
    let control_before = fs::read(&paths.control).unwrap();

    fs::remove_file(&paths.frame).unwrap();
    fs::create_dir(&paths.frame).unwrap();

    let result = write_pattern(&paths, Schema::FIXED, &generate(&shorter(2)).unwrap());
    let control_after = fs::read(&paths.control).unwrap();
    let leftovers = staging_leftovers(&dir);
    let _ = fs::remove_dir_all(&dir);

    assert!(matches!(result, Err(FileError::Io { .. })));
    assert_eq!(control_after, control_before);
    assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
}

#[test]
fn failed_control_replace_restores_previous_frame() {
    let dir = temp_dir("control_blocked");
    let paths = PatternPaths::in_dir(&dir);
    write_pattern(&paths, Schema::FIXED, &generate(&config()).unwrap()).unwrap();
    let frame_before = fs::read(&paths.frame).unwrap();

    fs::remove_file(&paths.control).unwrap();
    fs::create_dir(&paths.control).unwrap();

    let err = write_pattern(&paths, Schema::FIXED, &generate(&shorter(2)).unwrap()).unwrap_err();
    let frame_after = fs::read(&paths.frame).unwrap();
    let leftovers = staging_leftovers(&dir);
    let _ = fs::remove_dir_all(&dir);

    assert!(err.to_string().contains("control.dat"));
    assert_eq!(frame_after, frame_before);
    assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
}

#[test]
fn unwritable_directory_creates_nothing() {
    let dir = temp_dir("no_parent");
    let paths = PatternPaths::in_dir(&dir.join("missing"));

    let err = write_pattern(&paths, Schema::FIXED, &generate(&config()).unwrap()).unwrap_err();
    let created = dir.join("missing").exists();
    let _ = fs::remove_dir_all(&dir);

    assert!(matches!(err, FileError::Io { .. }));
    assert!(err.to_string().contains(".tmp"));
    assert!(!created);
}
