//! Rewrites `control.dat` and `frame.dat` in every golden case directory
//! from that directory's `config.json`.
//!
//! Usage: `regenerate_golden [ROOT]` (default `tests/golden`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ptable_core::{PatternConfig, PatternPaths, WriteSummary, generate, write_pattern};

const CONFIG_FILE_NAME: &str = "config.json";

fn main() -> ExitCode {
    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new("tests").join("golden"));

    match golden_cases(&root).and_then(|cases| regenerate_cases(&cases)) {
        Ok(count) => {
            eprintln!("OK: {} golden cases under {}", count, root.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(1)
        }
    }
}

/// Case directories holding a `config.json`, in name order.
fn golden_cases(root: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        fs::read_dir(root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;
    let mut cases = Vec::new();
    for entry in entries {
        let dir = entry
            .map_err(|err| format!("failed to read {}: {}", root.display(), err))?
            .path();
        if dir.join(CONFIG_FILE_NAME).is_file() {
            cases.push(dir);
        }
    }
    cases.sort();
    Ok(cases)
}

fn regenerate_cases(cases: &[PathBuf]) -> Result<usize, String> {
    for dir in cases {
        let summary = regenerate_case(dir)?;
        eprintln!(
            "{}: control {} bytes, frame {} bytes ({} per record)",
            dir.display(),
            summary.control_bytes,
            summary.frame_bytes,
            summary.record_len
        );
    }
    Ok(cases.len())
}

fn regenerate_case(dir: &Path) -> Result<WriteSummary, String> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let json = fs::read_to_string(&config_path)
        .map_err(|err| format!("failed to read {}: {}", config_path.display(), err))?;
    let config: PatternConfig = serde_json::from_str(&json)
        .map_err(|err| format!("invalid config {}: {}", config_path.display(), err))?;
    let pattern = generate(&config).map_err(|err| format!("{}: {}", dir.display(), err))?;
    write_pattern(&PatternPaths::in_dir(dir), config.schema, &pattern)
        .map_err(|err| err.to_string())
}
