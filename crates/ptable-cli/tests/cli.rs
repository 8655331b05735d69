use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ptable"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden_dir(name: &str) -> std::path::PathBuf {
    repo_root().join("tests").join("golden").join(name)
}

fn generate_into(dir: &std::path::Path) {
    cmd()
        .arg("generate")
        .arg(dir)
        .args(["--of-count", "4", "--strips", "3,0,2", "--color", "rg"])
        .args(["--frames", "4", "--interval", "100"])
        .assert()
        .success();
}

#[test]
fn help_supports_generate_and_inspect() {
    cmd().arg("generate").arg("--help").assert().success();
    cmd().arg("inspect").arg("--help").assert().success();
}

#[test]
fn invalid_color_fails_without_writing() {
    let temp = TempDir::new().expect("tempdir");

    cmd()
        .arg("generate")
        .arg(temp.path())
        .args(["--color", "purple"])
        .assert()
        .failure()
        .stderr(contains("invalid color selector").and(contains("hint:")));

    assert!(!temp.path().join("control.dat").exists());
    assert!(!temp.path().join("frame.dat").exists());
}

#[test]
fn generate_then_inspect_reports_ok() {
    let temp = TempDir::new().expect("tempdir");
    generate_into(temp.path());

    cmd()
        .arg("inspect")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(
            contains("Checksum: ")
                .and(contains("(OK)"))
                .and(contains("total frames: 4/4"))
                .and(contains("ERROR").not()),
        );
}

#[test]
fn generated_files_match_golden_fixture() {
    let temp = TempDir::new().expect("tempdir");
    generate_into(temp.path());

    let golden = golden_dir("blink_fixed");
    for name in ["control.dat", "frame.dat"] {
        let actual = std::fs::read(temp.path().join(name)).expect("read generated");
        let expected = std::fs::read(golden.join(name)).expect("read golden");
        assert_eq!(actual, expected, "{name} differs from golden fixture");
    }
}

#[test]
fn inspect_json_is_valid() {
    let assert = cmd()
        .arg("inspect")
        .arg(golden_dir("blink_fixed"))
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["frames"]["expected"], 4);
    assert_eq!(value["control"]["file"]["version"]["minor"], 2);
}

#[test]
fn pretty_requires_json() {
    cmd()
        .arg("inspect")
        .arg(golden_dir("blink_fixed"))
        .arg("--pretty")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn variable_fixture_needs_variable_schema() {
    cmd()
        .arg("inspect")
        .arg(golden_dir("ramp_variable"))
        .args(["--schema", "variable", "--summary"])
        .assert()
        .success()
        .stdout(contains("Frame2: start_time=2000"));
}

#[test]
fn strict_fails_on_corrupted_frame() {
    let temp = TempDir::new().expect("tempdir");
    generate_into(temp.path());

    let frame_path = temp.path().join("frame.dat");
    let mut bytes = std::fs::read(&frame_path).expect("read frame");
    bytes[2 + 4] ^= 0x01;
    std::fs::write(&frame_path, bytes).expect("write frame");

    cmd()
        .arg("inspect")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(contains("ERROR"));

    cmd()
        .arg("inspect")
        .arg(temp.path())
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("pattern integrity check failed"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");

    cmd()
        .arg("inspect")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn same_control_and_frame_path_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("both.dat");

    cmd()
        .arg("generate")
        .arg("--control")
        .arg(&path)
        .arg("--frame")
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("must differ"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");

    cmd()
        .arg("generate")
        .arg(temp.path())
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicates::str::contains("OK:").not());
}

#[test]
fn config_file_is_merged_with_flags() {
    let temp = TempDir::new().expect("tempdir");
    let out = temp.path().join("out");

    cmd()
        .arg("generate")
        .arg(&out)
        .arg("--config")
        .arg(golden_dir("blink_fixed").join("config.json"))
        .args(["--frames", "2"])
        .assert()
        .success()
        .stderr(contains("OK: 2 frames"));

    cmd()
        .arg("inspect")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success()
        .stdout(contains("total frames: 2/2"));
}

fn write_custom_fixed_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("pattern.json");
    let config = serde_json::json!({
        "schema": {"kind": "fixed", "of_channels": 2, "strips": 1},
        "channels": {"of_enabled": [true, true], "strip_led_counts": [3]},
        "color": "b",
        "frame_count": 3
    });
    std::fs::write(&path, config.to_string()).expect("write config");
    path
}

#[test]
fn custom_fixed_geometry_round_trips() {
    let temp = TempDir::new().expect("tempdir");
    let config = write_custom_fixed_config(temp.path());
    let out = temp.path().join("out");

    cmd()
        .arg("generate")
        .arg(&out)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    cmd()
        .arg("inspect")
        .arg(&out)
        .arg("--config")
        .arg(&config)
        .arg("--strict")
        .assert()
        .success()
        .stdout(
            contains("Schema: fixed (2 OF slots, 1 strip slots)")
                .and(contains("total frames: 3/3")),
        );

    cmd()
        .arg("inspect")
        .arg(&out)
        .args(["--of-channels", "2", "--strip-slots", "1", "--strict"])
        .assert()
        .success()
        .stdout(contains("total frames: 3/3"));

    cmd()
        .arg("inspect")
        .arg(&out)
        .assert()
        .failure()
        .stderr(contains("truncated input").and(contains("--of-channels")));
}

#[test]
fn geometry_flags_generate_readable_tables() {
    let temp = TempDir::new().expect("tempdir");

    cmd()
        .arg("generate")
        .arg(temp.path())
        .args(["--of-channels", "4", "--strip-slots", "2"])
        .args(["--of-count", "3", "--strips", "1,2", "--frames", "2"])
        .assert()
        .success();

    cmd()
        .arg("inspect")
        .arg(temp.path())
        .args(["--of-channels", "4", "--strip-slots", "2", "--summary", "--strict"])
        .assert()
        .success()
        .stdout(contains("Frame1: start_time=100"));
}
