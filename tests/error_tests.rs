//! Error scenario integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn voice_memo(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("voice-memo").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("VOICE_MEMO_DEVICE");
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["config", "set", "unknown_key", "value"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Valid keys"));
}

#[test]
fn config_set_sample_rate_out_of_range() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["config", "set", "sample_rate", "1000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sample_rate"));
}

#[test]
fn config_set_invalid_duration() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["config", "set", "max_duration", "forever"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid duration format"));
}

#[test]
fn config_init_twice_fails() {
    let home = TempDir::new().unwrap();
    voice_memo(&home).args(["config", "init"]).assert().success();
    voice_memo(&home)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn invalid_max_duration_is_usage_error() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["--max-duration", "soon"])
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid max-duration"));
}

#[test]
fn out_of_range_sample_rate_is_usage_error() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["--sample-rate", "100"])
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid sample rate"));
}

#[test]
fn malformed_prefer_list_is_usage_error() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["--prefer", "wav,flac"])
        .write_stdin("quit\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid prefer list"));
}

#[test]
fn broken_config_file_falls_back_to_defaults() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("voice-memo");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "sample_rate = \"fast\"").unwrap();

    voice_memo(&home).write_stdin("quit\n").assert().success();
}

#[test]
fn invalid_sample_rate_type_is_clap_error() {
    let home = TempDir::new().unwrap();
    voice_memo(&home)
        .args(["--sample-rate", "fast"])
        .assert()
        .code(2);
}
