#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn homedash() -> Command {
    let mut cmd = Command::cargo_bin("homedash").unwrap();
    // Keep host config and env overrides out of the test runs.
    cmd.env_remove("HOMEDASH_CONFIG")
        .env_remove("HOMEDASH_OUTPUT");
    cmd
}

#[test]
fn help_shows_about_line() {
    homedash()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aggregate media"));
}

#[test]
fn long_help_describes_polling() {
    homedash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Polls the services"));
}

#[test]
fn no_subcommand_prints_help_and_fails() {
    homedash()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn config_path_prints_a_path() {
    homedash()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("homedash"));
}

#[test]
fn config_path_honors_override() {
    homedash()
        .args(["-c", "/tmp/custom-homedash.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/custom-homedash.toml"));
}

#[test]
fn config_init_then_check_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    homedash()
        .args(["-c", path_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote starter config"));

    homedash()
        .args(["-c", path_arg, "config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no integrations are enabled"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "# existing\n").unwrap();

    homedash()
        .args(["-c", path.to_str().unwrap(), "config", "init"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn status_with_empty_config_exits_usage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    homedash()
        .args(["-c", path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No integrations configured"));
}

#[test]
fn show_with_unknown_source_exits_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[radarr]\nurl = \"http://127.0.0.1:9\"\napi_key = \"k\"\n",
    )
    .unwrap();

    homedash()
        .args(["-c", path.to_str().unwrap(), "show", "nope"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Unknown source 'nope'"));
}
