use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_commands_and_effect_options() {
    cargo_bin_cmd!("inkgen")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--operation_mode"))
        .stdout(predicate::str::contains("--api_provider"));
}

#[test]
fn test_models_help_shows_backend_options() {
    cargo_bin_cmd!("inkgen")
        .args(["models", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--api_url"))
        .stdout(predicate::str::contains("--local_model"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("inkgen")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_unknown_backend_is_rejected() {
    cargo_bin_cmd!("inkgen")
        .arg("--api_provider=cloud")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown API provider"));
}
