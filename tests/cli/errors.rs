//! Tests for error handling and CLI flags.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_help() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.run(&["unknown-command"]));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("coffer"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::new();

    let output = t.run(&["--verbose", "set", "token", "v"]);
    assert_success(&output);
    assert_stderr_contains(&output, "setting item");
}

#[test]
fn test_empty_value_rejected() {
    let t = Test::new();

    t.cmd()
        .args(["set", "token", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_invalid_config_reports_hint() {
    let t = Test::new();
    t.write_config("[store]\nidentifier = \"app\"\nsyncable = true\n");

    let output = t.run(&["check"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "syncable items cannot be device-local");
    assert_stderr_contains(&output, "coffer check");
}

#[test]
fn test_malformed_config_fails() {
    let t = Test::new();
    std::fs::write(t.config_path(), "[store\n").unwrap();

    let output = t.run(&["list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_explicit_config_flag_wins() {
    let t = Test::new();
    let other = t.dir.path().join("other.toml");
    std::fs::write(
        &other,
        format!(
            "[store]\nidentifier = \"flagged\"\n[vault]\npath = \"{}\"\n",
            t.dir.path().join("other.json").display().to_string().replace('\\', "\\\\")
        ),
    )
    .unwrap();

    let output = t.run(&["--config", other.to_str().unwrap(), "check"]);
    assert_success(&output);
    assert_stdout_contains(&output, "flagged");
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_coffer").or(predicate::str::contains("complete")));
}

#[test]
fn test_completions_without_config() {
    let t = Test::new();
    std::fs::write(t.config_path(), "not toml at all [").unwrap();

    assert_success(&t.run(&["completions", "zsh"]));
}
