//! Tests for set, get, rm, list, contains and clear.

use crate::support::*;

#[test]
fn test_set_get_roundtrip() {
    let t = Test::new();

    let output = t.set("token", "s3cr3t");
    assert_success(&output);
    assert_stdout_contains(&output, "set token");

    let output = t.get("token");
    assert_success(&output);
    assert_eq!(stdout(&output).trim_end(), "s3cr3t");
}

#[test]
fn test_set_overwrites() {
    let t = Test::new();

    assert_success(&t.set("token", "one"));
    assert_success(&t.set("token", "two"));

    assert_eq!(stdout(&t.get("token")).trim_end(), "two");
    assert_eq!(t.list_json()["count"], 1);
}

#[test]
fn test_get_missing_key_fails() {
    let t = Test::new();

    let output = t.get("missing");
    assert_failure(&output);
    assert_stderr_contains(&output, "no item stored under 'missing'");
}

#[test]
fn test_rm_removes_and_is_idempotent() {
    let t = Test::new();
    assert_success(&t.set("token", "v"));

    assert_success(&t.rm("token"));
    assert_success(&t.rm("token"));
    assert_failure(&t.get("token"));
}

#[test]
fn test_list_json_sorted() {
    let t = Test::new();
    assert_success(&t.set("b", "2"));
    assert_success(&t.set("a", "1"));

    let json = t.list_json();
    assert_eq!(json["count"], 2);
    assert_eq!(json["keys"], serde_json::json!(["a", "b"]));
}

#[test]
fn test_list_empty() {
    let t = Test::new();

    let output = t.run(&["list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no items stored");
}

#[test]
fn test_contains() {
    let t = Test::new();
    assert_success(&t.set("token", "v"));

    assert_eq!(stdout(&t.contains("token")).trim(), "true");
    assert_eq!(stdout(&t.contains("other")).trim(), "false");
}

#[test]
fn test_clear_with_yes() {
    let t = Test::new();
    assert_success(&t.set("a", "1"));
    assert_success(&t.set("b", "2"));

    let output = t.run(&["clear", "--yes"]);
    assert_success(&output);
    assert_eq!(t.list_json()["count"], 0);
}

#[test]
fn test_stores_in_one_vault_are_isolated() {
    let t = Test::with_identifier("first");
    assert_success(&t.set("token", "one"));

    t.write_config("[store]\nidentifier = \"second\"\n");
    assert_failure(&t.get("token"));
    assert_eq!(t.list_json()["count"], 0);

    t.write_config("[store]\nidentifier = \"first\"\n");
    assert_eq!(stdout(&t.get("token")).trim_end(), "one");
}

#[test]
fn test_check_reports_store() {
    let t = Test::with_identifier("com.example.app");

    let output = t.run(&["check"]);
    assert_success(&output);
    assert_stdout_contains(&output, "com.example.app");
    assert_stdout_contains(&output, "when-unlocked-this-device-only");
    assert_stdout_contains(&output, "store is accessible");
}

#[test]
fn test_vault_file_written_with_config_path() {
    let t = Test::new();
    assert_success(&t.set("token", "v"));
    assert!(t.vault_path().exists());
}

#[test]
fn test_user_presence_store_refuses_list() {
    let t = Test::new();
    t.write_config(
        "[store]\nidentifier = \"app\"\naccessibility = \"when-passcode-set\"\naccess_control = \"user-presence\"\n",
    );

    let output = t.run(&["list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not supported");
    assert_stderr_contains(&output, "cannot list keys");
}

#[test]
fn test_user_presence_store_writes_without_prompting() {
    let t = Test::new();
    t.write_config(
        "[store]\nidentifier = \"app\"\naccessibility = \"when-passcode-set\"\naccess_control = \"user-presence\"\n",
    );

    assert_success(&t.set("token", "v"));
    assert_eq!(stdout(&t.contains("token")).trim(), "true");
}
