//! Tests for `coffer migrate`.

use crate::support::*;

#[test]
fn test_migrate_between_identifiers() {
    let t = Test::with_identifier("old");
    assert_success(&t.set("a", "1"));
    assert_success(&t.set("b", "2"));

    t.write_config("[store]\nidentifier = \"new\"\n");
    let output = t.run(&["migrate", "--from", "old", "--from-device-local", "--remove"]);
    assert_success(&output);
    assert_stdout_contains(&output, "migrated 2 items from old");

    assert_eq!(t.list_json()["keys"], serde_json::json!(["a", "b"]));

    t.write_config("[store]\nidentifier = \"old\"\n");
    assert_eq!(t.list_json()["count"], 0);
}

#[test]
fn test_migrate_conflict_leaves_destination() {
    let t = Test::with_identifier("old");
    assert_success(&t.set("a", "new"));

    t.write_config("[store]\nidentifier = \"new\"\n");
    assert_success(&t.set("a", "original"));

    let output = t.run(&["migrate", "--from", "old", "--from-device-local"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists in the destination");
    assert_eq!(stdout(&t.get("a")).trim_end(), "original");
}

#[test]
fn test_migrate_from_empty_source() {
    let t = Test::with_identifier("new");

    let output = t.run(&["migrate", "--from", "nothing-here"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no items to migrate found");
}

#[test]
fn test_migrate_from_other_tier() {
    let t = Test::new();
    t.write_config("[store]\nidentifier = \"app\"\naccessibility = \"always\"\n");
    assert_success(&t.set("token", "v"));

    t.write_config("[store]\nidentifier = \"app\"\n");
    let output = t.run(&[
        "migrate",
        "--from",
        "app",
        "--from-accessibility",
        "always",
        "--from-device-local",
        "--remove",
    ]);
    assert_success(&output);
    assert_eq!(stdout(&t.get("token")).trim_end(), "v");
}
