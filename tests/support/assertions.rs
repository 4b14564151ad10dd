//! Test assertion helpers.

use std::collections::BTreeSet;
use std::process::Output;

use coffer::{Enumerable, SecureStore};

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Assert that a command output failed.
pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "Expected command to fail but it succeeded"
    );
}

/// Get stdout as String.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as String.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert stdout contains a string.
pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout missing '{}', got: {}",
        expected,
        out
    );
}

/// Assert stderr contains a string.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

/// Keys of `store` as a sorted set.
pub fn keys(store: &SecureStore) -> BTreeSet<String> {
    store.enumerate_keys().expect("failed to enumerate keys")
}

/// Assert `store` holds exactly `expected` keys.
pub fn assert_keys(store: &SecureStore, expected: &[&str]) {
    let expected: BTreeSet<String> = expected.iter().map(|k| k.to_string()).collect();
    assert_eq!(keys(store), expected);
}

/// Assert `store` holds `value` under `key`.
pub fn assert_value(store: &SecureStore, key: &str, value: &[u8]) {
    assert_eq!(
        store.get(key).expect("failed to read").as_deref(),
        Some(value),
        "unexpected value for '{}'",
        key
    );
}
