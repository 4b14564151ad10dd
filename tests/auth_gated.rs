//! User-presence stores: prompting, the prompt latch, and cancellation.

mod support;

use std::sync::Arc;
use std::thread;

use coffer::{AccessControl, AccessPolicy, AuthOutcome, ErrorKind, UserPresenceGated};
use support::*;

#[test]
fn test_latch_forces_exactly_one_prompt() {
    let vault = vault();
    let (store, auth) = gated(&vault, single_prompt());
    store.set("token", b"v", "Save token").unwrap();

    store.get("token", "Read token").unwrap();
    assert_eq!(auth.calls(), 1);

    store.require_prompt_on_next_access();
    assert!(store.is_prompt_forced());

    store.get("token", "Read token").unwrap();
    assert_eq!(auth.calls(), 2);
    assert!(!store.is_prompt_forced());

    store.get("token", "Read token").unwrap();
    assert_eq!(auth.calls(), 2);
}

#[test]
fn test_single_prompt_first_read_prompts() {
    let vault = vault();
    let (store, auth) = gated(&vault, single_prompt());
    store.set("token", b"v", "Save").unwrap();

    assert_eq!(store.get("token", "Read").unwrap().as_deref(), Some(&b"v"[..]));
    assert_eq!(auth.prompts(), vec!["Read".to_string()]);
}

#[test]
fn test_every_access_prompts_each_time() {
    let vault = vault();
    let (store, auth) = gated(&vault, every_access());
    store.set("token", b"v", "Save").unwrap();

    for _ in 0..3 {
        store.get("token", "Read").unwrap();
    }
    assert_eq!(auth.calls(), 3);

    // The latch is honoured but adds no extra prompt.
    store.require_prompt_on_next_access();
    store.get("token", "Read").unwrap();
    assert_eq!(auth.calls(), 4);
    assert!(!store.is_prompt_forced());
}

#[test]
fn test_writes_leave_latch_armed() {
    let vault = vault();
    let (store, auth) = gated(&vault, single_prompt());

    store.require_prompt_on_next_access();
    store.set("a", b"1", "Save").unwrap();
    store.set("a", b"2", "Save").unwrap();
    assert!(store.is_prompt_forced());
    assert_eq!(auth.calls(), 0);

    assert_eq!(store.get("a", "Read").unwrap().as_deref(), Some(&b"2"[..]));
    assert_eq!(auth.calls(), 1);
}

#[test]
fn test_cancel_is_distinguished() {
    let vault = vault();
    let (store, auth) = gated_with(
        &vault,
        single_prompt(),
        ScriptedAuthenticator::with_outcomes([AuthOutcome::Cancelled]),
    );
    store.set("token", b"v", "Save").unwrap();

    let err = store.get("token", "Read").unwrap_err();
    assert!(err.is_user_cancelled());
    assert_eq!(err.kind(), ErrorKind::UserCancelled);
    assert!(err.kind().is_retryable());

    // A cancelled prompt establishes no session.
    store.get("token", "Read").unwrap();
    assert_eq!(auth.calls(), 2);
}

#[test]
fn test_cancel_consumes_latch() {
    let vault = vault();
    let (store, auth) = gated_with(
        &vault,
        single_prompt(),
        ScriptedAuthenticator::with_outcomes([AuthOutcome::Authenticated, AuthOutcome::Cancelled]),
    );
    store.set("token", b"v", "Save").unwrap();
    store.get("token", "Read").unwrap();

    store.require_prompt_on_next_access();
    assert!(store.get("token", "Read").is_err());
    assert!(!store.is_prompt_forced());
    assert_eq!(auth.calls(), 2);
}

#[test]
fn test_fallback_and_failure_outcomes() {
    let vault = vault();
    let (store, _) = gated_with(
        &vault,
        every_access(),
        ScriptedAuthenticator::with_outcomes([
            AuthOutcome::Fallback,
            AuthOutcome::Failed("timed out".to_string()),
        ]),
    );
    store.set("token", b"v", "Save").unwrap();

    assert_eq!(store.get("token", "Read").unwrap_err().kind(), ErrorKind::UserFallback);
    assert_eq!(
        store.get("token", "Read").unwrap_err().kind(),
        ErrorKind::AuthenticationFailed
    );
}

#[test]
fn test_contains_never_prompts() {
    let vault = vault();
    let (store, auth) = gated(&vault, every_access());

    assert!(!store.contains("token").unwrap());
    store.set("token", b"v", "Save").unwrap();
    assert!(store.contains("token").unwrap());
    store.remove("token").unwrap();
    assert!(!store.contains("token").unwrap());
    assert_eq!(auth.calls(), 0);
}

#[test]
fn test_absent_key_after_authentication() {
    let vault = vault();
    let (store, auth) = gated(&vault, every_access());

    assert_eq!(store.get("missing", "Read").unwrap(), None);
    assert_eq!(auth.calls(), 1);
}

#[test]
fn test_access_control_flavours_are_isolated() {
    let vault = vault();
    let (presence, _) = gated(&vault, AccessPolicy::secure_enclave(AccessControl::UserPresence));
    let (biometric, _) = gated(&vault, AccessPolicy::secure_enclave(AccessControl::BiometricAny));

    presence.set("k", b"presence", "Save").unwrap();
    assert!(!biometric.contains("k").unwrap());
    assert_eq!(biometric.get("k", "Read").unwrap(), None);
}

#[test]
fn test_enclave_unavailable() {
    let vault = vault();
    vault.set_enclave_available(false);
    let (store, _) = gated(&vault, every_access());

    assert!(!store.can_access());
    assert_eq!(store.set("k", b"v", "Save").unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn test_can_access_does_not_prompt() {
    let vault = vault();
    let (store, auth) = gated(&vault, every_access());

    assert!(store.can_access());
    assert_eq!(auth.calls(), 0);
    assert!(vault.is_empty());
}

#[test]
fn test_concurrent_reads_after_arm_prompt_once() {
    let vault = vault();
    let (store, auth) = gated(&vault, single_prompt());
    store.set("token", b"v", "Save").unwrap();
    store.get("token", "Read").unwrap();

    store.require_prompt_on_next_access();
    let store = Arc::new(store);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get("token", "Read").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some(&b"v"[..]));
    }

    assert_eq!(auth.calls(), 2);
}
