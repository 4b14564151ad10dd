//! User-presence gated store.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::core::auth::{AuthOutcome, Authenticator, PromptLatch, Session};
use crate::core::identity::StoreIdentity;
use crate::core::migration::MigrationReport;
use crate::core::policy::PromptMode;
use crate::core::query::Query;
use crate::core::validation::{validate_key, validate_prompt};
use crate::core::vault::Vault;
use crate::error::{MigrationError, Result, StoreError, ValidationError};

use super::{decode_utf8, SecureStore};

/// Stores whose reads require the user to authenticate.
pub trait UserPresenceGated {
    /// Read `key`, showing `prompt` if the user must authenticate.
    ///
    /// # Errors
    ///
    /// `StoreError::UserCancelled` when the user dismisses the prompt,
    /// `ValidationError` for an empty key or prompt.
    fn get(&self, key: &str, prompt: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`. Writes never consult the prompt latch.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty key, value or prompt.
    fn set(&self, key: &str, value: &[u8], prompt: &str) -> Result<()>;

    /// Force the next read, and only the next read, to authenticate again.
    fn require_prompt_on_next_access(&self);
}

/// Store on a user-presence tier.
///
/// With [`PromptMode::EveryAccess`] every read authenticates. With
/// [`PromptMode::SinglePrompt`] one successful authentication is reused
/// until [`require_prompt_on_next_access`](UserPresenceGated::require_prompt_on_next_access)
/// is called.
pub struct AuthGatedStore {
    store: SecureStore,
    authenticator: Arc<dyn Authenticator>,
    mode: PromptMode,
    latch: PromptLatch,
    session: Session,
    /// Serializes prompts so concurrent single-prompt reads share one.
    prompting: Mutex<()>,
}

impl std::fmt::Debug for AuthGatedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGatedStore")
            .field("identity", self.store.identity())
            .field("mode", &self.mode)
            .field("latch_armed", &self.latch.is_armed())
            .finish_non_exhaustive()
    }
}

impl AuthGatedStore {
    /// # Errors
    ///
    /// `ValidationError::InvalidPolicy` if `identity` has no user-presence
    /// requirement.
    pub fn new(
        identity: StoreIdentity,
        vault: Arc<dyn Vault>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self> {
        let mode = identity
            .policy()
            .user_presence()
            .map(|up| up.mode)
            .ok_or_else(|| {
                ValidationError::InvalidPolicy(
                    "an auth-gated store needs a user-presence policy".to_string(),
                )
            })?;

        Ok(Self {
            store: SecureStore::new(identity, vault),
            authenticator,
            mode,
            latch: PromptLatch::new(),
            session: Session::default(),
            prompting: Mutex::new(()),
        })
    }

    pub fn identity(&self) -> &StoreIdentity {
        self.store.identity()
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Whether the next read is forced to authenticate.
    pub fn is_prompt_forced(&self) -> bool {
        self.latch.is_armed()
    }

    /// The underlying store, for operations that never prompt.
    pub fn store(&self) -> &SecureStore {
        &self.store
    }

    pub fn get_string(&self, key: &str, prompt: &str) -> Result<Option<String>> {
        UserPresenceGated::get(self, key, prompt)?
            .map(|bytes| decode_utf8(key, bytes))
            .transpose()
    }

    pub fn set_string(&self, key: &str, value: &str, prompt: &str) -> Result<()> {
        UserPresenceGated::set(self, key, value.as_bytes(), prompt)
    }

    /// Whether `key` is present. Never prompts.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.store.contains(key)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    pub fn remove_all(&self) -> Result<()> {
        self.store.remove_all()
    }

    /// Probe access without prompting.
    pub fn can_access(&self) -> bool {
        self.store.can_access()
    }

    /// Listing keys would require a prompt per item, so it is refused.
    ///
    /// # Errors
    ///
    /// Always `StoreError::Unsupported`.
    pub fn enumerate_keys(&self) -> Result<BTreeSet<String>> {
        Err(StoreError::Unsupported("user-presence tiers cannot enumerate keys").into())
    }

    pub fn migrate_from_query(
        &self,
        query: &Query,
        remove_on_completion: bool,
    ) -> std::result::Result<MigrationReport, MigrationError> {
        self.store.migrate_from_query(query, remove_on_completion)
    }

    pub fn migrate_from_store(
        &self,
        source: &SecureStore,
        remove_on_completion: bool,
    ) -> std::result::Result<MigrationReport, MigrationError> {
        self.store.migrate_from_store(source, remove_on_completion)
    }

    fn authenticate(&self, prompt: &str, forced: bool) -> Result<()> {
        let _guard = self
            .prompting
            .lock()
            .map_err(|_| StoreError::AuthenticationFailed("prompt lock poisoned".to_string()))?;

        // Another reader may have authenticated while this one waited.
        let needed = forced || self.mode == PromptMode::EveryAccess || !self.session.is_valid();
        if !needed {
            return Ok(());
        }

        debug!(identifier = %self.identity().identifier(), forced, "authenticating");
        let outcome = self.authenticator.authenticate(prompt);
        if outcome != AuthOutcome::Authenticated {
            self.session.invalidate();
            warn!(identifier = %self.identity().identifier(), outcome = ?outcome, "authentication not granted");
            return outcome.into_result().map_err(Into::into);
        }

        if self.mode == PromptMode::SinglePrompt {
            self.session.establish();
        }
        Ok(())
    }
}

impl UserPresenceGated for AuthGatedStore {
    fn get(&self, key: &str, prompt: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let prompt = validate_prompt(Some(prompt))?;

        let forced = self.latch.consume();
        self.authenticate(prompt, forced)?;

        self.store.read(key, Some(prompt))
    }

    fn set(&self, key: &str, value: &[u8], prompt: &str) -> Result<()> {
        let prompt = validate_prompt(Some(prompt))?;
        self.store.write(key, value, Some(prompt))
    }

    fn require_prompt_on_next_access(&self) {
        info!(identifier = %self.identity().identifier(), "next read will prompt");
        self.latch.arm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::{AccessControl, AccessPolicy, Accessibility};
    use crate::core::vault::MemoryVault;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Authenticator for Counting {
        fn authenticate(&self, _prompt: &str) -> AuthOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            AuthOutcome::Authenticated
        }
    }

    fn gated(policy: AccessPolicy) -> (AuthGatedStore, Arc<Counting>) {
        let auth = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let identity = StoreIdentity::named("unit", policy).unwrap();
        let store = AuthGatedStore::new(identity, Arc::new(MemoryVault::new()), auth.clone()).unwrap();
        (store, auth)
    }

    #[test]
    fn test_rejects_policy_without_user_presence() {
        let identity =
            StoreIdentity::named("unit", AccessPolicy::device_local(Accessibility::WhenUnlocked)).unwrap();
        let err = AuthGatedStore::new(
            identity,
            Arc::new(MemoryVault::new()),
            Arc::new(Counting {
                calls: AtomicUsize::new(0),
            }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_every_access_prompts_each_read() {
        let (store, auth) = gated(AccessPolicy::secure_enclave(AccessControl::UserPresence));
        store.set("k", b"v", "save").unwrap();
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);

        store.get("k", "read").unwrap();
        store.get("k", "read").unwrap();
        assert_eq!(auth.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_single_prompt_reuses_session() {
        let (store, auth) = gated(AccessPolicy::single_prompt(AccessControl::UserPresence));
        store.set("k", b"v", "save").unwrap();

        store.get("k", "read").unwrap();
        store.get("k", "read").unwrap();
        assert_eq!(auth.calls.load(Ordering::SeqCst), 1);

        store.require_prompt_on_next_access();
        store.get("k", "read").unwrap();
        assert_eq!(auth.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let (store, _) = gated(AccessPolicy::secure_enclave(AccessControl::UserPresence));
        assert_eq!(store.get("k", "  ").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.set("k", b"v", "").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_enumeration_unsupported() {
        let (store, _) = gated(AccessPolicy::secure_enclave(AccessControl::BiometricAny));
        assert_eq!(store.enumerate_keys().unwrap_err().kind(), ErrorKind::Unsupported);
    }
}
