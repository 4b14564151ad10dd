//! Store fixtures over an in-memory vault.

use std::sync::Arc;

use coffer::{
    AccessControl, AccessPolicy, Accessibility, AuthGatedStore, MemoryVault, SecureStore, StoreIdentity,
};

use super::auth::ScriptedAuthenticator;

/// The everyday tier: when unlocked, this device only.
pub fn default_policy() -> AccessPolicy {
    AccessPolicy::device_local(Accessibility::WhenUnlocked)
}

pub fn vault() -> Arc<MemoryVault> {
    Arc::new(MemoryVault::new())
}

/// A store named `identifier` on `vault`.
pub fn store_in(vault: &Arc<MemoryVault>, identifier: &str, policy: AccessPolicy) -> SecureStore {
    let identity = StoreIdentity::named(identifier, policy).expect("valid identifier");
    SecureStore::new(identity, vault.clone())
}

/// A store on the default tier, pre-filled with `items`.
pub fn seeded(vault: &Arc<MemoryVault>, identifier: &str, items: &[(&str, &str)]) -> SecureStore {
    let store = store_in(vault, identifier, default_policy());
    for (key, value) in items {
        store.set_string(key, value).expect("failed to seed store");
    }
    store
}

/// A user-presence store with a scripted authenticator.
pub fn gated(
    vault: &Arc<MemoryVault>,
    policy: AccessPolicy,
) -> (AuthGatedStore, Arc<ScriptedAuthenticator>) {
    gated_with(vault, policy, ScriptedAuthenticator::new())
}

pub fn gated_with(
    vault: &Arc<MemoryVault>,
    policy: AccessPolicy,
    auth: ScriptedAuthenticator,
) -> (AuthGatedStore, Arc<ScriptedAuthenticator>) {
    let auth = Arc::new(auth);
    let identity = StoreIdentity::named("com.example.gated", policy).expect("valid identifier");
    let store = AuthGatedStore::new(identity, vault.clone(), auth.clone()).expect("user-presence policy");
    (store, auth)
}

pub fn single_prompt() -> AccessPolicy {
    AccessPolicy::single_prompt(AccessControl::UserPresence)
}

pub fn every_access() -> AccessPolicy {
    AccessPolicy::secure_enclave(AccessControl::UserPresence)
}
