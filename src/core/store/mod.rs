//! Key/value stores.
//!
//! A [`SecureStore`] reads and writes the items of one [`StoreIdentity`]
//! through a [`Vault`]. Every call re-queries the vault; nothing is cached
//! between calls.
//!
//! Capabilities differ by tier and are expressed as traits:
//! - [`Enumerable`]: listing keys, refused by user-presence tiers
//! - [`UserPresenceGated`]: prompted reads, implemented by [`AuthGatedStore`]

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::constants::{self, attr};
use crate::core::identity::StoreIdentity;
use crate::core::migration::{MigrationEngine, MigrationReport};
use crate::core::policy::Accessibility;
use crate::core::query::{AttrValue, Query, QueryBuilder};
use crate::core::validation::{validate_key, validate_value};
use crate::core::vault::{Vault, VaultError};
use crate::error::{MigrationError, Result, StoreError, ValidationError};

mod gated;

pub use gated::{AuthGatedStore, UserPresenceGated};

/// Stores whose keys can be listed.
pub trait Enumerable {
    /// Every key in the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unsupported` for tiers that forbid enumeration,
    /// which is distinct from an empty set.
    fn enumerate_keys(&self) -> Result<BTreeSet<String>>;
}

/// Key/value store for one identity.
#[derive(Clone)]
pub struct SecureStore {
    identity: StoreIdentity,
    vault: Arc<dyn Vault>,
    base_query: Query,
}

impl std::fmt::Debug for SecureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStore")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl SecureStore {
    pub fn new(identity: StoreIdentity, vault: Arc<dyn Vault>) -> Self {
        let base_query = QueryBuilder::build(&identity, None);
        Self {
            identity,
            vault,
            base_query,
        }
    }

    pub fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    /// Canonical query for every item in this store.
    pub fn query(&self) -> &Query {
        &self.base_query
    }

    pub(crate) fn vault(&self) -> &dyn Vault {
        self.vault.as_ref()
    }

    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// `ValidationError::MissingPrompt` on user-presence tiers (use
    /// [`AuthGatedStore`]); vault failures otherwise.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.reject_user_presence()?;
        self.read(key, None)
    }

    /// Read a UTF-8 value.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus `ValidationError::InvalidArgument` when
    /// the stored bytes are not UTF-8.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get(key)?.map(|bytes| decode_utf8(key, bytes)).transpose()
    }

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty key or value or on user-presence tiers;
    /// vault failures otherwise.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.reject_user_presence()?;
        self.write(key, value, None)
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value.as_bytes())
    }

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Vault failures other than "not found".
    pub fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        debug!(identifier = %self.identity.identifier(), key = %key, "removing item");

        match self.vault.delete(&self.base_query.clone().for_key(key)) {
            Ok(()) | Err(VaultError::ItemNotFound) => Ok(()),
            Err(e) => Err(StoreError::vault("delete", e).into()),
        }
    }

    /// Whether `key` is present. Never prompts the user.
    ///
    /// # Errors
    ///
    /// Vault failures other than "not found".
    pub fn contains(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let gated = self.identity.policy().requires_user_presence();

        let mut query = self.base_query.clone().for_key(key);
        if gated {
            query.set(attr::AUTH_UI, constants::AUTH_UI_FAIL);
        }

        match self.vault.query(&query) {
            Ok(_) => Ok(true),
            Err(VaultError::ItemNotFound) => Ok(false),
            // The vault refused only because it would have had to prompt.
            Err(VaultError::InteractionNotAllowed) if gated => Ok(true),
            Err(e) => Err(StoreError::vault("query", e).into()),
        }
    }

    /// Remove every item in the store. An empty store succeeds.
    ///
    /// # Errors
    ///
    /// Vault failures other than "not found".
    pub fn remove_all(&self) -> Result<()> {
        debug!(identifier = %self.identity.identifier(), "removing all items");

        match self.vault.delete(&self.base_query) {
            Ok(()) | Err(VaultError::ItemNotFound) => Ok(()),
            Err(e) => Err(StoreError::vault("delete", e).into()),
        }
    }

    /// Probe whether the store can be written and read right now.
    ///
    /// Writes, reads back and removes a sentinel item, and reports `false`
    /// when any step fails, cleanup included. User-presence tiers probe the
    /// same tier without the access control so the user is never prompted.
    pub fn can_access(&self) -> bool {
        let policy = self.identity.policy();
        if !self.vault.supports(policy) {
            debug!(identifier = %self.identity.identifier(), "vault does not support tier");
            return false;
        }

        if policy.requires_user_presence() {
            let probe = self.identity.with_policy(policy.without_user_presence());
            return SecureStore::new(probe, Arc::clone(&self.vault)).can_access();
        }

        // The canary is only written once deletes are known to work, so a
        // failed probe never leaves it behind.
        if let Err(e) = self.remove(constants::CANARY_KEY) {
            debug!(identifier = %self.identity.identifier(), error = %e, "vault refused canary delete");
            return false;
        }

        let round_trip = self
            .write(constants::CANARY_KEY, constants::CANARY_VALUE, None)
            .and_then(|()| self.read(constants::CANARY_KEY, None));
        let mut accessible = matches!(round_trip, Ok(Some(ref v)) if v.as_slice() == constants::CANARY_VALUE);

        if let Err(e) = self.remove(constants::CANARY_KEY) {
            warn!(identifier = %self.identity.identifier(), error = %e, "failed to remove canary");
            accessible = false;
        }

        debug!(identifier = %self.identity.identifier(), accessible, "access probe");
        accessible
    }

    /// Move every item matching `query` into this store.
    ///
    /// # Errors
    ///
    /// See [`MigrationEngine::migrate_query`].
    pub fn migrate_from_query(
        &self,
        query: &Query,
        remove_on_completion: bool,
    ) -> std::result::Result<MigrationReport, MigrationError> {
        MigrationEngine::new(self).migrate_query(query, remove_on_completion)
    }

    /// Move every item of `source` into this store.
    ///
    /// # Errors
    ///
    /// See [`MigrationEngine::migrate_store`].
    pub fn migrate_from_store(
        &self,
        source: &SecureStore,
        remove_on_completion: bool,
    ) -> std::result::Result<MigrationReport, MigrationError> {
        MigrationEngine::new(self).migrate_store(source, remove_on_completion)
    }

    /// Move items written under the always-accessible tier of this store's
    /// identifier and locality into this store.
    ///
    /// # Errors
    ///
    /// `MigrationError::InvalidQuery` for user-presence stores, which have no
    /// always-accessible counterpart; otherwise as
    /// [`MigrationEngine::migrate_query`].
    pub fn migrate_from_always_accessible(
        &self,
        remove_on_completion: bool,
    ) -> std::result::Result<MigrationReport, MigrationError> {
        if self.identity.policy().requires_user_presence() {
            return Err(MigrationError::InvalidQuery(
                "user-presence stores have no always-accessible counterpart".to_string(),
            ));
        }
        let legacy = self.identity.retiered(Accessibility::AlwaysAccessible);
        let query = QueryBuilder::build(&legacy, None);
        self.migrate_from_query(&query, remove_on_completion)
    }

    fn reject_user_presence(&self) -> Result<()> {
        if self.identity.policy().requires_user_presence() {
            return Err(ValidationError::MissingPrompt.into());
        }
        Ok(())
    }

    fn ensure_supported(&self) -> Result<()> {
        if !self.vault.supports(self.identity.policy()) {
            return Err(StoreError::Unsupported("access tier is not available on this device").into());
        }
        Ok(())
    }

    /// Read without the user-presence guard. `prompt` is passed to the vault
    /// as the operation prompt.
    pub(crate) fn read(&self, key: &str, prompt: Option<&str>) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        self.ensure_supported()?;
        debug!(identifier = %self.identity.identifier(), key = %key, "reading item");

        let mut query = self.base_query.clone().for_key(key).single_with_data();
        if let Some(prompt) = prompt {
            query.set(attr::OPERATION_PROMPT, prompt);
        }

        match self.vault.query(&query) {
            Ok(items) => Ok(items
                .into_iter()
                .next()
                .and_then(|mut item| item.remove(attr::VALUE_DATA))
                .and_then(|value| match value {
                    AttrValue::Data(data) => Some(data),
                    _ => None,
                })),
            Err(VaultError::ItemNotFound) => Ok(None),
            Err(e) => Err(StoreError::vault("query", e).into()),
        }
    }

    /// Write without the user-presence guard.
    ///
    /// Existing items are updated in place; user-presence tiers delete and
    /// re-insert instead, since updating an access-controlled item would
    /// prompt the user.
    pub(crate) fn write(&self, key: &str, value: &[u8], prompt: Option<&str>) -> Result<()> {
        validate_key(key)?;
        validate_value(key, value)?;
        self.ensure_supported()?;
        debug!(identifier = %self.identity.identifier(), key = %key, "writing item");

        let item_query = self.base_query.clone().for_key(key);

        if self.identity.policy().requires_user_presence() {
            match self.vault.delete(&item_query) {
                Ok(()) | Err(VaultError::ItemNotFound) => {}
                Err(e) => return Err(StoreError::vault("delete", e).into()),
            }
            return self.insert(item_query, value, prompt);
        }

        match self.vault.query(&item_query) {
            Ok(_) => self.update(&item_query, value),
            Err(VaultError::ItemNotFound) => match self.insert(item_query.clone(), value, prompt) {
                // Inserted concurrently by someone else; overwrite it.
                Err(crate::error::Error::Store(StoreError::Vault {
                    source: VaultError::DuplicateItem,
                    ..
                })) => self.update(&item_query, value),
                other => other,
            },
            Err(e) => Err(StoreError::vault("query", e).into()),
        }
    }

    fn insert(&self, item_query: Query, value: &[u8], prompt: Option<&str>) -> Result<()> {
        let mut attributes = item_query.with(attr::VALUE_DATA, value.to_vec());
        if let Some(prompt) = prompt {
            attributes.set(attr::OPERATION_PROMPT, prompt);
        }
        self.vault
            .insert(attributes.attributes())
            .map_err(|e| StoreError::vault("insert", e).into())
    }

    fn update(&self, item_query: &Query, value: &[u8]) -> Result<()> {
        let changes = Query::new()
            .with(attr::VALUE_DATA, value.to_vec())
            .into_attributes();
        self.vault
            .update(item_query, &changes)
            .map_err(|e| StoreError::vault("update", e).into())
    }
}

impl Enumerable for SecureStore {
    fn enumerate_keys(&self) -> Result<BTreeSet<String>> {
        if self.identity.policy().requires_user_presence() {
            return Err(StoreError::Unsupported("user-presence tiers cannot enumerate keys").into());
        }

        match self.vault.query(&self.base_query.clone().all_attributes()) {
            Ok(items) => Ok(items
                .iter()
                .filter_map(|item| item.get(attr::ACCOUNT).and_then(AttrValue::as_text))
                .filter(|key| *key != constants::CANARY_KEY)
                .map(str::to_string)
                .collect()),
            Err(VaultError::ItemNotFound) => Ok(BTreeSet::new()),
            Err(e) => Err(StoreError::vault("query", e).into()),
        }
    }
}

pub(crate) fn decode_utf8(key: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| {
        ValidationError::InvalidArgument(format!("value for '{}' is not valid UTF-8", key)).into()
    })
}
