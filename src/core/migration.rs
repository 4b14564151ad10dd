//! All-or-nothing migration into a store.
//!
//! A migration runs in four phases:
//!
//! 1. Validate the source query
//! 2. Read and project every matching item into key/value pairs
//! 3. Check for conflicts: duplicate keys in the source first, then keys
//!    already present in the destination
//! 4. Write every pair, removing the newly written keys again if any write
//!    fails
//!
//! Until phase 4 the destination is never touched. Removing migrated items
//! from the source is best effort and never undoes a committed migration.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::core::constants::{self, attr};
use crate::core::query::{AttrValue, Query};
use crate::core::store::SecureStore;
use crate::core::types::Attributes;
use crate::core::vault::{Vault, VaultError};
use crate::error::{ErrorKind, MigrationError};

/// Attributes that locate one source item for removal.
const REMOVAL_KEY: &[&str] = &[
    attr::CLASS,
    attr::SERVICE,
    attr::ACCESS_GROUP,
    attr::ACCOUNT,
    attr::SYNCHRONIZABLE,
];

/// One item on its way into the destination.
///
/// The value is wiped from memory when the pair is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct MigratableKeyValuePair<K> {
    key: K,
    value: Zeroizing<Vec<u8>>,
}

impl<K: std::fmt::Debug> std::fmt::Debug for MigratableKeyValuePair<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigratableKeyValuePair")
            .field("key", &self.key)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .finish()
    }
}

impl<K> MigratableKeyValuePair<K> {
    pub fn new(key: K, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            value: Zeroizing::new(value.into()),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replace the key, keeping the value.
    pub fn with_key<T>(self, key: T) -> MigratableKeyValuePair<T> {
        MigratableKeyValuePair {
            key,
            value: self.value,
        }
    }
}

/// Result of a successful migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys written to the destination, in write order.
    pub migrated: Vec<String>,
    /// Whether the source items were removed afterwards.
    pub removed_from_source: bool,
}

/// A source item, projected.
struct Staged {
    /// Locates the original item for removal.
    origin: Query,
    pair: MigratableKeyValuePair<String>,
}

/// Moves items from a source into one destination store.
pub struct MigrationEngine<'a> {
    destination: &'a SecureStore,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(destination: &'a SecureStore) -> Self {
        Self { destination }
    }

    /// Migrate every item matching `query` in the destination's vault.
    ///
    /// # Errors
    ///
    /// Any [`MigrationError`]. Every error except `RemovalFailed` leaves the
    /// destination exactly as it was.
    pub fn migrate_query(
        &self,
        query: &Query,
        remove_on_completion: bool,
    ) -> Result<MigrationReport, MigrationError> {
        self.run(self.destination.vault(), query, remove_on_completion, default_projection)
    }

    /// Migrate every item of `source`, which may live in another vault.
    ///
    /// # Errors
    ///
    /// As [`migrate_query`](Self::migrate_query).
    pub fn migrate_store(
        &self,
        source: &SecureStore,
        remove_on_completion: bool,
    ) -> Result<MigrationReport, MigrationError> {
        self.run(source.vault(), source.query(), remove_on_completion, default_projection)
    }

    /// Migrate with a caller-supplied projection.
    ///
    /// `transform` receives each item's raw key attribute and value. It
    /// returns `Ok(None)` to skip an item, or a pair to write.
    ///
    /// # Errors
    ///
    /// As [`migrate_query`](Self::migrate_query), plus whatever `transform`
    /// returns.
    pub fn migrate_with<F>(
        &self,
        query: &Query,
        remove_on_completion: bool,
        transform: F,
    ) -> Result<MigrationReport, MigrationError>
    where
        F: FnMut(
            MigratableKeyValuePair<AttrValue>,
        ) -> Result<Option<MigratableKeyValuePair<String>>, MigrationError>,
    {
        self.run(self.destination.vault(), query, remove_on_completion, transform)
    }

    fn run<F>(
        &self,
        source: &dyn Vault,
        query: &Query,
        remove_on_completion: bool,
        transform: F,
    ) -> Result<MigrationReport, MigrationError>
    where
        F: FnMut(
            MigratableKeyValuePair<AttrValue>,
        ) -> Result<Option<MigratableKeyValuePair<String>>, MigrationError>,
    {
        let destination = self.destination.identity();
        info!(destination = %destination, "starting migration");

        validate_query(query)?;
        let staged = stage(source, query, transform)?;
        self.check_conflicts(&staged)?;

        if !self.destination.can_access() {
            return Err(MigrationError::NotAccessible(format!(
                "cannot write to {}",
                destination.identifier()
            )));
        }

        let migrated = self.commit(&staged)?;
        info!(destination = %destination, items = migrated.len(), "migration committed");

        if remove_on_completion {
            remove_from_source(source, &staged, &migrated)?;
        }

        Ok(MigrationReport {
            migrated,
            removed_from_source: remove_on_completion,
        })
    }

    fn check_conflicts(&self, staged: &[Staged]) -> Result<(), MigrationError> {
        let mut seen = HashSet::with_capacity(staged.len());
        for item in staged {
            if !seen.insert(item.pair.key().as_str()) {
                return Err(MigrationError::DuplicateKeyInQueryResult(item.pair.key().clone()));
            }
        }

        for item in staged {
            let key = item.pair.key();
            match self.destination.contains(key) {
                Ok(false) => {}
                Ok(true) => {
                    return Err(MigrationError::KeyInQueryResultAlreadyExistsInDestination(key.clone()))
                }
                Err(e) if e.kind() == ErrorKind::NotAccessible => {
                    return Err(MigrationError::NotAccessible(e.to_string()))
                }
                Err(e) => return Err(MigrationError::VaultUnreadable(e.to_string())),
            }
        }
        Ok(())
    }

    fn commit(&self, staged: &[Staged]) -> Result<Vec<String>, MigrationError> {
        let mut written = Vec::with_capacity(staged.len());
        for item in staged {
            let key = item.pair.key();
            if let Err(e) = self.destination.write(key, item.pair.value(), None) {
                warn!(key = %key, error = %e, written = written.len(), "write failed, rolling back");
                self.rollback(&written);
                return Err(MigrationError::CouldNotWriteToDestination {
                    key: key.clone(),
                    reason: e.to_string(),
                });
            }
            written.push(key.clone());
        }
        Ok(written)
    }

    fn rollback(&self, written: &[String]) {
        for key in written.iter().rev() {
            if let Err(e) = self.destination.remove(key) {
                error!(key = %key, error = %e, "rollback failed to remove key");
            }
        }
    }
}

/// Reject queries that cannot enumerate generic-password items.
fn validate_query(query: &Query) -> Result<(), MigrationError> {
    fn invalid(reason: &str) -> Result<(), MigrationError> {
        Err(MigrationError::InvalidQuery(reason.to_string()))
    }
    let flag = |name: &str| query.get(name).and_then(AttrValue::as_bool);

    if query.is_empty() {
        return invalid("query is empty");
    }
    if query.get(attr::CLASS).and_then(AttrValue::as_text) != Some(constants::CLASS_GENERIC_PASSWORD) {
        return invalid("only generic password items can be migrated");
    }
    if query.get(attr::MATCH_LIMIT).and_then(AttrValue::as_text) == Some(constants::MATCH_LIMIT_ONE) {
        return invalid("match limit must not be one");
    }
    if flag(attr::RETURN_DATA) == Some(true) {
        return invalid("query must not request item data");
    }
    if flag(attr::RETURN_ATTRIBUTES) == Some(false) {
        return invalid("query must not suppress item attributes");
    }
    if flag(attr::RETURN_REF) == Some(true) {
        return invalid("query must not request item references");
    }
    if flag(attr::RETURN_PERSISTENT_REF) == Some(false) {
        return invalid("query must not suppress persistent references");
    }
    if query.contains(attr::ACCESS_CONTROL) {
        return invalid("access-controlled items cannot be migrated");
    }
    Ok(())
}

/// Read every item matching `query` and project it through `transform`.
fn stage<F>(source: &dyn Vault, query: &Query, mut transform: F) -> Result<Vec<Staged>, MigrationError>
where
    F: FnMut(MigratableKeyValuePair<AttrValue>) -> Result<Option<MigratableKeyValuePair<String>>, MigrationError>,
{
    let mut enumerate = query.clone().all_attributes();
    enumerate.set(attr::RETURN_DATA, true);
    enumerate.remove(attr::RETURN_REF);
    enumerate.remove(attr::RETURN_PERSISTENT_REF);

    let items = match source.query(&enumerate) {
        Ok(items) => items,
        Err(VaultError::ItemNotFound) => return Err(MigrationError::NoItemsToMigrateFound),
        Err(e) if e.kind() == ErrorKind::NotAccessible => {
            return Err(MigrationError::NotAccessible(e.to_string()))
        }
        Err(e) => return Err(MigrationError::VaultUnreadable(e.to_string())),
    };

    let scope = query.scope();
    let mut staged = Vec::with_capacity(items.len());
    for mut item in items {
        let key = item
            .get(attr::ACCOUNT)
            .cloned()
            .ok_or(MigrationError::KeyInQueryResultInvalid)?;
        if key.as_text() == Some(constants::CANARY_KEY) {
            continue;
        }

        let label = key.as_text().unwrap_or("<non-text key>").to_string();
        let value = match item.remove(attr::VALUE_DATA) {
            Some(AttrValue::Data(data)) if !data.is_empty() => Zeroizing::new(data),
            _ => return Err(MigrationError::DataInQueryResultInvalid(label)),
        };

        let Some(pair) = transform(MigratableKeyValuePair {
            key,
            value,
        })?
        else {
            debug!(key = %label, "item skipped by projection");
            continue;
        };

        if pair.key().is_empty() {
            return Err(MigrationError::KeyInQueryResultInvalid);
        }
        if pair.value().is_empty() {
            return Err(MigrationError::DataInQueryResultInvalid(pair.key().clone()));
        }

        staged.push(Staged {
            origin: origin_query(&scope, &item),
            pair,
        });
    }

    if staged.is_empty() {
        return Err(MigrationError::NoItemsToMigrateFound);
    }
    debug!(items = staged.len(), "items staged");
    Ok(staged)
}

/// Keep the key as is; it must be text.
fn default_projection(
    pair: MigratableKeyValuePair<AttrValue>,
) -> Result<Option<MigratableKeyValuePair<String>>, MigrationError> {
    match pair.key() {
        AttrValue::Text(key) => {
            let key = key.clone();
            Ok(Some(pair.with_key(key)))
        }
        _ => Err(MigrationError::KeyInQueryResultInvalid),
    }
}

fn origin_query(scope: &Query, item: &Attributes) -> Query {
    let mut origin = scope.clone();
    for name in REMOVAL_KEY {
        if let Some(value) = item.get(*name) {
            origin.set(name, value.clone());
        }
    }
    origin
}

fn remove_from_source(
    source: &dyn Vault,
    staged: &[Staged],
    migrated: &[String],
) -> Result<(), MigrationError> {
    let mut failures = Vec::new();
    for item in staged {
        match source.delete(&item.origin) {
            Ok(()) | Err(VaultError::ItemNotFound) => {}
            Err(e) => failures.push(format!("{}: {}", item.pair.key(), e)),
        }
    }

    if failures.is_empty() {
        info!(items = staged.len(), "removed migrated items from source");
        return Ok(());
    }

    error!(failed = failures.len(), "migration committed but source removal failed");
    Err(MigrationError::RemovalFailed {
        migrated: migrated.to_vec(),
        reason: failures.join("; "),
    })
}
