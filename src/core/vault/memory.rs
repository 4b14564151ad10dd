//! In-process vault.
//!
//! Keeps items in memory behind a mutex. Useful for embedding and for tests,
//! which can inject faults to exercise rollback and error paths.
//! Nothing here is protected beyond process memory.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::core::policy::AccessPolicy;
use crate::core::query::Query;
use crate::core::types::Attributes;

use super::{records, Vault, VaultError, VaultResult};

#[derive(Debug, Default)]
struct Faults {
    /// Inserts still allowed before every further insert fails.
    inserts_remaining: Option<usize>,
    /// Deletes still allowed before every further delete fails.
    deletes_remaining: Option<usize>,
    fail_queries: bool,
    locked: bool,
    enclave_unavailable: bool,
}

/// Vault holding items in process memory.
#[derive(Debug, Default)]
pub struct MemoryVault {
    items: Mutex<Vec<Attributes>>,
    faults: Mutex<Faults>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items across every namespace.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored item.
    pub fn snapshot(&self) -> Vec<Attributes> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }

    /// Allow `n` more inserts, then fail every insert after that.
    pub fn fail_inserts_after(&self, n: usize) {
        self.with_faults(|f| f.inserts_remaining = Some(n));
    }

    /// Make every delete fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.with_faults(|f| f.deletes_remaining = fail.then_some(0));
    }

    /// Allow `n` more deletes, then fail every delete after that.
    pub fn fail_deletes_after(&self, n: usize) {
        self.with_faults(|f| f.deletes_remaining = Some(n));
    }

    /// Make every query fail with a backend error.
    pub fn fail_queries(&self, fail: bool) {
        self.with_faults(|f| f.fail_queries = fail);
    }

    /// Simulate a locked device: every operation reports `NotAvailable`.
    pub fn lock(&self) {
        self.with_faults(|f| f.locked = true);
    }

    pub fn unlock(&self) {
        self.with_faults(|f| f.locked = false);
    }

    /// Whether enclave-backed storage is reported as available.
    pub fn set_enclave_available(&self, available: bool) {
        self.with_faults(|f| f.enclave_unavailable = !available);
    }

    /// Clear every injected fault.
    pub fn reset_faults(&self) {
        self.with_faults(|f| *f = Faults::default());
    }

    fn with_faults(&self, apply: impl FnOnce(&mut Faults)) {
        if let Ok(mut faults) = self.faults.lock() {
            apply(&mut faults);
        }
    }

    fn faults(&self) -> VaultResult<MutexGuard<'_, Faults>> {
        self.faults
            .lock()
            .map_err(|e| VaultError::Backend(format!("fault state poisoned: {}", e)))
    }

    fn items(&self) -> VaultResult<MutexGuard<'_, Vec<Attributes>>> {
        let locked = self.faults()?.locked;
        if locked {
            return Err(VaultError::NotAvailable);
        }
        self.items
            .lock()
            .map_err(|e| VaultError::Backend(format!("item store poisoned: {}", e)))
    }
}

impl Vault for MemoryVault {
    fn query(&self, query: &Query) -> VaultResult<Vec<Attributes>> {
        if self.faults()?.fail_queries {
            return Err(VaultError::Backend("injected query failure".to_string()));
        }
        let items = self.items()?;
        let result = records::select(&items, query);
        debug!(
            matched = result.as_ref().map(Vec::len).unwrap_or(0),
            "memory vault query"
        );
        result
    }

    fn insert(&self, attributes: &Attributes) -> VaultResult<()> {
        {
            let mut faults = self.faults()?;
            if let Some(remaining) = faults.inserts_remaining.as_mut() {
                if *remaining == 0 {
                    return Err(VaultError::Backend("injected insert failure".to_string()));
                }
                *remaining -= 1;
            }
        }
        let mut items = self.items()?;
        records::insert(&mut items, attributes)
    }

    fn update(&self, matching: &Query, changes: &Attributes) -> VaultResult<()> {
        let mut items = self.items()?;
        records::update(&mut items, matching, changes)
    }

    fn delete(&self, query: &Query) -> VaultResult<()> {
        {
            let mut faults = self.faults()?;
            if let Some(remaining) = faults.deletes_remaining.as_mut() {
                if *remaining == 0 {
                    return Err(VaultError::Backend("injected delete failure".to_string()));
                }
                *remaining -= 1;
            }
        }
        let mut items = self.items()?;
        records::delete(&mut items, query)
    }

    fn supports(&self, policy: &AccessPolicy) -> bool {
        if !policy.requires_user_presence() {
            return true;
        }
        self.faults().map(|f| !f.enclave_unavailable).unwrap_or(false)
    }
}
