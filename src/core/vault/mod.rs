//! Secure vault abstraction.
//!
//! A [`Vault`] is the attribute-addressed item store every coffer store sits
//! on: insert, query, update and delete by attribute dictionary. Coffer adds
//! the policy model and the migration algorithm on top; it never caches what
//! a vault returns.
//!
//! ## Adding a New Vault
//!
//! 1. Implement the `Vault` trait
//! 2. Add the implementation in a new file (e.g., `keyring.rs`)
//! 3. Re-export from this module
//!
//! The [`records`] helpers implement the matching rules over an in-memory
//! item list, so a backend that can load and save its items wholesale only
//! has to provide persistence.

use thiserror::Error;

use crate::core::policy::AccessPolicy;
use crate::core::query::Query;
use crate::core::types::Attributes;
use crate::error::ErrorKind;

mod file;
mod memory;
pub mod records;

pub use file::FileVault;
pub use memory::MemoryVault;

/// Status reported by a vault operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("item not found")]
    ItemNotFound,

    #[error("duplicate item")]
    DuplicateItem,

    #[error("interaction not allowed")]
    InteractionNotAllowed,

    #[error("user cancelled the operation")]
    UserCancelled,

    #[error("authentication failed")]
    AuthFailed,

    #[error("vault not available (device locked or no passcode set)")]
    NotAvailable,

    #[error("missing entitlement for the requested access group")]
    MissingEntitlement,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("vault backend error: {0}")]
    Backend(String),
}

impl VaultError {
    /// Flat kind of this status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InteractionNotAllowed | Self::NotAvailable => ErrorKind::NotAccessible,
            Self::UserCancelled => ErrorKind::UserCancelled,
            Self::AuthFailed => ErrorKind::AuthenticationFailed,
            Self::MissingEntitlement => ErrorKind::MissingEntitlement,
            Self::InvalidParameter(_) => ErrorKind::InvalidArgument,
            Self::ItemNotFound | Self::DuplicateItem | Self::Backend(_) => ErrorKind::VaultUnreadable,
        }
    }
}

pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Attribute-addressed secure item store.
///
/// Semantics every implementation follows:
/// - an item matches a query when it carries every non-control attribute of
///   the query with an equal value
/// - `query` returns `ItemNotFound` when nothing matches, honours
///   `match_limit` (`"one"` returns the first match) and strips
///   `value_data` unless `return_data` is true
/// - `insert` returns `DuplicateItem` when an item with the same class,
///   service, access group, account and sync flag exists
/// - `update` and `delete` return `ItemNotFound` when nothing matches
pub trait Vault: Send + Sync {
    /// Return attribute dictionaries of matching items.
    fn query(&self, query: &Query) -> VaultResult<Vec<Attributes>>;

    /// Add one item.
    fn insert(&self, attributes: &Attributes) -> VaultResult<()>;

    /// Apply `changes` to every item matching `matching`.
    fn update(&self, matching: &Query, changes: &Attributes) -> VaultResult<()>;

    /// Remove every item matching `query`.
    fn delete(&self, query: &Query) -> VaultResult<()>;

    /// Whether the vault can hold items under `policy` on this device
    /// (e.g. enclave-backed storage for user-presence tiers).
    fn supports(&self, policy: &AccessPolicy) -> bool;
}
