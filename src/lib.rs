//! Coffer - identifier-scoped secure storage for small secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── items         # set/get/rm/list/contains/clear
//! │   ├── check         # access probe
//! │   ├── migrate       # move items between stores
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── policy        # Accessibility tiers and access policies
//!     ├── identity      # Identifier, shared group, store identity
//!     ├── query         # Attribute queries and the query builder
//!     ├── vault/        # Vault trait
//!     │   ├── memory    # In-process vault
//!     │   └── file      # JSON file vault
//!     ├── store/        # Stores
//!     │   ├── mod       # SecureStore, Enumerable
//!     │   └── gated     # AuthGatedStore, UserPresenceGated
//!     ├── auth          # Authenticator, prompt latch
//!     ├── migration     # All-or-nothing migration
//!     ├── credentials   # Username/password store
//!     └── config        # config.toml management
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use coffer::{AccessPolicy, Accessibility, Enumerable, MemoryVault, SecureStore, StoreIdentity};
//!
//! let vault = Arc::new(MemoryVault::new());
//! let identity = StoreIdentity::named(
//!     "com.example.app",
//!     AccessPolicy::device_local(Accessibility::WhenUnlocked),
//! )?;
//! let store = SecureStore::new(identity, vault);
//!
//! store.set_string("token", "s3cr3t")?;
//! assert_eq!(store.get_string("token")?.as_deref(), Some("s3cr3t"));
//! assert_eq!(store.enumerate_keys()?.len(), 1);
//! # Ok::<(), coffer::Error>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::auth::{AuthOutcome, Authenticator, PromptLatch};
pub use crate::core::credentials::Credentials;
pub use crate::core::identity::{Identifier, SharedGroup, StoreIdentity};
pub use crate::core::migration::{MigratableKeyValuePair, MigrationEngine, MigrationReport};
pub use crate::core::policy::{
    AccessControl, AccessPolicy, Accessibility, CloudAccessibility, Locality, PromptMode, UserPresence,
};
pub use crate::core::query::{AttrValue, Query, QueryBuilder};
pub use crate::core::store::{AuthGatedStore, Enumerable, SecureStore, UserPresenceGated};
pub use crate::core::vault::{FileVault, MemoryVault, Vault, VaultError};
pub use crate::error::{Error, ErrorKind, Result};
