//! The store a CLI invocation works on.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::prompt::TerminalAuthenticator;
use crate::core::config::Config;
use crate::core::identity::StoreIdentity;
use crate::core::store::{AuthGatedStore, Enumerable, SecureStore, UserPresenceGated};
use crate::core::vault::{FileVault, Vault};
use crate::error::Result;

/// Either kind of store, chosen by the configured policy.
pub enum Target {
    Plain(SecureStore),
    Gated(AuthGatedStore),
}

impl Target {
    pub fn store(&self) -> &SecureStore {
        match self {
            Self::Plain(store) => store,
            Self::Gated(store) => store.store(),
        }
    }

    pub fn get(&self, key: &str, prompt: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Plain(store) => store.get(key),
            Self::Gated(store) => store.get(key, prompt),
        }
    }

    pub fn set(&self, key: &str, value: &[u8], prompt: &str) -> Result<()> {
        match self {
            Self::Plain(store) => store.set(key, value),
            Self::Gated(store) => store.set(key, value, prompt),
        }
    }

    pub fn enumerate_keys(&self) -> Result<BTreeSet<String>> {
        match self {
            Self::Plain(store) => store.enumerate_keys(),
            Self::Gated(store) => store.enumerate_keys(),
        }
    }
}

/// Loaded config plus the vault it points at.
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub vault: Arc<FileVault>,
}

impl Context {
    /// Load the config and open its vault file.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file is malformed or describes an
    /// invalid store.
    pub fn open(config: Option<&Path>) -> Result<Self> {
        let config_path = Config::resolve_path(config)?;
        let config = Config::load(&config_path)?;
        let vault_path = config.vault_path()?;
        debug!(config = %config_path.display(), vault = %vault_path.display(), "opening context");

        Ok(Self {
            config_path,
            config,
            vault: Arc::new(FileVault::new(vault_path)),
        })
    }

    pub fn identity(&self) -> Result<StoreIdentity> {
        self.config.identity()
    }

    /// The configured store.
    pub fn target(&self) -> Result<Target> {
        self.target_for(self.identity()?)
    }

    /// A store for `identity` over the same vault.
    pub fn target_for(&self, identity: StoreIdentity) -> Result<Target> {
        let vault: Arc<dyn Vault> = self.vault.clone();
        if identity.policy().requires_user_presence() {
            let gated = AuthGatedStore::new(identity, vault, Arc::new(TerminalAuthenticator))?;
            return Ok(Target::Gated(gated));
        }
        Ok(Target::Plain(SecureStore::new(identity, vault)))
    }
}
