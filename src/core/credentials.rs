//! Username/password convenience store.

use std::sync::Arc;

use tracing::info;

use crate::core::constants::CREDENTIALS_IDENTIFIER;
use crate::core::identity::StoreIdentity;
use crate::core::policy::{AccessPolicy, Accessibility};
use crate::core::store::SecureStore;
use crate::core::vault::Vault;
use crate::error::Result;

const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";

/// A single login kept in a device-local, when-unlocked store.
#[derive(Debug, Clone)]
pub struct Credentials {
    store: SecureStore,
}

impl Credentials {
    /// # Errors
    ///
    /// Never fails for the built-in identifier; kept fallible so callers
    /// share one error path with other store constructors.
    pub fn new(vault: Arc<dyn Vault>) -> Result<Self> {
        let identity = StoreIdentity::named(
            CREDENTIALS_IDENTIFIER,
            AccessPolicy::device_local(Accessibility::WhenUnlocked),
        )?;
        Ok(Self {
            store: SecureStore::new(identity, vault),
        })
    }

    pub fn store(&self) -> &SecureStore {
        &self.store
    }

    pub fn username(&self) -> Result<Option<String>> {
        self.store.get_string(USERNAME_KEY)
    }

    pub fn password(&self) -> Result<Option<String>> {
        self.store.get_string(PASSWORD_KEY)
    }

    pub fn set_username(&self, username: &str) -> Result<()> {
        self.store.set_string(USERNAME_KEY, username)
    }

    pub fn set_password(&self, password: &str) -> Result<()> {
        self.store.set_string(PASSWORD_KEY, password)
    }

    /// Store both halves of the login.
    pub fn save(&self, username: &str, password: &str) -> Result<()> {
        self.set_username(username)?;
        self.set_password(password)?;
        info!("credentials saved");
        Ok(())
    }

    /// Forget the stored login.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(USERNAME_KEY)?;
        self.store.remove(PASSWORD_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vault::MemoryVault;

    #[test]
    fn test_save_and_clear() {
        let creds = Credentials::new(Arc::new(MemoryVault::new())).unwrap();
        assert_eq!(creds.username().unwrap(), None);

        creds.save("alice", "hunter2").unwrap();
        assert_eq!(creds.username().unwrap().as_deref(), Some("alice"));
        assert_eq!(creds.password().unwrap().as_deref(), Some("hunter2"));

        creds.clear().unwrap();
        assert_eq!(creds.password().unwrap(), None);
    }

    #[test]
    fn test_isolated_from_other_stores() {
        let vault = Arc::new(MemoryVault::new());
        let creds = Credentials::new(vault.clone()).unwrap();
        creds.set_username("alice").unwrap();

        let other = SecureStore::new(
            StoreIdentity::named("other", AccessPolicy::device_local(Accessibility::WhenUnlocked)).unwrap(),
            vault,
        );
        assert_eq!(other.get("username").unwrap(), None);
    }
}
