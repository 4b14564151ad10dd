//! Configuration file management.
//!
//! Handles reading, writing, and validating `config.toml`, which names the
//! store the CLI operates on and where its vault file lives.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::identity::{Identifier, SharedGroup, StoreIdentity};
use crate::core::policy::{AccessControl, AccessPolicy, Accessibility, Locality, PromptMode, UserPresence};
use crate::error::{ConfigError, Error, Result};

/// CLI configuration stored in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which store to operate on
    #[serde(default)]
    pub store: StoreConfig,
    /// Where items are persisted
    #[serde(default)]
    pub vault: VaultConfig,
}

/// The `[store]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub identifier: String,
    pub accessibility: Accessibility,
    pub device_local: bool,
    pub syncable: bool,
    /// `prefix.group`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_group: Option<String>,
    /// Setting this makes the store user-presence gated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control: Option<AccessControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_mode: Option<PromptMode>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            identifier: constants::APP_DIR.to_string(),
            accessibility: Accessibility::WhenUnlocked,
            device_local: true,
            syncable: false,
            shared_group: None,
            access_control: None,
            prompt_mode: None,
        }
    }
}

/// The `[vault]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault file; defaults to `<data_dir>/coffer/vault.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Default config file location: `<config_dir>/coffer/config.toml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDirectory` if the platform has no config dir.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Resolve the config path: explicit path, then `COFFER_CONFIG`, then the
    /// default location.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        match std::env::var_os(constants::CONFIG_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// Load and validate the config.
    ///
    /// A missing file yields the default config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or a validation
    /// error if the store section describes an impossible policy.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            debug!("config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Vault file path, falling back to `<data_dir>/coffer/vault.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDirectory` if no path is configured and the
    /// platform has no data dir.
    pub fn vault_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.vault.path {
            return Ok(path.clone());
        }
        let dir = dirs::data_dir().ok_or(ConfigError::NoDirectory("data"))?;
        Ok(dir.join(constants::APP_DIR).join(constants::VAULT_FILE))
    }

    /// Policy described by the `[store]` section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for combinations the policy model
    /// rejects.
    pub fn policy(&self) -> Result<AccessPolicy> {
        let store = &self.store;
        let locality = if store.device_local {
            Locality::DeviceLocal
        } else {
            Locality::Migratable
        };
        let user_presence = store.access_control.map(|control| UserPresence {
            control,
            mode: store.prompt_mode.unwrap_or(PromptMode::EveryAccess),
        });

        AccessPolicy::new(store.accessibility, locality, store.syncable, user_presence)
            .map_err(|e| invalid("store", e))
    }

    /// Identity of the configured store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty identifier, a
    /// malformed shared group, or an invalid policy.
    pub fn identity(&self) -> Result<StoreIdentity> {
        let identifier =
            Identifier::new(self.store.identifier.as_str()).map_err(|e| invalid("store.identifier", e))?;
        let policy = self.policy()?;

        match &self.store.shared_group {
            Some(group) => {
                let group = SharedGroup::parse(group).map_err(|e| invalid("store.shared_group", e))?;
                Ok(StoreIdentity::shared(identifier, group, policy))
            }
            None => Ok(StoreIdentity::new(identifier, policy)),
        }
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - The identifier is non-empty
    /// - The shared group, if any, is `prefix.group`
    /// - The store section describes a valid access policy
    /// - `prompt_mode` is only set together with `access_control`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on validation failure.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if self.store.prompt_mode.is_some() && self.store.access_control.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "store.prompt_mode",
                reason: "requires access_control".to_string(),
            }
            .into());
        }

        self.identity().map(|_| ())
    }
}

fn invalid(field: &'static str, source: Error) -> Error {
    ConfigError::InvalidValue {
        field,
        reason: source.to_string(),
    }
    .into()
}
