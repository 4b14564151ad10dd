//! Constants used throughout coffer.
//!
//! Centralizes attribute names and other magic strings shared by the query
//! builder, the vault implementations, and the migration engine.

/// Attribute names understood by every [`Vault`](crate::core::vault::Vault).
pub mod attr {
    /// Item class. Coffer only reads and writes generic passwords.
    pub const CLASS: &str = "class";
    /// Namespace string derived from identifier and policy.
    pub const SERVICE: &str = "service";
    /// Item key within a namespace.
    pub const ACCOUNT: &str = "account";
    /// Cross-application sharing scope.
    pub const ACCESS_GROUP: &str = "access_group";
    /// Accessibility tier attribute string.
    pub const ACCESSIBLE: &str = "accessible";
    /// Present and true for items that sync across devices.
    pub const SYNCHRONIZABLE: &str = "synchronizable";
    /// User-presence access control flavour.
    pub const ACCESS_CONTROL: &str = "access_control";
    /// Item payload.
    pub const VALUE_DATA: &str = "value_data";

    /// `"one"` or `"all"`.
    pub const MATCH_LIMIT: &str = "match_limit";
    pub const RETURN_DATA: &str = "return_data";
    pub const RETURN_ATTRIBUTES: &str = "return_attributes";
    pub const RETURN_REF: &str = "return_ref";
    pub const RETURN_PERSISTENT_REF: &str = "return_persistent_ref";
    /// Text shown by the platform if the operation must authenticate.
    pub const OPERATION_PROMPT: &str = "operation_prompt";
    /// `"fail"` asks the vault to report instead of prompting.
    pub const AUTH_UI: &str = "auth_ui";

    /// Attributes that steer a query rather than match item attributes.
    pub const CONTROL: &[&str] = &[
        MATCH_LIMIT,
        RETURN_DATA,
        RETURN_ATTRIBUTES,
        RETURN_REF,
        RETURN_PERSISTENT_REF,
        OPERATION_PROMPT,
        AUTH_UI,
    ];
}

/// Value of the `class` attribute for every coffer item.
pub const CLASS_GENERIC_PASSWORD: &str = "generic_password";

pub const MATCH_LIMIT_ONE: &str = "one";
pub const MATCH_LIMIT_ALL: &str = "all";
pub const AUTH_UI_FAIL: &str = "fail";

/// Prefix of every service attribute coffer generates.
pub const SERVICE_PREFIX: &str = "coffer";

/// Sentinel key written by `can_access`; never enumerated or migrated.
pub const CANARY_KEY: &str = "coffer.canary.key";

/// Sentinel value paired with [`CANARY_KEY`].
pub const CANARY_VALUE: &[u8] = b"coffer.canary.value";

/// Identifier of the credentials facade store.
pub const CREDENTIALS_IDENTIFIER: &str = "coffer.credentials";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "COFFER_CONFIG";

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "COFFER_LOG";

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "coffer";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Vault file name inside [`APP_DIR`].
pub const VAULT_FILE: &str = "vault.json";
