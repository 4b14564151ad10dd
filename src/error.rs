//! Error types.
//!
//! `Error` is the crate-wide error. Each concern has its own enum so callers
//! can match narrowly, and every error flattens to an [`ErrorKind`] for
//! retry decisions.

use std::fmt;

use thiserror::Error;

use crate::core::vault::VaultError;

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of store operations against the vault.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("vault {op} failed: {source}")]
    Vault {
        op: &'static str,
        #[source]
        source: VaultError,
    },

    #[error("no item stored under '{0}'")]
    NotFound(String),

    #[error("operation not supported for this access tier: {0}")]
    Unsupported(&'static str),

    #[error("user cancelled authentication")]
    UserCancelled,

    #[error("user chose the fallback authentication option")]
    UserFallback,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

impl StoreError {
    /// Wrap a vault status with the name of the operation that produced it.
    pub fn vault(op: &'static str, source: VaultError) -> Self {
        Self::Vault { op, source }
    }
}

/// Migration failures.
///
/// Every variant except `RemovalFailed` guarantees the destination is
/// unchanged.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("invalid migration query: {0}")]
    InvalidQuery(String),

    #[error("no items to migrate found")]
    NoItemsToMigrateFound,

    #[error("could not read vault: {0}")]
    VaultUnreadable(String),

    #[error("a key in the query result is missing or unreadable")]
    KeyInQueryResultInvalid,

    #[error("data for key '{0}' in the query result is missing or unreadable")]
    DataInQueryResultInvalid(String),

    #[error("key '{0}' appears more than once in the query result")]
    DuplicateKeyInQueryResult(String),

    #[error("key '{0}' already exists in the destination")]
    KeyInQueryResultAlreadyExistsInDestination(String),

    #[error("destination is not accessible: {0}")]
    NotAccessible(String),

    #[error("could not write '{key}' to destination: {reason}")]
    CouldNotWriteToDestination { key: String, reason: String },

    #[error("migrated {} item(s) but removing them from the source failed: {reason}", migrated.len())]
    RemovalFailed {
        migrated: Vec<String>,
        reason: String,
    },
}

/// Input validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("key cannot be empty")]
    EmptyKey,

    #[error("value for '{0}' cannot be empty")]
    EmptyValue(String),

    #[error("identifier cannot be empty")]
    EmptyIdentifier,

    #[error("invalid shared group: {0}")]
    InvalidSharedGroup(String),

    #[error("invalid access policy: {0}")]
    InvalidPolicy(String),

    #[error("a prompt is required for user-presence access")]
    MissingPrompt,

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Configuration file failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unable to determine the {0} directory")]
    NoDirectory(&'static str),
}

/// Flat classification of every error this crate returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidQuery,
    NoItemsToMigrateFound,
    VaultUnreadable,
    KeyInQueryResultInvalid,
    DataInQueryResultInvalid,
    DuplicateKeyInQueryResult,
    KeyInQueryResultAlreadyExistsInDestination,
    CouldNotWriteToDestination,
    RemovalFailed,
    Unsupported,
    InvalidArgument,
    NotFound,
    UserCancelled,
    UserFallback,
    AuthenticationFailed,
    NotAccessible,
    MissingEntitlement,
    Config,
    Io,
}

impl ErrorKind {
    /// Whether repeating the same call can succeed without changing data.
    ///
    /// `NotAccessible` clears once the device is unlocked; duplicate or
    /// malformed source data needs cleanup first.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::VaultUnreadable
                | Self::CouldNotWriteToDestination
                | Self::UserCancelled
                | Self::UserFallback
                | Self::AuthenticationFailed
                | Self::NotAccessible
                | Self::Io
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Error {
    /// Flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::Migration(e) => e.kind(),
            Self::Validation(_) => ErrorKind::InvalidArgument,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    /// True when the error is the distinguished user-cancellation signal.
    pub fn is_user_cancelled(&self) -> bool {
        self.kind() == ErrorKind::UserCancelled
    }
}

impl StoreError {
    /// Flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Vault { source, .. } => source.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::UserCancelled => ErrorKind::UserCancelled,
            Self::UserFallback => ErrorKind::UserFallback,
            Self::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
        }
    }
}

impl MigrationError {
    /// Flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::NoItemsToMigrateFound => ErrorKind::NoItemsToMigrateFound,
            Self::VaultUnreadable(_) => ErrorKind::VaultUnreadable,
            Self::KeyInQueryResultInvalid => ErrorKind::KeyInQueryResultInvalid,
            Self::DataInQueryResultInvalid(_) => ErrorKind::DataInQueryResultInvalid,
            Self::DuplicateKeyInQueryResult(_) => ErrorKind::DuplicateKeyInQueryResult,
            Self::KeyInQueryResultAlreadyExistsInDestination(_) => {
                ErrorKind::KeyInQueryResultAlreadyExistsInDestination
            }
            Self::NotAccessible(_) => ErrorKind::NotAccessible,
            Self::CouldNotWriteToDestination { .. } => ErrorKind::CouldNotWriteToDestination,
            Self::RemovalFailed { .. } => ErrorKind::RemovalFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
