//! Store identity.
//!
//! A [`StoreIdentity`] names one logical store: a namespace identifier, an
//! optional shared group, and the access policy its items are written with.
//! Two equal identities always address the same items.

use std::fmt;

use crate::core::policy::{AccessPolicy, Accessibility};
use crate::error::{Result, ValidationError};

/// A non-empty namespace string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyIdentifier` for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyIdentifier.into());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cross-application sharing scope, rendered as `prefix.group`.
///
/// The prefix is the team or app-group prefix the platform assigns; the
/// group is the name both applications are entitled to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedGroup {
    prefix: String,
    group: String,
}

impl SharedGroup {
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSharedGroup` if either part is empty.
    pub fn new(prefix: impl Into<String>, group: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let group = group.into();
        if prefix.is_empty() || group.is_empty() {
            return Err(ValidationError::InvalidSharedGroup(format!(
                "prefix and group must be non-empty (got '{}.{}')",
                prefix, group
            ))
            .into());
        }
        Ok(Self { prefix, group })
    }

    /// Parse `prefix.group`, splitting at the first dot.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidSharedGroup` if there is no dot or
    /// either side is empty.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once('.') {
            Some((prefix, group)) => Self::new(prefix, group),
            None => Err(ValidationError::InvalidSharedGroup(format!(
                "expected 'prefix.group', got '{}'",
                value
            ))
            .into()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn group(&self) -> &str {
        &self.group
    }
}

impl fmt::Display for SharedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.prefix, self.group)
    }
}

/// Identity of one logical store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreIdentity {
    identifier: Identifier,
    shared_group: Option<SharedGroup>,
    policy: AccessPolicy,
}

impl StoreIdentity {
    pub fn new(identifier: Identifier, policy: AccessPolicy) -> Self {
        Self {
            identifier,
            shared_group: None,
            policy,
        }
    }

    pub fn shared(identifier: Identifier, shared_group: SharedGroup, policy: AccessPolicy) -> Self {
        Self {
            identifier,
            shared_group: Some(shared_group),
            policy,
        }
    }

    /// Shorthand that validates the identifier string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyIdentifier` for an empty identifier.
    pub fn named(identifier: &str, policy: AccessPolicy) -> Result<Self> {
        Ok(Self::new(Identifier::new(identifier)?, policy))
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn shared_group(&self) -> Option<&SharedGroup> {
        self.shared_group.as_ref()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// The same namespace under another policy.
    pub fn with_policy(&self, policy: AccessPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// The same namespace under another accessibility tier.
    pub(crate) fn retiered(&self, accessibility: Accessibility) -> Self {
        self.with_policy(self.policy.retiered(accessibility))
    }
}

impl fmt::Display for StoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shared_group {
            Some(group) => write!(f, "{} [{}] {}", self.identifier, group, self.policy),
            None => write!(f, "{} {}", self.identifier, self.policy),
        }
    }
}
