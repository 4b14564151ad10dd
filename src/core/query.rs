//! Attribute queries.
//!
//! A [`Query`] is the attribute dictionary handed to the vault. The
//! [`QueryBuilder`] maps a [`StoreIdentity`] (and optionally an item key) to
//! the canonical query for that store. Building is pure: equal identities
//! always produce byte-identical queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::constants::{self, attr};
use crate::core::identity::StoreIdentity;
use crate::core::types::Attributes;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Data(Vec<u8>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(d) => Some(d),
            _ => None,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Int(_) => 1,
            Self::Text(_) => 2,
            Self::Data(_) => 3,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Data(value)
    }
}

/// Attribute dictionary understood by a vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(Attributes);

impl Query {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set an attribute, returning the query for chaining.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.0
    }

    pub fn into_attributes(self) -> Attributes {
        self.0
    }

    /// Attributes an item must carry to match, i.e. everything except the
    /// control attributes that only steer the query.
    pub fn match_attributes(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0
            .iter()
            .filter(|(name, _)| !attr::CONTROL.contains(&name.as_str()))
    }

    /// The same query reduced to its match attributes.
    pub fn scope(&self) -> Self {
        Self(
            self.match_attributes()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Narrow the query to one item key.
    pub fn for_key(mut self, key: &str) -> Self {
        self.set(attr::ACCOUNT, key);
        self
    }

    /// Ask for a single item including its value.
    pub fn single_with_data(self) -> Self {
        self.with(attr::MATCH_LIMIT, constants::MATCH_LIMIT_ONE)
            .with(attr::RETURN_DATA, true)
    }

    /// Ask for every matching item's attributes.
    pub fn all_attributes(self) -> Self {
        self.with(attr::MATCH_LIMIT, constants::MATCH_LIMIT_ALL)
            .with(attr::RETURN_ATTRIBUTES, true)
    }

    /// Deterministic byte encoding, used to compare queries and as a cache
    /// key by callers.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, value) in &self.0 {
            push_framed(&mut out, name.as_bytes());
            out.push(value.tag());
            match value {
                AttrValue::Bool(b) => out.push(u8::from(*b)),
                AttrValue::Int(i) => out.extend_from_slice(&i.to_be_bytes()),
                AttrValue::Text(s) => push_framed(&mut out, s.as_bytes()),
                AttrValue::Data(d) => push_framed(&mut out, d),
            }
        }
        out
    }
}

fn push_framed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}

impl From<Attributes> for Query {
    fn from(attributes: Attributes) -> Self {
        Self(attributes)
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Maps store identities to canonical vault queries.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Canonical query for a store, or for one item in it when `key` is set.
    pub fn build(identity: &StoreIdentity, key: Option<&str>) -> Query {
        let policy = identity.policy();
        let mut query = Query::new()
            .with(attr::CLASS, constants::CLASS_GENERIC_PASSWORD)
            .with(attr::SERVICE, Self::service(identity));

        if let Some(group) = identity.shared_group() {
            query.set(attr::ACCESS_GROUP, group.to_string());
        }

        // Access control and accessibility are mutually exclusive: the access
        // control already implies the passcode tier.
        match policy.user_presence() {
            Some(up) => query.set(attr::ACCESS_CONTROL, up.control.as_str()),
            None => query.set(attr::ACCESSIBLE, policy.tier_attribute()),
        }

        if policy.syncable() {
            query.set(attr::SYNCHRONIZABLE, true);
        }

        if let Some(key) = key {
            query.set(attr::ACCOUNT, key);
        }

        query
    }

    /// Service attribute naming the store's namespace.
    pub fn service(identity: &StoreIdentity) -> String {
        let policy = identity.policy();
        let scope = if identity.shared_group().is_some() {
            ":shared"
        } else {
            ""
        };
        format!(
            "{}:{}{}:{}:{}{}",
            constants::SERVICE_PREFIX,
            policy.flavour(),
            scope,
            identity.identifier(),
            policy.tier_attribute(),
            policy.service_suffix()
        )
    }
}
