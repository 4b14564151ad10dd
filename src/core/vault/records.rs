//! Matching rules over an in-memory item list.
//!
//! Shared by [`MemoryVault`](super::MemoryVault) and
//! [`FileVault`](super::FileVault) so both interpret queries identically.

use crate::core::constants::{self, attr};
use crate::core::query::{AttrValue, Query};
use crate::core::types::Attributes;

use super::{VaultError, VaultResult};

/// Attributes that together identify an item; inserting a second item with
/// the same values is a duplicate.
const PRIMARY_KEY: &[&str] = &[
    attr::CLASS,
    attr::SERVICE,
    attr::ACCESS_GROUP,
    attr::ACCOUNT,
    attr::SYNCHRONIZABLE,
];

/// True when `item` carries every match attribute of `query`.
pub fn matches(item: &Attributes, query: &Query) -> bool {
    query
        .match_attributes()
        .all(|(name, value)| item.get(name) == Some(value))
}

fn wants(query: &Query, name: &str) -> bool {
    query.get(name).and_then(AttrValue::as_bool).unwrap_or(false)
}

fn requires_interaction(item: &Attributes, query: &Query) -> bool {
    item.contains_key(attr::ACCESS_CONTROL)
        && query.get(attr::AUTH_UI).and_then(AttrValue::as_text) == Some(constants::AUTH_UI_FAIL)
}

/// Run a read query against `items`.
///
/// # Errors
///
/// `ItemNotFound` when nothing matches; `InteractionNotAllowed` when a
/// matching item is access-controlled and the query forbids prompting.
pub fn select(items: &[Attributes], query: &Query) -> VaultResult<Vec<Attributes>> {
    if query.is_empty() {
        return Err(VaultError::InvalidParameter("empty query".to_string()));
    }

    let single = query.get(attr::MATCH_LIMIT).and_then(AttrValue::as_text)
        != Some(constants::MATCH_LIMIT_ALL);
    let return_data = wants(query, attr::RETURN_DATA);

    let mut found = Vec::new();
    for item in items.iter().filter(|item| matches(item, query)) {
        if requires_interaction(item, query) {
            return Err(VaultError::InteractionNotAllowed);
        }
        let mut projected = item.clone();
        if !return_data {
            projected.remove(attr::VALUE_DATA);
        }
        found.push(projected);
        if single {
            break;
        }
    }

    if found.is_empty() {
        return Err(VaultError::ItemNotFound);
    }
    Ok(found)
}

/// Add an item to `items`.
///
/// # Errors
///
/// `InvalidParameter` for an empty dictionary, `DuplicateItem` when the
/// primary key is already present.
pub fn insert(items: &mut Vec<Attributes>, attributes: &Attributes) -> VaultResult<()> {
    if attributes.is_empty() {
        return Err(VaultError::InvalidParameter("empty attributes".to_string()));
    }

    let item: Attributes = attributes
        .iter()
        .filter(|(name, _)| !attr::CONTROL.contains(&name.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let duplicate = items.iter().any(|existing| {
        PRIMARY_KEY
            .iter()
            .all(|name| existing.get(*name) == item.get(*name))
    });
    if duplicate {
        return Err(VaultError::DuplicateItem);
    }

    items.push(item);
    Ok(())
}

/// Apply `changes` to every item matching `matching`.
///
/// # Errors
///
/// `ItemNotFound` when nothing matches.
pub fn update(items: &mut [Attributes], matching: &Query, changes: &Attributes) -> VaultResult<()> {
    if matching.is_empty() || changes.is_empty() {
        return Err(VaultError::InvalidParameter("empty query or changes".to_string()));
    }

    let mut updated = 0usize;
    for item in items.iter_mut().filter(|item| matches(item, matching)) {
        for (name, value) in changes {
            if !attr::CONTROL.contains(&name.as_str()) {
                item.insert(name.clone(), value.clone());
            }
        }
        updated += 1;
    }

    if updated == 0 {
        return Err(VaultError::ItemNotFound);
    }
    Ok(())
}

/// Remove every item matching `query`.
///
/// # Errors
///
/// `ItemNotFound` when nothing matches.
pub fn delete(items: &mut Vec<Attributes>, query: &Query) -> VaultResult<()> {
    if query.is_empty() {
        return Err(VaultError::InvalidParameter("empty query".to_string()));
    }

    let before = items.len();
    items.retain(|item| !matches(item, query));

    if items.len() == before {
        return Err(VaultError::ItemNotFound);
    }
    Ok(())
}
