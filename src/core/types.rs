//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

use crate::core::query::AttrValue;

/// An item key within a store's namespace (e.g. `api_token`).
pub type ItemKey = String;

/// An opaque item payload.
pub type ItemValue = Vec<u8>;

/// A single attribute dictionary as stored in or returned by a vault.
///
/// A `BTreeMap` keeps iteration and serialization order deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;
