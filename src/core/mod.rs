//! Core library components.
//!
//! This module contains the reusable logic: access policies, store
//! identities, the vault abstraction, stores, and migration.

pub mod auth;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod identity;
pub mod migration;
pub mod policy;
pub mod query;
pub mod store;
pub mod types;
pub mod validation;
pub mod vault;
