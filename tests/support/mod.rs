//! Test support utilities for coffer integration tests.
//!
//! Provides isolated CLI environments, scripted authenticators, and store
//! fixtures over an in-memory vault.

#![allow(dead_code)]

pub mod assertions;
pub mod auth;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use auth::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// CLI test environment with an isolated temp directory.
///
/// The config and vault files live in `dir`; child processes find the config
/// through `COFFER_CONFIG`, so tests can safely run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Create an environment whose config points at a vault in the temp dir.
    pub fn new() -> Self {
        let t = Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        };
        t.write_config("");
        t
    }

    /// Create an environment for the store `identifier`.
    pub fn with_identifier(identifier: &str) -> Self {
        let t = Self::new();
        t.write_config(&format!("[store]\nidentifier = \"{}\"\n", identifier));
        t
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn vault_path(&self) -> PathBuf {
        self.dir.path().join("vault.json")
    }

    /// Write `store_section` plus a `[vault]` section pointing into the temp
    /// dir.
    pub fn write_config(&self, store_section: &str) {
        let vault = self.vault_path().display().to_string().replace('\\', "\\\\");
        let contents = format!("{}\n[vault]\npath = \"{}\"\n", store_section, vault);
        std::fs::write(self.config_path(), contents).expect("failed to write config");
    }
}
