//! File-backed vault.
//!
//! Persists items as JSON at a single path. Every operation re-reads the
//! file, so changes made by another process are always seen. Writes go to a
//! temporary sibling file that is renamed over the original.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use zeroize::Zeroize;

use crate::core::policy::AccessPolicy;
use crate::core::query::Query;
use crate::core::types::Attributes;

use super::{records, Vault, VaultError, VaultResult};

/// Vault stored in a JSON file (0600 on Unix).
///
/// Offers no protection beyond file permissions. User-presence tiers are
/// accepted; the prompt is enforced by the store's authenticator.
#[derive(Debug)]
pub struct FileVault {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> VaultResult<Vec<Attributes>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut contents = fs::read(&self.path)
            .map_err(|e| VaultError::Backend(format!("read {}: {}", self.path.display(), e)))?;
        let parsed = serde_json::from_slice(&contents)
            .map_err(|e| VaultError::Backend(format!("parse {}: {}", self.path.display(), e)));
        contents.zeroize();
        parsed
    }

    fn save(&self, items: &[Attributes]) -> VaultResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| VaultError::Backend(format!("create {}: {}", parent.display(), e)))?;
            }
        }

        let mut contents = serde_json::to_vec_pretty(items)
            .map_err(|e| VaultError::Backend(format!("serialize vault: {}", e)))?;
        let tmp = self.path.with_extension("json.tmp");
        let written = write_private(&tmp, &contents);
        contents.zeroize();
        written.map_err(|e| VaultError::Backend(format!("write {}: {}", tmp.display(), e)))?;

        fs::rename(&tmp, &self.path)
            .map_err(|e| VaultError::Backend(format!("rename to {}: {}", self.path.display(), e)))?;

        debug!(path = %self.path.display(), items = items.len(), "vault file saved");
        Ok(())
    }

    /// Run `op` over the loaded items and save them if it succeeds.
    fn mutate<T>(&self, op: impl FnOnce(&mut Vec<Attributes>) -> VaultResult<T>) -> VaultResult<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| VaultError::Backend(format!("vault lock poisoned: {}", e)))?;
        let mut items = self.load()?;
        let out = op(&mut items)?;
        self.save(&items)?;
        Ok(out)
    }
}

impl Vault for FileVault {
    fn query(&self, query: &Query) -> VaultResult<Vec<Attributes>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| VaultError::Backend(format!("vault lock poisoned: {}", e)))?;
        let items = self.load()?;
        records::select(&items, query)
    }

    fn insert(&self, attributes: &Attributes) -> VaultResult<()> {
        self.mutate(|items| records::insert(items, attributes))
    }

    fn update(&self, matching: &Query, changes: &Attributes) -> VaultResult<()> {
        self.mutate(|items| records::update(items, matching, changes))
    }

    fn delete(&self, query: &Query) -> VaultResult<()> {
        self.mutate(|items| records::delete(items, query))
    }

    fn supports(&self, _policy: &AccessPolicy) -> bool {
        true
    }
}

/// Write `contents` to a newly created file, owner-only on Unix.
///
/// A stale file at `path` is removed first so its permissions never carry over.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
