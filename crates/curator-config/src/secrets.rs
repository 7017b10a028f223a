//! Secrets handle and the secret store contract.
//!
//! The configuration core never sees secret values held by the vault. It
//! only learns which secrets exist, so callers can ask "is the API key
//! configured?" without any plaintext crossing this boundary.

use curator_core::{reflect_members, CuratorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Vault database file name inside the vault directory.
pub const VAULT_DATABASE_FILE: &str = "vault.db";

/// File extension of secret entries in a [`VaultDirectoryStore`].
const SECRET_EXTENSION: &str = "secret";

/// Lists the secrets held by a vault.
pub trait SecretStore {
    /// Names of the secrets stored in the vault at `vault_path`.
    ///
    /// A vault that does not exist yet holds no secrets; that is not an
    /// error.
    fn secret_names(&self, vault_path: &Path) -> Result<Vec<String>>;
}

/// Secret store treating each `*.secret` file in the vault directory as one
/// named entry. Contents are never read.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultDirectoryStore;

impl SecretStore for VaultDirectoryStore {
    fn secret_names(&self, vault_path: &Path) -> Result<Vec<String>> {
        if !vault_path.is_dir() {
            debug!(vault = %vault_path.display(), "vault directory not present yet");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(vault_path).map_err(|e| {
            CuratorError::Secrets(format!(
                "failed to list vault {}: {e}",
                vault_path.display()
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(SECRET_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Handle to the secret vault, as held by the configuration model.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsHandle {
    /// Vault directory
    pub vault_path: PathBuf,
    /// Vault database file
    pub database_path: PathBuf,
    /// Whether the secret names have been loaded from the store
    pub loaded: bool,
    /// Names of secrets present in the vault
    names: BTreeSet<String>,
    /// Plaintext secrets found in a legacy configuration section
    pub legacy: BTreeMap<String, String>,
}

impl SecretsHandle {
    /// Create a handle for the vault at `vault_path`.
    #[must_use]
    pub fn new(vault_path: impl Into<PathBuf>) -> Self {
        let mut handle = Self::default();
        handle.attach(vault_path);
        handle
    }

    /// Point the handle at a vault directory, keeping legacy entries.
    pub fn attach(&mut self, vault_path: impl Into<PathBuf>) {
        self.vault_path = vault_path.into();
        self.database_path = self.vault_path.join(VAULT_DATABASE_FILE);
        self.loaded = false;
        self.names.clear();
    }

    /// Whether the handle points at a vault.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.vault_path.as_os_str().is_empty()
    }

    /// Populate the cached secret names from `store`.
    pub fn populate(&mut self, store: &dyn SecretStore) -> Result<usize> {
        let names = store.secret_names(&self.vault_path)?;
        self.names = names.into_iter().collect();
        self.loaded = true;
        info!(
            vault = %self.vault_path.display(),
            count = self.names.len(),
            "loaded secret index"
        );
        Ok(self.names.len())
    }

    /// Whether a secret with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names of the secrets in the vault.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Debug for SecretsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsHandle")
            .field("vault_path", &self.vault_path)
            .field("database_path", &self.database_path)
            .field("loaded", &self.loaded)
            .field("names", &self.names)
            .field("legacy", &self.legacy.keys().collect::<Vec<_>>())
            .finish()
    }
}

reflect_members!(SecretsHandle);
