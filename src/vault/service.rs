//! Per-secret vault operations.
//!
//! `VaultService` ties the store, the key derivation and the cipher
//! together.  The plain methods load the document fresh from disk for each
//! call.  Callers that need to inspect the vault before acting (to pick a
//! credential source, say) `load` once and pass that document to the
//! `*_in` methods or to [`open_secret`] / [`open_all`], so a whole command
//! works from a single read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use super::format::{KeyMode, VaultDocument};
use super::store;
use crate::crypto::encryption::{open, seal};
use crate::crypto::kdf::derive_key_with_params;
use crate::crypto::keys::VaultKey;
use crate::errors::{EnvSealError, Result};

/// Longest accepted secret name in bytes.
const MAX_NAME_LEN: usize = 256;

/// Material that unlocks a vault: a passphrase or a raw 32-byte key.
pub enum Credential {
    Passphrase(Zeroizing<String>),
    Key(Zeroizing<Vec<u8>>),
}

impl Credential {
    /// Wrap a passphrase.
    pub fn passphrase(passphrase: impl Into<String>) -> Self {
        Self::Passphrase(Zeroizing::new(passphrase.into()))
    }

    /// Wrap raw key bytes.  The length is checked when the key is resolved.
    pub fn key(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Key(Zeroizing::new(bytes.into()))
    }

    /// Build a credential from optional parts; exactly one must be present.
    ///
    /// An empty passphrase counts as absent.
    pub fn from_parts(passphrase: Option<&str>, key: Option<&[u8]>) -> Result<Self> {
        let passphrase = passphrase.filter(|p| !p.is_empty());
        match (passphrase, key) {
            (Some(p), None) => Ok(Self::passphrase(p)),
            (None, Some(k)) => Ok(Self::key(k)),
            (Some(_), Some(_)) => Err(EnvSealError::AmbiguousCredential),
            (None, None) => Err(EnvSealError::CredentialRequired),
        }
    }

    /// The key mode this credential can unlock.
    pub fn mode(&self) -> KeyMode {
        match self {
            Self::Passphrase(_) => KeyMode::Passphrase,
            Self::Key(_) => KeyMode::Keyfile,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{}", self.mode())
    }
}

/// Turn a credential into the vault key, following the vault's key mode.
pub fn resolve_key(document: &VaultDocument, credential: &Credential) -> Result<VaultKey> {
    match (document.key_mode(), credential) {
        (KeyMode::Keyfile, Credential::Key(bytes)) => VaultKey::from_slice(bytes),
        (KeyMode::Passphrase, Credential::Passphrase(passphrase)) => {
            if passphrase.is_empty() {
                return Err(EnvSealError::CredentialRequired);
            }
            let salt = document
                .salt()
                .ok_or_else(|| EnvSealError::CorruptVault("passphrase vault has no salt".into()))?;
            let params = document.kdf().ok_or_else(|| {
                EnvSealError::CorruptVault("passphrase vault has no kdf parameters".into())
            })?;
            derive_key_with_params(passphrase.as_bytes(), salt, params)
        }
        (vault, supplied) => Err(EnvSealError::CredentialModeMismatch {
            vault,
            supplied: supplied.mode(),
        }),
    }
}

/// High-level operations on the vault at one path.
#[derive(Debug, Clone)]
pub struct VaultService {
    path: PathBuf,
}

impl VaultService {
    /// Operate on the vault file at `path`.  Nothing is read until the
    /// first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the vault document once.
    pub fn load(&self) -> Result<VaultDocument> {
        store::load(&self.path)
    }

    /// The key mode the vault was created with.
    pub fn key_mode(&self) -> Result<KeyMode> {
        Ok(self.load()?.key_mode())
    }

    /// Add or replace a secret.
    pub fn set(&self, name: &str, plaintext: &str, credential: &Credential) -> Result<()> {
        self.set_many([(name, plaintext)], credential).map(|_| ())
    }

    /// Add or replace several secrets with one load, one key resolution
    /// and one save.  Returns how many entries were written.
    pub fn set_many<'a, I>(&self, entries: I, credential: &Credential) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.set_many_in(self.load()?, entries, credential)
    }

    /// `set_many` on an already loaded document, which is then saved.
    ///
    /// If the vault already holds secrets, the resolved key must open one
    /// of them; otherwise nothing is written and `WrongCredential` is
    /// returned.  This keeps every value in a vault under the same key.
    pub fn set_many_in<'a, I>(
        &self,
        mut document: VaultDocument,
        entries: I,
        credential: &Credential,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let key = resolve_key(&document, credential)?;
        verify_key(&document, &key)?;

        let mut count = 0;
        for (name, plaintext) in entries {
            validate_secret_name(name)?;
            let replaced = document.insert(name, seal(plaintext, &key)?).is_some();
            debug!(name, replaced, "sealed secret");
            count += 1;
        }

        if count > 0 {
            store::save(&self.path, &document)?;
        }
        Ok(count)
    }

    /// Decrypt one secret.
    pub fn get(&self, name: &str, credential: &Credential) -> Result<String> {
        open_secret(&self.load()?, name, credential)
    }

    /// Secret names in stored order.  Needs no credential.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.load()?.names())
    }

    /// Remove a secret.  Needs no credential.
    pub fn remove(&self, name: &str) -> Result<()> {
        self.remove_in(self.load()?, name)
    }

    /// `remove` on an already loaded document, which is then saved.
    pub fn remove_in(&self, mut document: VaultDocument, name: &str) -> Result<()> {
        if document.remove(name).is_none() {
            return Err(EnvSealError::SecretNotFound(name.to_string()));
        }
        store::save(&self.path, &document)?;
        debug!(name, "removed secret");
        Ok(())
    }

    /// Decrypt every secret.  Fails as a whole if any single value does
    /// not open.
    pub fn export_all(&self, credential: &Credential) -> Result<BTreeMap<String, String>> {
        open_all(&self.load()?, credential)
    }
}

/// Decrypt one secret of a loaded document.
///
/// A missing name is reported before any key work.
pub fn open_secret(
    document: &VaultDocument,
    name: &str,
    credential: &Credential,
) -> Result<String> {
    let value = document
        .get(name)
        .ok_or_else(|| EnvSealError::SecretNotFound(name.to_string()))?;

    let key = resolve_key(document, credential)?;
    open(value, &key)
}

/// Decrypt every secret of a loaded document, all or nothing.
pub fn open_all(
    document: &VaultDocument,
    credential: &Credential,
) -> Result<BTreeMap<String, String>> {
    let key = resolve_key(document, credential)?;

    document
        .iter()
        .map(|(name, value)| Ok((name.clone(), open(value, &key)?)))
        .collect()
}

/// Check `key` against the first stored value, if there is one.
fn verify_key(document: &VaultDocument, key: &VaultKey) -> Result<()> {
    match document.iter().next() {
        Some((_, value)) => open(value, key).map(drop),
        None => Ok(()),
    }
}

/// Validate that a secret name is safe to store and to export as an
/// environment variable.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty and at most 256 bytes.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EnvSealError::InvalidSecretName(
            "secret name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(EnvSealError::InvalidSecretName(format!(
            "secret name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(EnvSealError::InvalidSecretName(format!(
            "'{name}' contains invalid characters; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
