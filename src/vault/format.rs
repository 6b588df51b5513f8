//! The JSON vault document and its version history.
//!
//! A `.envseal.vault` file is a single pretty-printed JSON object:
//!
//! ```text
//! {
//!   "version": 3,
//!   "keyMode": "passphrase" | "keyfile",
//!   "salt": "<base64, 16 bytes>",            // passphrase vaults only
//!   "kdf": { "logN": 15, "r": 8, "p": 1 },  // passphrase vaults only
//!   "secrets": { "<name>": { "iv": "…", "data": "…", "tag": "…" } }
//! }
//! ```
//!
//! Versions:
//! - **1**: `version`, `salt`, `secrets`.  Passphrase only, scrypt N=2^10.
//! - **2**: adds `keyMode`.  Passphrase vaults use scrypt N=2^14.
//! - **3**: adds `kdf`, recording the scrypt cost chosen at creation.
//!
//! Older documents are upgraded in memory when parsed; they are written
//! back as the current version on the next save.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::secret::EncryptedValue;
use crate::crypto::kdf::{ScryptParams, SALT_LEN};
use crate::errors::{EnvSealError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// File name of the vault document inside a project directory.
pub const VAULT_FILE_NAME: &str = ".envseal.vault";

/// Newest document version this build reads and the one it writes.
pub const CURRENT_VERSION: u32 = 3;

/// Version assumed when a document carries no `version` field.
const UNVERSIONED: u32 = 1;

// ---------------------------------------------------------------------------
// KeyMode
// ---------------------------------------------------------------------------

/// How the vault key is obtained.  Fixed when the vault is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Key derived from a passphrase and the vault salt with scrypt.
    Passphrase,
    /// Key read verbatim from a base64 key file.
    Keyfile,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passphrase => f.write_str("passphrase"),
            Self::Keyfile => f.write_str("keyfile"),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde shape
// ---------------------------------------------------------------------------

/// scrypt parameters as stored under `kdf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredScryptParams {
    #[serde(rename = "logN")]
    log_n: u8,
    r: u32,
    p: u32,
}

/// Only the version, read before the strict parse so that documents from
/// a newer build are reported as unsupported rather than corrupt.
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<serde_json::Number>,
}

/// Every field any version may carry.  Which ones are required or
/// forbidden is decided per version in `VaultDocument::from_stored`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_mode: Option<KeyMode>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    salt: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    kdf: Option<StoredScryptParams>,

    secrets: BTreeMap<String, EncryptedValue>,
}

// ---------------------------------------------------------------------------
// VaultDocument
// ---------------------------------------------------------------------------

/// A validated, current-version vault document.
///
/// Secrets are kept in a `BTreeMap`, so iteration order is by name and
/// stable for a given document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultDocument {
    key_mode: KeyMode,
    salt: Option<Vec<u8>>,
    kdf: Option<ScryptParams>,
    secrets: BTreeMap<String, EncryptedValue>,
    migrated_from: Option<u32>,
}

impl VaultDocument {
    /// A fresh, empty passphrase vault.
    pub fn new_passphrase(salt: [u8; SALT_LEN], params: ScryptParams) -> Self {
        Self {
            key_mode: KeyMode::Passphrase,
            salt: Some(salt.to_vec()),
            kdf: Some(params),
            secrets: BTreeMap::new(),
            migrated_from: None,
        }
    }

    /// A fresh, empty keyfile vault.
    pub fn new_keyfile() -> Self {
        Self {
            key_mode: KeyMode::Keyfile,
            salt: None,
            kdf: None,
            secrets: BTreeMap::new(),
            migrated_from: None,
        }
    }

    /// Parse and validate raw document bytes, migrating older versions.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let probe: VersionProbe = serde_json::from_slice(bytes).map_err(corrupt)?;
        let version = match probe.version {
            Some(declared) => checked_version(&declared)?,
            None => UNVERSIONED,
        };

        let stored: StoredDocument = serde_json::from_slice(bytes).map_err(corrupt)?;
        Self::from_stored(stored, version)
    }

    /// Serialize as the current version (pretty JSON, trailing newline).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let stored = StoredDocument {
            version: Some(u64::from(CURRENT_VERSION)),
            key_mode: Some(self.key_mode),
            salt: self.salt.clone(),
            kdf: self.kdf.map(|p| StoredScryptParams {
                log_n: p.log_n(),
                r: p.r(),
                p: p.p(),
            }),
            secrets: self.secrets.clone(),
        };

        let mut bytes = serde_json::to_vec_pretty(&stored)
            .map_err(|e| EnvSealError::SerializationError(format!("vault document: {e}")))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Apply the per-version field rules and upgrade to the current version.
    fn from_stored(stored: StoredDocument, version: u32) -> Result<Self> {
        let key_mode = match (version, stored.key_mode) {
            (1, None) => KeyMode::Passphrase,
            (1, Some(_)) => return Err(corrupt("keyMode is not a version 1 field")),
            (_, Some(mode)) => mode,
            (_, None) => {
                return Err(corrupt(format!(
                    "version {version} vault is missing keyMode"
                )))
            }
        };

        let (salt, kdf) = match key_mode {
            KeyMode::Passphrase => {
                let salt = stored
                    .salt
                    .ok_or_else(|| corrupt("passphrase vault is missing salt"))?;
                let kdf = match (stored.kdf, ScryptParams::legacy(version)) {
                    (None, Some(legacy)) => legacy,
                    (Some(_), Some(_)) => {
                        return Err(corrupt(format!("kdf is not a version {version} field")))
                    }
                    (Some(p), None) => ScryptParams::from_stored(p.log_n, p.r, p.p)
                        .map_err(|e| corrupt(format!("kdf: {e}")))?,
                    (None, None) => return Err(corrupt("passphrase vault is missing kdf")),
                };
                (Some(salt), Some(kdf))
            }
            KeyMode::Keyfile => {
                if stored.salt.is_some() {
                    return Err(corrupt("keyfile vault must not carry a salt"));
                }
                if stored.kdf.is_some() {
                    return Err(corrupt("keyfile vault must not carry kdf parameters"));
                }
                (None, None)
            }
        };

        Ok(Self {
            key_mode,
            salt,
            kdf,
            secrets: stored.secrets,
            migrated_from: (version < CURRENT_VERSION).then_some(version),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Format version of this in-memory document (always current).
    pub fn version(&self) -> u32 {
        CURRENT_VERSION
    }

    /// The version the document was upgraded from, if it was migrated.
    pub fn migrated_from(&self) -> Option<u32> {
        self.migrated_from
    }

    pub fn key_mode(&self) -> KeyMode {
        self.key_mode
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn kdf(&self) -> Option<&ScryptParams> {
        self.kdf.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&EncryptedValue> {
        self.secrets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, name: &str, value: EncryptedValue) -> Option<EncryptedValue> {
        self.secrets.insert(name.to_string(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<EncryptedValue> {
        self.secrets.remove(name)
    }

    /// Secret names in stored order.
    pub fn names(&self) -> Vec<String> {
        self.secrets.keys().cloned().collect()
    }

    /// Iterate over `(name, value)` pairs in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EncryptedValue)> {
        self.secrets.iter()
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

/// Accept a declared version this build can read.
///
/// Any integer above the current version is unsupported, including ones
/// too large for `u64` (which serde_json hands over as floats).
fn checked_version(declared: &serde_json::Number) -> Result<u32> {
    let unsupported = || EnvSealError::UnsupportedVersion {
        found: declared.to_string(),
        supported: CURRENT_VERSION,
    };

    match declared.as_u64() {
        Some(0) => Err(corrupt("version 0 is not a valid format version")),
        Some(v) => match u32::try_from(v) {
            Ok(v) if v <= CURRENT_VERSION => Ok(v),
            _ => Err(unsupported()),
        },
        None => match declared.as_f64() {
            Some(f) if f.fract() == 0.0 && f > f64::from(CURRENT_VERSION) => Err(unsupported()),
            _ => Err(corrupt(format!(
                "version must be a positive integer (got {declared})"
            ))),
        },
    }
}

fn corrupt(msg: impl fmt::Display) -> EnvSealError {
    EnvSealError::CorruptVault(msg.to_string())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded byte fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn base64_decode_array<'de, D, const N: usize>(
    deserializer: D,
) -> std::result::Result<[u8; N], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = base64_decode(deserializer)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| serde::de::Error::custom(format!("expected {N} bytes, got {len}")))
}

fn base64_encode_opt<S>(data: &Option<Vec<u8>>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match data {
        Some(bytes) => base64_encode(bytes, serializer),
        None => serializer.serialize_none(),
    }
}

fn base64_decode_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    base64_decode(deserializer).map(Some)
}
