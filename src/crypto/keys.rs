//! In-memory symmetric key handling.
//!
//! Every vault is encrypted under a single 32-byte AES-256 key: derived
//! from the passphrase for passphrase vaults, taken verbatim from the key
//! file for keyfile vaults.  `VaultKey` keeps it zeroized on drop.

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{EnvSealError, Result};

/// Length of the symmetric key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte vault key that wipes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Build a key from an arbitrary buffer, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| EnvSealError::InvalidKeyLength(bytes.len()))?;
        Ok(Self::new(array))
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Short, non-secret identifier for showing which key is in use.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.bytes)
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey").finish_non_exhaustive()
    }
}

/// Hex of the first 8 bytes of SHA-256 over the key.
fn fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}
