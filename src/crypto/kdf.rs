//! Passphrase-based key derivation using scrypt.
//!
//! scrypt is memory-hard: every derivation needs `128 * r * N` bytes of
//! working memory, which makes offline guessing on GPUs expensive.  The
//! default cost is N = 2^15, r = 8, p = 1 (32 MiB per derivation).

use rand::RngCore;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{EnvSealError, Result};

/// Length of the vault salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Smallest scrypt working set we accept for new vaults (32 MiB).
const MIN_MEMORY_BYTES: u64 = 32 * 1024 * 1024;

/// Floor for parameters read back from a vault: the cost of the oldest
/// format version (N = 2^10, r = 8), which migrated vaults keep.
const STORED_MIN_MEMORY_BYTES: u64 = 1024 * 1024;

/// Largest accepted `log_n`; 2^20 with r = 8 already needs 1 GiB.
const MAX_LOG_N: u8 = 20;

/// scrypt cost parameters.
///
/// Fields are private: new vaults go through [`ScryptParams::new`] and its
/// 32 MiB floor, while the cheaper costs of older format versions are only
/// reachable when reading an existing vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    log_n: u8,
    r: u32,
    p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            log_n: 15,
            r: 8,
            p: 1,
        }
    }
}

impl ScryptParams {
    /// Build parameters for a new vault, refusing anything below the
    /// 32 MiB working-set floor.
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self> {
        Self::checked(log_n, r, p, MIN_MEMORY_BYTES)
    }

    /// Parameters used by format versions that did not record their cost.
    ///
    /// Version 1 vaults were derived with N = 2^10 and version 2 vaults with
    /// N = 2^14.  Returns `None` for versions that always store `kdf`.
    pub fn legacy(version: u32) -> Option<Self> {
        let log_n = match version {
            1 => 10,
            2 => 14,
            _ => return None,
        };
        Some(Self { log_n, r: 8, p: 1 })
    }

    /// Rebuild parameters recorded in a vault document.
    ///
    /// Vaults migrated from older versions keep their original, cheaper
    /// cost, so only the legacy floor applies here.
    pub(crate) fn from_stored(log_n: u8, r: u32, p: u32) -> Result<Self> {
        Self::checked(log_n, r, p, STORED_MIN_MEMORY_BYTES)
    }

    fn checked(log_n: u8, r: u32, p: u32, min_memory: u64) -> Result<Self> {
        if log_n > MAX_LOG_N {
            return Err(EnvSealError::KeyDerivationError(format!(
                "scrypt log_n must be at most {MAX_LOG_N} (got {log_n})"
            )));
        }
        if r < 1 || p < 1 {
            return Err(EnvSealError::KeyDerivationError(
                "scrypt r and p must be at least 1".into(),
            ));
        }

        let params = Self { log_n, r, p };
        if params.memory_bytes() < min_memory {
            return Err(EnvSealError::KeyDerivationError(format!(
                "scrypt working set must be at least {} KiB (got {} KiB with log_n={log_n}, r={r})",
                min_memory / 1024,
                params.memory_bytes() / 1024
            )));
        }
        Ok(params)
    }

    pub fn log_n(&self) -> u8 {
        self.log_n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    /// Working memory of one derivation in bytes (`128 * r * 2^log_n`).
    pub fn memory_bytes(&self) -> u64 {
        128 * u64::from(self.r) * (1u64 << self.log_n)
    }
}

/// Derive a 32-byte key from a passphrase and salt with the default cost.
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<VaultKey> {
    derive_key_with_params(passphrase, salt, &ScryptParams::default())
}

/// Derive a 32-byte key with explicit scrypt parameters.
///
/// The same passphrase + salt + params always produce the same key.
pub fn derive_key_with_params(
    passphrase: &[u8],
    salt: &[u8],
    params: &ScryptParams,
) -> Result<VaultKey> {
    if salt.len() != SALT_LEN {
        return Err(EnvSealError::InvalidSalt(salt.len()));
    }

    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, KEY_LEN)
        .map_err(|e| EnvSealError::KeyDerivationError(format!("invalid scrypt params: {e}")))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(passphrase, salt, &scrypt_params, &mut key)
        .map_err(|e| EnvSealError::KeyDerivationError(format!("scrypt failed: {e}")))?;

    Ok(VaultKey::new(key))
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_meet_the_memory_floor() {
        let params = ScryptParams::default();
        assert_eq!(params.memory_bytes(), MIN_MEMORY_BYTES);
        assert_eq!(ScryptParams::new(15, 8, 1).unwrap(), params);
    }

    #[test]
    fn weak_params_are_rejected() {
        assert!(ScryptParams::new(14, 8, 1).is_err());
        assert!(ScryptParams::new(10, 8, 1).is_err());
        assert!(ScryptParams::new(16, 0, 1).is_err());
        assert!(ScryptParams::new(15, 8, 0).is_err());
    }

    #[test]
    fn huge_log_n_is_rejected() {
        assert!(ScryptParams::new(21, 8, 1).is_err());
        assert!(ScryptParams::new(20, 8, 1).is_ok());
    }

    #[test]
    fn larger_block_size_can_offset_smaller_n() {
        // 128 * 16 * 2^14 = 32 MiB
        assert!(ScryptParams::new(14, 16, 1).is_ok());
    }

    #[test]
    fn legacy_params_exist_only_for_old_versions() {
        assert_eq!(ScryptParams::legacy(1).unwrap().log_n(), 10);
        assert_eq!(ScryptParams::legacy(2).unwrap().log_n(), 14);
        assert!(ScryptParams::legacy(3).is_none());
    }

    #[test]
    fn stored_params_accept_legacy_cost_but_not_less() {
        assert_eq!(
            ScryptParams::from_stored(10, 8, 1).unwrap(),
            ScryptParams::legacy(1).unwrap()
        );
        assert!(ScryptParams::from_stored(9, 8, 1).is_err());
        assert!(ScryptParams::from_stored(21, 8, 1).is_err());
    }

    #[test]
    fn legacy_params_still_derive() {
        let salt = generate_salt();
        let params = ScryptParams::legacy(1).unwrap();
        let k1 = derive_key_with_params(b"pw", &salt, &params).unwrap();
        let k2 = derive_key_with_params(b"pw", &salt, &params).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn short_salt_is_rejected() {
        let result = derive_key(b"pw", &[0u8; 8]);
        assert!(matches!(result, Err(EnvSealError::InvalidSalt(8))));
    }

    #[test]
    fn generated_salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
