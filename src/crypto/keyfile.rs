//! Key files for keyfile-mode vaults.
//!
//! A key file is a small text file holding the standard base64 encoding
//! of 32 random bytes.  Those bytes are the vault key itself; no
//! derivation happens.  Surrounding whitespace is ignored when reading.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{EnvSealError, Result};

/// Generate a new random key and write it to `path` as base64.
///
/// Refuses to overwrite an existing file unless `force` is set.  The file
/// is written with owner-only permissions on Unix.
pub fn generate_keyfile(path: &Path, force: bool) -> Result<VaultKey> {
    if path.exists() && !force {
        return Err(EnvSealError::KeyfileError(format!(
            "keyfile already exists at {}",
            path.display()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    rand::rng().fill_bytes(&mut bytes);
    let key = VaultKey::new(bytes);
    bytes.zeroize();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                EnvSealError::KeyfileError(format!("cannot create keyfile directory: {e}"))
            })?;
        }
    }

    let encoded = Zeroizing::new(format!("{}\n", BASE64.encode(key.as_bytes())));
    fs::write(path, encoded.as_bytes())
        .map_err(|e| EnvSealError::KeyfileError(format!("failed to write keyfile: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            EnvSealError::KeyfileError(format!("failed to set keyfile permissions: {e}"))
        })?;
    }

    Ok(key)
}

/// Load a key file from disk and decode it into raw key bytes.
///
/// The length is not checked here: a wrong-sized key is reported as
/// `InvalidKeyLength` when it is resolved against a vault.
pub fn load_keyfile(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if !path.exists() {
        return Err(EnvSealError::KeyfileError(format!(
            "keyfile not found at {}",
            path.display()
        )));
    }

    let text = Zeroizing::new(
        fs::read_to_string(path)
            .map_err(|e| EnvSealError::KeyfileError(format!("failed to read keyfile: {e}")))?,
    );
    decode_key(&text)
}

/// Decode base64 key text (from a file or `ENVSEAL_KEY`).
pub fn decode_key(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    BASE64
        .decode(text.trim())
        .map(Zeroizing::new)
        .map_err(|e| EnvSealError::KeyfileError(format!("key is not valid base64: {e}")))
}
