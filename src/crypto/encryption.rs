//! AES-256-GCM authenticated encryption of single secret values.
//!
//! Each call to `seal` draws a fresh random 12-byte nonce.  The nonce,
//! ciphertext and 16-byte tag are kept as separate fields of
//! [`EncryptedValue`] so the vault document can store them as `iv`,
//! `data` and `tag`.  No associated data is bound.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use super::keys::VaultKey;
use crate::errors::{EnvSealError, Result};
use crate::vault::secret::{EncryptedValue, NONCE_LEN, TAG_LEN};

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(plaintext: &str, key: &VaultKey) -> Result<EncryptedValue> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| EnvSealError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(EncryptedValue {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate a value produced by [`seal`].
///
/// A wrong key and a tampered nonce, ciphertext or tag are
/// indistinguishable: all of them yield `WrongCredential`.
pub fn open(value: &EncryptedValue, key: &VaultKey) -> Result<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    // aes-gcm applies the keystream before comparing tags, so the buffer
    // holds unauthenticated plaintext on failure and must be wiped.
    let mut buffer = Zeroizing::new(value.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&value.nonce),
            b"",
            buffer.as_mut_slice(),
            Tag::from_slice(&value.tag),
        )
        .map_err(|_| EnvSealError::WrongCredential)?;

    let plaintext = std::mem::take(&mut *buffer);
    String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        EnvSealError::CorruptVault("secret value is not valid UTF-8".into())
    })
}
