//! Cryptographic primitives for envseal.
//!
//! This module provides:
//! - AES-256-GCM sealing and opening of single values (`encryption`)
//! - scrypt passphrase-based key derivation (`kdf`)
//! - The zeroize-on-drop `VaultKey` (`keys`)
//! - Base64 key files for keyfile-mode vaults (`keyfile`)

pub mod encryption;
pub mod kdf;
pub mod keyfile;
pub mod keys;

pub use encryption::{open, seal};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, ScryptParams, SALT_LEN};
pub use keyfile::{decode_key, generate_keyfile, load_keyfile};
pub use keys::{VaultKey, KEY_LEN};
