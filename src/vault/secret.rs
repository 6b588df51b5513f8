//! The encrypted form of a single secret.
//!
//! In the vault document each value is an object of three base64
//! strings: `iv` (12-byte nonce), `data` (ciphertext, same length as the
//! plaintext) and `tag` (16-byte GCM tag).  Decoding checks the fixed
//! lengths, so a malformed entry is rejected when the vault is loaded.

use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_decode_array, base64_encode};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// One sealed secret value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptedValue {
    #[serde(
        rename = "iv",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode_array"
    )]
    pub nonce: [u8; NONCE_LEN],

    #[serde(
        rename = "data",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub ciphertext: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode_array")]
    pub tag: [u8; TAG_LEN],
}
