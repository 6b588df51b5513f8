use std::path::PathBuf;
use thiserror::Error;

use crate::vault::KeyMode;

/// All errors that can occur in envseal.
#[derive(Debug, Error)]
pub enum EnvSealError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong passphrase, wrong key, or tampered ciphertext. Deliberately
    /// carries no detail about which.
    #[error("Decryption failed: wrong credential or tampered vault")]
    WrongCredential,

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Invalid salt: expected 16 bytes, got {0}")]
    InvalidSalt(usize),

    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Unsupported vault version {found} (this build understands up to {supported})")]
    UnsupportedVersion { found: String, supported: u32 },

    #[error("Corrupt vault: {0}")]
    CorruptVault(String),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Invalid secret name: {0}")]
    InvalidSecretName(String),

    // --- Credential errors ---
    #[error("A passphrase or key is required to unlock this vault")]
    CredentialRequired,

    #[error("Supply either a passphrase or a key, not both")]
    AmbiguousCredential,

    #[error("This vault uses {vault} mode but a {supplied} credential was supplied")]
    CredentialModeMismatch { vault: KeyMode, supplied: KeyMode },

    #[error("Keyfile error: {0}")]
    KeyfileError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("No command specified; use `envseal run -- <command>`")]
    NoCommandSpecified,

    #[error("Child process exited with code {0}")]
    ChildProcessFailed(i32),
}

/// Convenience type alias for envseal results.
pub type Result<T> = std::result::Result<T, EnvSealError>;
