//! Vault module — the encrypted secret document and operations on it.
//!
//! This module provides:
//! - The sealed `EncryptedValue` type (`secret`)
//! - The versioned JSON document with migration (`format`)
//! - Create / load / save / locate on disk (`store`)
//! - Per-secret operations with key resolution (`service`)

pub mod format;
pub mod secret;
pub mod service;
pub mod store;

// Re-export the most commonly used items.
pub use format::{KeyMode, VaultDocument, CURRENT_VERSION, VAULT_FILE_NAME};
pub use secret::EncryptedValue;
pub use service::{open_all, open_secret, resolve_key, Credential, VaultService};
pub use store::{create, load, locate, save};
