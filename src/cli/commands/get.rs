//! `envseal get` — retrieve and print a single secret's value.

use crate::cli::{acquire_credential, vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::{open_secret, VaultService};

/// Execute the `get` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let path = vault_path(cli)?;
    let document = VaultService::new(&path).load()?;

    // Fail on unknown names before asking for a credential.
    if !document.contains(key) {
        return Err(EnvSealError::SecretNotFound(key.to_string()));
    }

    let credential = acquire_credential(cli, &path, document.key_mode(), false)?;

    // Decrypt and print the secret value to stdout.
    let value = open_secret(&document, key, &credential)?;
    println!("{value}");

    Ok(())
}
