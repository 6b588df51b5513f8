//! `envseal rm` — remove a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::VaultService;

/// Execute the `rm` command.
pub fn execute(cli: &Cli, key: &str, force: bool) -> Result<()> {
    let service = VaultService::new(vault_path(cli)?);

    let document = service.load()?;
    if !document.contains(key) {
        return Err(EnvSealError::SecretNotFound(key.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove secret '{key}'?"))
            .default(false)
            .interact()
            .map_err(|e| EnvSealError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    service.remove_in(document, key)?;
    output::success(&format!("Removed secret '{key}'"));

    Ok(())
}
