//! `envseal set` — add or update a secret in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{acquire_credential, vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::service::validate_secret_name;
use crate::vault::VaultService;

/// Execute the `set` command.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    validate_secret_name(key)?;

    let path = vault_path(cli)?;
    let service = VaultService::new(&path);
    let document = service.load()?;
    let existed = document.contains(key);
    let total = if existed { document.len() } else { document.len() + 1 };

    // Determine the secret value from one of three sources.
    let secret_value = Zeroizing::new(if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end_matches(&['\r', '\n'][..]).to_string()
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {key}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| EnvSealError::CommandFailed(format!("input prompt: {e}")))?
    });

    let credential = acquire_credential(cli, &path, document.key_mode(), document.is_empty())?;
    service.set_many_in(document, [(key, secret_value.as_str())], &credential)?;

    let verb = if existed { "updated in" } else { "added to" };
    output::success(&format!(
        "Secret '{key}' {verb} {} ({total} total)",
        path.display()
    ));
    output::tip("Run your app: envseal run -- <command>");

    Ok(())
}
