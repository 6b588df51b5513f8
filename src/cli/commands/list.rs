//! `envseal list` — print secret names.

use crate::cli::output;
use crate::cli::{vault_path, Cli};
use crate::errors::Result;
use crate::vault::VaultService;

/// Execute the `list` command.  Needs no credential.
pub fn execute(cli: &Cli) -> Result<()> {
    let names = VaultService::new(vault_path(cli)?).list()?;
    output::print_names(&names);
    Ok(())
}
