//! `envseal export` — export secrets in various formats.
//!
//! Supported formats:
//! - `env` (default): `.env` file format (KEY=value, one per line)
//! - `json`: JSON object { "KEY": "value", ... }

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::cli::env_parser::format_env;
use crate::cli::output;
use crate::cli::{acquire_credential, vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::{open_all, VaultService};

/// Execute the `export` command.
pub fn execute(cli: &Cli, format: &str, output_path: Option<&Path>) -> Result<()> {
    // Safety: refuse to overwrite vault files.
    if let Some(dest) = output_path {
        let is_vault = dest
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vault"));
        if is_vault {
            return Err(EnvSealError::CommandFailed(
                "refusing to export over a .vault file".into(),
            ));
        }
    }

    let path = vault_path(cli)?;
    let document = VaultService::new(&path).load()?;
    let credential = acquire_credential(cli, &path, document.key_mode(), false)?;

    // Decrypt all secrets; sorted by name.
    let secrets = open_all(&document, &credential)?;

    let content = match format {
        "env" => format_env(&secrets),
        "json" => format_as_json(&secrets)?,
        other => {
            return Err(EnvSealError::CommandFailed(format!(
                "unknown export format '{other}'; use 'env' or 'json'"
            )));
        }
    };

    // Write to file or stdout.
    match output_path {
        Some(dest) => {
            fs::write(dest, &content).map_err(|e| {
                EnvSealError::CommandFailed(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!(
                "Exported {} secrets to {} (format: {format})",
                secrets.len(),
                dest.display(),
            ));
        }
        None => {
            // Write to stdout (no success message, just raw output).
            print!("{content}");
        }
    }

    Ok(())
}

/// Format secrets as a JSON object.
fn format_as_json(secrets: &BTreeMap<String, String>) -> Result<String> {
    serde_json::to_string_pretty(secrets)
        .map(|json| json + "\n")
        .map_err(|e| EnvSealError::SerializationError(format!("JSON export: {e}")))
}
