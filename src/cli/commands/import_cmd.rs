//! `envseal import` — import secrets from external files.
//!
//! Supported formats:
//! - `.env` files (the default)
//! - JSON files (object with string values, detected by extension)

use std::fs;
use std::path::Path;

use crate::cli::env_parser;
use crate::cli::output;
use crate::cli::{acquire_credential, vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::service::validate_secret_name;
use crate::vault::VaultService;

/// Execute the `import` command.
pub fn execute(cli: &Cli, source: &Path, format: Option<&str>) -> Result<()> {
    if !source.exists() {
        return Err(EnvSealError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    // Detect format from flag or file extension.
    let detected_format = match format {
        Some(f) => f.to_string(),
        None => detect_format(source),
    };

    let secrets = match detected_format.as_str() {
        "env" => env_parser::parse_env_file(source)?,
        "json" => parse_json_file(source)?,
        other => {
            return Err(EnvSealError::CommandFailed(format!(
                "unknown import format '{other}'; use 'env' or 'json'"
            )));
        }
    };

    if secrets.is_empty() {
        output::warning("No secrets found in the import file.");
        return Ok(());
    }

    // Reject the whole file before touching the vault.
    for (key, _) in &secrets {
        validate_secret_name(key)?;
    }

    let path = vault_path(cli)?;
    let service = VaultService::new(&path);
    let document = service.load()?;
    let credential = acquire_credential(cli, &path, document.key_mode(), document.is_empty())?;

    let count = service.set_many_in(
        document,
        secrets.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        &credential,
    )?;

    for (key, _) in &secrets {
        output::info(&format!("  + {key}"));
    }
    output::success(&format!(
        "Imported {count} secrets from {}",
        source.display()
    ));

    Ok(())
}

/// Detect the file format from its extension.
fn detect_format(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "json".to_string(),
        _ => "env".to_string(), // Default to .env format.
    }
}

/// Parse a JSON file (object with scalar values) into (key, value) pairs.
fn parse_json_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path)
        .map_err(|e| EnvSealError::CommandFailed(format!("failed to read file: {e}")))?;

    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
        .map_err(|e| EnvSealError::CommandFailed(format!("invalid JSON: {e}")))?;

    map.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            serde_json::Value::Number(_) | serde_json::Value::Bool(_) => {
                Ok((key, value.to_string()))
            }
            _ => Err(EnvSealError::CommandFailed(format!(
                "value for '{key}' must be a string, number or boolean"
            ))),
        })
        .collect()
}
