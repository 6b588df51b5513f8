//! `envseal init` — create a new vault.

use std::path::{Path, PathBuf};

use crate::cli::output;
use crate::cli::{default_key_path, find_key, Cli};
use crate::config::Settings;
use crate::crypto::keyfile::generate_keyfile;
use crate::crypto::kdf::ScryptParams;
use crate::crypto::keys::VaultKey;
use crate::errors::{EnvSealError, Result};
use crate::vault::{create, KeyMode, VAULT_FILE_NAME};

/// Execute the `init` command.
pub fn execute(cli: &Cli, keyfile: bool) -> Result<()> {
    let dir = target_dir(cli)?;
    let existing = dir.join(VAULT_FILE_NAME);
    if existing.exists() {
        output::tip("Use `envseal set` to add secrets to the existing vault.");
        return Err(EnvSealError::AlreadyExists(existing));
    }
    let settings = Settings::load(&dir)?;

    let key_mode = if keyfile {
        KeyMode::Keyfile
    } else {
        KeyMode::Passphrase
    };
    let params = match key_mode {
        KeyMode::Passphrase => settings.scrypt_params()?,
        KeyMode::Keyfile => ScryptParams::default(),
    };

    // 1. Keyfile vaults need a usable key before the vault file exists.
    if key_mode == KeyMode::Keyfile {
        ensure_key(cli, &settings, &dir, &existing)?;
    }

    // 2. Create the vault file.
    let vault_path = create(&dir, key_mode, &params)?;
    output::success(&format!(
        "Vault created at {} ({key_mode} mode)",
        vault_path.display()
    ));

    output::tip("Run `envseal set <KEY>` to add a secret.");
    output::tip("Run `envseal run -- <command>` to inject secrets into a command.");

    Ok(())
}

/// Check the key the vault will be opened with, or generate one at the
/// project's default key location when none can be found.
fn ensure_key(cli: &Cli, settings: &Settings, dir: &Path, vault_path: &Path) -> Result<()> {
    if let Some(bytes) = find_key(cli, vault_path)? {
        let key = VaultKey::from_slice(&bytes)?;
        output::info(&format!("Using existing key {}", key.fingerprint()));
        return Ok(());
    }

    let key_path = default_key_path(settings, dir).ok_or_else(|| {
        EnvSealError::KeyfileError(
            "cannot determine a key location; run `envseal keygen <PATH>`".into(),
        )
    })?;
    let key = generate_keyfile(&key_path, false)?;
    output::success(&format!(
        "Generated key {} at {}",
        key.fingerprint(),
        key_path.display()
    ));
    output::warning("Back up this key file. Secrets cannot be recovered without it.");
    Ok(())
}

/// Directory the vault is created in: `--vault` (a directory, or a path
/// ending in the vault file name) or the current directory.
fn target_dir(cli: &Cli) -> Result<PathBuf> {
    let Some(path) = &cli.vault else {
        return Ok(std::env::current_dir()?);
    };

    if path.is_dir() {
        return Ok(path.clone());
    }
    if path.file_name().is_some_and(|n| n == VAULT_FILE_NAME) {
        let parent = path.parent().unwrap_or(Path::new("."));
        if parent.as_os_str().is_empty() {
            return Ok(PathBuf::from("."));
        }
        return Ok(parent.to_path_buf());
    }

    Err(EnvSealError::CommandFailed(format!(
        "init creates {VAULT_FILE_NAME}; pass its directory instead of {}",
        path.display()
    )))
}
