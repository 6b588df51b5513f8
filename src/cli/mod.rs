//! CLI module — Clap argument parser, credential acquisition, output
//! helpers, and command implementations.

pub mod commands;
pub mod env_parser;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::keyfile::{decode_key, load_keyfile};
use crate::errors::{EnvSealError, Result};
use crate::vault::{locate, Credential, KeyMode, VAULT_FILE_NAME};

/// Minimum passphrase length for a vault's first secret.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Key file looked up next to the vault and in its ancestors.
pub const LOCAL_KEY_FILE: &str = ".envseal.key";

/// envseal CLI: local encrypted secrets vault.
#[derive(Parser)]
#[command(name = "envseal", about = "Local encrypted secrets vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file, or the directory holding it (default: search upward
    /// from the current directory)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Key file for keyfile-mode vaults
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault in the current directory
    Init {
        /// Use a random key file instead of a passphrase
        #[arg(long)]
        keyfile: bool,
    },

    /// Set a secret (add or update)
    Set {
        /// Secret name (e.g. DATABASE_URL)
        key: String,
        /// Secret value (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Print a secret's value
    Get {
        /// Secret name
        key: String,
    },

    /// List secret names
    List,

    /// Remove a secret
    Rm {
        /// Secret name
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Import secrets from a .env or JSON file
    Import {
        /// Path to the file to import
        file: PathBuf,

        /// Import format: env or json (default: from extension)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Export all secrets to stdout or a file
    Export {
        /// Output format: env (default) or json
        #[arg(short, long, default_value = "env")]
        format: String,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a command with secrets injected into its environment
    Run {
        /// Command and arguments (after --)
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,

        /// Keep inherited values for variables the vault also defines
        #[arg(long)]
        no_override: bool,

        /// Start with a clean environment (only vault secrets)
        #[arg(long)]
        clean_env: bool,
    },

    /// Generate a new random key file
    Keygen {
        /// Where to write the key (default: the project's key location)
        path: Option<PathBuf>,

        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault file from `--vault` or by searching upward from the
/// current directory.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.vault {
        if path.is_dir() {
            return Ok(path.join(VAULT_FILE_NAME));
        }
        return Ok(path.clone());
    }

    let cwd = std::env::current_dir()?;
    locate(&cwd).ok_or_else(|| EnvSealError::VaultNotFound(cwd.join(VAULT_FILE_NAME)))
}

/// Directory holding the vault: the project root for config and keys.
pub fn project_dir(vault_path: &Path) -> PathBuf {
    match vault_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Default key location for a project: `<keys_dir>/<project>.key`.
pub fn default_key_path(settings: &Settings, project_dir: &Path) -> Option<PathBuf> {
    let canonical = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());
    let project = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default".to_string());

    settings
        .keys_dir(project_dir)
        .map(|dir| dir.join(format!("{project}.key")))
}

/// Find raw key bytes for a keyfile vault, first hit wins:
///
/// 1. `--key-file`
/// 2. `ENVSEAL_KEY` (base64)
/// 3. `ENVSEAL_KEY_FILE`
/// 4. `.envseal.key` in the vault directory or any ancestor
/// 5. `<keys_dir>/<project>.key`
pub fn find_key(cli: &Cli, vault_path: &Path) -> Result<Option<Zeroizing<Vec<u8>>>> {
    if let Some(path) = &cli.key_file {
        debug!(source = "--key-file", "using key file");
        return load_keyfile(path).map(Some);
    }

    if let Some(text) = non_empty_env("ENVSEAL_KEY") {
        debug!(source = "ENVSEAL_KEY", "using key from environment");
        return decode_key(&text).map(Some);
    }

    if let Some(path) = non_empty_env("ENVSEAL_KEY_FILE") {
        debug!(source = "ENVSEAL_KEY_FILE", "using key file");
        return load_keyfile(Path::new(path.as_str())).map(Some);
    }

    let project = project_dir(vault_path);
    if let Some(path) = project
        .ancestors()
        .map(|dir| dir.join(LOCAL_KEY_FILE))
        .find(|candidate| candidate.is_file())
    {
        debug!(path = %path.display(), "using local key file");
        return load_keyfile(&path).map(Some);
    }

    let settings = Settings::load(&project)?;
    if let Some(path) = default_key_path(&settings, &project).filter(|p| p.is_file()) {
        debug!(path = %path.display(), "using project key file");
        return load_keyfile(&path).map(Some);
    }

    Ok(None)
}

/// Acquire the credential for a vault of the given key mode.
///
/// `first_secret` asks for a confirmed, minimum-length passphrase since
/// the first value written fixes the passphrase for good.
pub fn acquire_credential(
    cli: &Cli,
    vault_path: &Path,
    key_mode: KeyMode,
    first_secret: bool,
) -> Result<Credential> {
    let (passphrase, key) = match key_mode {
        KeyMode::Keyfile => (None, find_key(cli, vault_path)?),
        // An explicit key file on a passphrase vault is passed through so
        // the mismatch is reported rather than silently ignored.
        KeyMode::Passphrase => match &cli.key_file {
            Some(path) => (None, Some(load_keyfile(path)?)),
            None if first_secret => (Some(prompt_new_passphrase()?), None),
            None => (Some(prompt_passphrase()?), None),
        },
    };

    Credential::from_parts(
        passphrase.as_deref().map(String::as_str),
        key.as_deref().map(Vec::as_slice),
    )
}

/// Get the vault passphrase from `ENVSEAL_PASSPHRASE` or an interactive
/// prompt.
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = non_empty_env("ENVSEAL_PASSPHRASE") {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .interact()
        .map_err(|e| EnvSealError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation.
///
/// `ENVSEAL_PASSPHRASE` is taken as-is for scripted use; the prompt
/// enforces a minimum length.
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = non_empty_env("ENVSEAL_PASSPHRASE") {
        return Ok(pw);
    }

    loop {
        let passphrase = dialoguer::Password::new()
            .with_prompt("Choose vault passphrase")
            .with_confirmation(
                "Confirm vault passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| EnvSealError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if passphrase.len() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(passphrase));
    }
}

fn non_empty_env(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Zeroizing::new)
}
