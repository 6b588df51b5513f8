use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::ScryptParams;
use crate::errors::{EnvSealError, Result};

/// Project-level configuration, loaded from `.envseal.toml`.
///
/// Every field has a default so envseal works without any config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// scrypt cost exponent for new passphrase vaults (N = 2^log_n).
    #[serde(default = "default_scrypt_log_n")]
    pub scrypt_log_n: u8,

    /// scrypt block size.
    #[serde(default = "default_scrypt_r")]
    pub scrypt_r: u32,

    /// scrypt parallelism.
    #[serde(default = "default_scrypt_p")]
    pub scrypt_p: u32,

    /// Directory holding per-project key files (default: `~/.envseal/keys`).
    #[serde(default)]
    pub keys_dir: Option<PathBuf>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_scrypt_log_n() -> u8 {
    15
}

fn default_scrypt_r() -> u32 {
    8
}

fn default_scrypt_p() -> u32 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            scrypt_log_n: default_scrypt_log_n(),
            scrypt_r: default_scrypt_r(),
            scrypt_p: default_scrypt_p(),
            keys_dir: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for next to the vault.
    pub const FILE_NAME: &'static str = ".envseal.toml";

    /// Load settings from `<project_dir>/.envseal.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            EnvSealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the scrypt settings into crypto-layer params.
    ///
    /// Settings below the 32 MiB working-set floor are rejected.
    pub fn scrypt_params(&self) -> Result<ScryptParams> {
        ScryptParams::new(self.scrypt_log_n, self.scrypt_r, self.scrypt_p)
    }

    /// Directory searched for `<project>.key` files.
    ///
    /// A relative `keys_dir` is taken relative to `project_dir`.  Returns
    /// `None` when no keys dir is configured and the home directory is
    /// unknown.
    pub fn keys_dir(&self, project_dir: &Path) -> Option<PathBuf> {
        match &self.keys_dir {
            Some(dir) if dir.is_absolute() => Some(dir.clone()),
            Some(dir) => Some(project_dir.join(dir)),
            None => dirs::home_dir().map(|home| home.join(".envseal").join("keys")),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
