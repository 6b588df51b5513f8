//! `envseal keygen` — write a fresh random key file.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::default_key_path;
use crate::config::Settings;
use crate::crypto::keyfile::generate_keyfile;
use crate::errors::{EnvSealError, Result};

/// Execute the `keygen` command.
pub fn execute(path: Option<PathBuf>, force: bool) -> Result<()> {
    let key_path = match path {
        Some(p) => p,
        None => {
            let cwd = std::env::current_dir()?;
            let settings = Settings::load(&cwd)?;
            default_key_path(&settings, &cwd).ok_or_else(|| {
                EnvSealError::KeyfileError("cannot determine a key location; pass a path".into())
            })?
        }
    };

    let key = generate_keyfile(&key_path, force)?;

    output::success(&format!(
        "Key {} written to {}",
        key.fingerprint(),
        key_path.display()
    ));
    output::tip(&format!(
        "Point a keyfile vault at it: ENVSEAL_KEY_FILE={}",
        key_path.display()
    ));

    Ok(())
}
