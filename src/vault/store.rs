//! Reading, writing and finding vault documents on disk.
//!
//! Saves always replace the whole document.  The new bytes go to a
//! temporary file in the same directory which is then renamed over the
//! vault, so a crash mid-write leaves the previous vault intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::format::{KeyMode, VaultDocument, VAULT_FILE_NAME};
use crate::crypto::kdf::{generate_salt, ScryptParams};
use crate::errors::{EnvSealError, Result};

/// Create an empty vault in `dir` and return its path.
///
/// Passphrase vaults get a fresh random salt and record `params`; keyfile
/// vaults store neither.  Fails with `AlreadyExists` if `dir` already
/// holds a vault.
pub fn create(dir: &Path, key_mode: KeyMode, params: &ScryptParams) -> Result<PathBuf> {
    let path = dir.join(VAULT_FILE_NAME);
    if path.exists() {
        return Err(EnvSealError::AlreadyExists(path));
    }

    let document = match key_mode {
        KeyMode::Passphrase => VaultDocument::new_passphrase(generate_salt(), *params),
        KeyMode::Keyfile => VaultDocument::new_keyfile(),
    };

    save(&path, &document)?;
    debug!(path = %path.display(), %key_mode, "created vault");
    Ok(path)
}

/// Read and validate the vault at `path`.
///
/// Older format versions are upgraded in memory only; the file is
/// rewritten in the current format by the next `save`.
pub fn load(path: &Path) -> Result<VaultDocument> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EnvSealError::VaultNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let document = VaultDocument::parse(&bytes)?;
    if let Some(from) = document.migrated_from() {
        debug!(
            path = %path.display(),
            from,
            to = document.version(),
            "upgraded vault document in memory"
        );
    }
    Ok(document)
}

/// Serialize `document` and atomically replace the file at `path`.
///
/// Each call writes its own uniquely named temp file, so racing saves
/// resolve to whichever rename lands last.
pub fn save(path: &Path, document: &VaultDocument) -> Result<()> {
    let bytes = document.to_bytes()?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Dropping the temp file on any error path removes it.
    let mut tmp = tempfile::Builder::new()
        .prefix(".envseal-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    restrict_permissions(tmp.path())?;

    tmp.persist(path).map_err(|e| {
        warn!(path = %path.display(), error = %e.error, "could not replace vault");
        e.error
    })?;

    debug!(path = %path.display(), secrets = document.len(), "saved vault");
    Ok(())
}

/// Walk from `start_dir` up through its ancestors looking for a vault.
///
/// Returns the first match, or `None` once the filesystem root has been
/// checked.
pub fn locate(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(VAULT_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Restrict the file to its owner.  tempfile already creates it 0600 on
/// Unix; this keeps the guarantee explicit.
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
