//! `envseal run` — inject secrets into a child process.

use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::cli::{acquire_credential, vault_path, Cli};
use crate::errors::{EnvSealError, Result};
use crate::vault::{open_all, VaultService};

/// Execute the `run` command.
pub fn execute(cli: &Cli, command: &[String], no_override: bool, clean_env: bool) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(EnvSealError::NoCommandSpecified);
    };

    let path = vault_path(cli)?;
    let document = VaultService::new(&path).load()?;
    let credential = acquire_credential(cli, &path, document.key_mode(), false)?;

    // Decrypt all secrets into memory.
    let secrets = open_all(&document, &credential)?;

    let mut cmd = Command::new(program);
    cmd.args(args);

    if clean_env {
        // Start with a completely empty environment, only vault secrets.
        cmd.env_clear();
    }

    let mut injected = 0;
    for (name, value) in &secrets {
        if no_override && !clean_env && std::env::var_os(name).is_some() {
            debug!(name = %name, "keeping inherited value");
            continue;
        }
        cmd.env(name, value);
        injected += 1;
    }
    debug!(program = %program, injected, clean_env, "starting child process");

    let status = cmd
        .status()
        .map_err(|e| EnvSealError::CommandFailed(format!("failed to run '{program}': {e}")))?;

    // Forward the child's exit code.
    match exit_code(status) {
        0 => Ok(()),
        code => Err(EnvSealError::ChildProcessFailed(code)),
    }
}

/// The exit code to report for a finished child: its own code, or
/// `128 + signal` on Unix when it was killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn exit_code_passes_through_normal_exit() {
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
    }

    #[test]
    fn exit_code_maps_signals() {
        // Raw wait status 9 = killed by SIGKILL.
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
