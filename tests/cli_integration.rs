//! Integration tests for the envseal CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Credentials come from `ENVSEAL_PASSPHRASE` / `ENVSEAL_KEY` so no test
//! ever reaches an interactive prompt, and `HOME` points into the temp
//! dir so default key locations never touch the real home directory.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASS: &str = "correct horse battery";

/// Helper: a Command for the envseal binary with a scrubbed environment,
/// running inside `dir`.
fn envseal(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("envseal").expect("binary should exist");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path().join("home"))
        .env_remove("ENVSEAL_PASSPHRASE")
        .env_remove("ENVSEAL_KEY")
        .env_remove("ENVSEAL_KEY_FILE")
        .env_remove("ENVSEAL_LOG");
    cmd
}

/// Helper: an envseal Command with the passphrase set.
fn with_pass(dir: &TempDir) -> Command {
    let mut cmd = envseal(dir);
    cmd.env("ENVSEAL_PASSPHRASE", PASS);
    cmd
}

fn init_passphrase_vault() -> TempDir {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp).arg("init").assert().success();
    tmp
}

// ---------------------------------------------------------------------------
// Help and usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secrets vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("rm"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("keygen"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("envseal"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn run_with_no_command_fails() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp).arg("run").assert().failure();
}

// ---------------------------------------------------------------------------
// Passphrase vaults
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_file() {
    let tmp = init_passphrase_vault();
    tmp.child(".envseal.vault")
        .assert(predicate::str::contains("\"keyMode\": \"passphrase\""));
}

#[test]
fn init_twice_fails() {
    let tmp = init_passphrase_vault();
    envseal(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn set_get_list_rm_lifecycle() {
    let tmp = init_passphrase_vault();

    with_pass(&tmp)
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    with_pass(&tmp)
        .args(["get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");

    envseal(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout("API_KEY\n");

    envseal(&tmp)
        .args(["rm", "API_KEY", "--force"])
        .assert()
        .success();

    envseal(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("API_KEY").not());
}

#[test]
fn set_reads_piped_stdin() {
    let tmp = init_passphrase_vault();

    with_pass(&tmp)
        .args(["set", "TOKEN"])
        .write_stdin("from-stdin\n")
        .assert()
        .success();

    with_pass(&tmp)
        .args(["get", "TOKEN"])
        .assert()
        .success()
        .stdout("from-stdin\n");
}

#[test]
fn vault_is_found_from_subdirectory() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    let nested = tmp.child("src/deep");
    nested.create_dir_all().unwrap();

    let mut cmd = with_pass(&tmp);
    cmd.current_dir(nested.path())
        .args(["get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn wrong_passphrase_fails() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    envseal(&tmp)
        .env("ENVSEAL_PASSPHRASE", "not the passphrase")
        .args(["get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong credential"));
}

#[test]
fn get_missing_secret_fails() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["get", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Secret 'NOPE' not found"));
}

#[test]
fn get_without_vault_fails() {
    let tmp = TempDir::new().unwrap();
    with_pass(&tmp)
        .args(["--vault", tmp.path().to_str().unwrap(), "get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vault not found"));
}

#[test]
fn invalid_secret_name_is_rejected() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "BAD NAME", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid secret name"));
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[test]
fn import_env_then_export_json() {
    let tmp = init_passphrase_vault();
    tmp.child("seed.env")
        .write_str("# comment\nexport API_KEY=abc123\nGREETING=\"hello world\"\n")
        .unwrap();

    with_pass(&tmp)
        .args(["import", "seed.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 secrets"));

    let output = with_pass(&tmp)
        .args(["export", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let exported: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        exported,
        serde_json::json!({ "API_KEY": "abc123", "GREETING": "hello world" })
    );
}

#[test]
fn export_env_to_file() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "GREETING", "hello world"])
        .assert()
        .success();

    with_pass(&tmp)
        .args(["export", "-o", "out.env"])
        .assert()
        .success();

    tmp.child("out.env").assert("GREETING=\"hello world\"\n");
}

#[test]
fn export_refuses_to_overwrite_vault_files() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["export", "-o", "backup.vault"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing"));
}

// ---------------------------------------------------------------------------
// Keyfile vaults
// ---------------------------------------------------------------------------

#[test]
fn keyfile_init_generates_key_in_home() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.child("myapp");
    project.create_dir_all().unwrap();

    let mut cmd = envseal(&tmp);
    cmd.current_dir(project.path())
        .args(["init", "--keyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated key"));

    tmp.child("home/.envseal/keys/myapp.key")
        .assert(predicate::path::is_file());

    // The generated key is found again without any flags.
    let mut cmd = envseal(&tmp);
    cmd.current_dir(project.path())
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    let mut cmd = envseal(&tmp);
    cmd.current_dir(project.path())
        .args(["get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn keyfile_vault_with_explicit_key_file() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .args(["keygen", "team.key"])
        .assert()
        .success();

    envseal(&tmp)
        .args(["--key-file", "team.key", "init", "--keyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using existing key"));

    envseal(&tmp)
        .env("ENVSEAL_KEY_FILE", "team.key")
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    envseal(&tmp)
        .args(["--key-file", "team.key", "get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn keyfile_vault_rejects_a_different_key() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp).args(["keygen", "a.key"]).assert().success();
    envseal(&tmp).args(["keygen", "b.key"]).assert().success();

    envseal(&tmp)
        .args(["--key-file", "a.key", "init", "--keyfile"])
        .assert()
        .success();
    envseal(&tmp)
        .args(["--key-file", "a.key", "set", "API_KEY", "abc123"])
        .assert()
        .success();

    envseal(&tmp)
        .args(["--key-file", "b.key", "get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong credential"));
}

#[test]
fn keyfile_vault_accepts_base64_key_from_env() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp).args(["keygen", "k.key"]).assert().success();
    let key_text = std::fs::read_to_string(tmp.child("k.key").path()).unwrap();

    envseal(&tmp)
        .env("ENVSEAL_KEY", key_text.trim())
        .args(["init", "--keyfile"])
        .assert()
        .success();
    envseal(&tmp)
        .env("ENVSEAL_KEY", key_text.trim())
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    envseal(&tmp)
        .args(["--key-file", "k.key", "get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn keyfile_init_with_missing_key_file_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .args(["--key-file", "missing.key", "init", "--keyfile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyfile not found"));
    tmp.child(".envseal.vault")
        .assert(predicate::path::missing());

    // Once the key exists, the same init goes through.
    envseal(&tmp).args(["keygen", "missing.key"]).assert().success();
    envseal(&tmp)
        .args(["--key-file", "missing.key", "init", "--keyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using existing key"));
    tmp.child(".envseal.vault").assert(predicate::path::is_file());
}

#[test]
fn keyfile_init_rejects_short_key() {
    let tmp = TempDir::new().unwrap();
    // 16 zero bytes, base64.
    tmp.child("short.key")
        .write_str("AAAAAAAAAAAAAAAAAAAAAA==\n")
        .unwrap();

    envseal(&tmp)
        .args(["--key-file", "short.key", "init", "--keyfile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key length"))
        .stdout(predicate::str::contains("Using existing key").not());
    tmp.child(".envseal.vault")
        .assert(predicate::path::missing());
}

#[test]
fn local_key_file_is_found_from_nested_directory() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp)
        .args(["keygen", ".envseal.key"])
        .assert()
        .success();
    envseal(&tmp)
        .args(["init", "--keyfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Using existing key"));

    let nested = tmp.child("app");
    nested.create_dir_all().unwrap();

    let mut cmd = envseal(&tmp);
    cmd.current_dir(nested.path())
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    envseal(&tmp)
        .args(["get", "API_KEY"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn key_file_on_passphrase_vault_is_a_mismatch() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();
    envseal(&tmp).args(["keygen", "k.key"]).assert().success();

    envseal(&tmp)
        .args(["--key-file", "k.key", "get", "API_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("passphrase mode"));
}

#[test]
fn keygen_refuses_to_overwrite_without_force() {
    let tmp = TempDir::new().unwrap();
    envseal(&tmp).args(["keygen", "k.key"]).assert().success();

    envseal(&tmp)
        .args(["keygen", "k.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    envseal(&tmp)
        .args(["keygen", "k.key", "--force"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn run_injects_secrets() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "API_KEY", "abc123"])
        .assert()
        .success();

    with_pass(&tmp)
        .args(["run", "--", "sh", "-c", "printf %s \"$API_KEY\""])
        .assert()
        .success()
        .stdout("abc123");
}

#[cfg(unix)]
#[test]
fn run_overrides_inherited_values_unless_told_not_to() {
    let tmp = init_passphrase_vault();
    with_pass(&tmp)
        .args(["set", "API_KEY", "from-vault"])
        .assert()
        .success();

    with_pass(&tmp)
        .env("API_KEY", "inherited")
        .args(["run", "--", "sh", "-c", "printf %s \"$API_KEY\""])
        .assert()
        .success()
        .stdout("from-vault");

    with_pass(&tmp)
        .env("API_KEY", "inherited")
        .args(["run", "--no-override", "--", "sh", "-c", "printf %s \"$API_KEY\""])
        .assert()
        .success()
        .stdout("inherited");
}

#[cfg(unix)]
#[test]
fn run_forwards_child_exit_code() {
    let tmp = init_passphrase_vault();

    with_pass(&tmp)
        .args(["run", "--", "sh", "-c", "exit 7"])
        .assert()
        .code(7);
}
