//! Integration tests for the CLI binary.
//!
//! Runs the `idreg` binary against a temporary data directory. Passphrases
//! come from `IDREG_PASSPHRASE`.
//!
//! This test is registered as a [[test]] in the identity-registry-cli crate
//! so that CARGO_BIN_EXE_idreg is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `idreg` binary.
fn idreg_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_idreg"))
}

/// Run `idreg` with the given data directory and arguments.
fn idreg(data_dir: &Path, args: &[&str]) -> Output {
    idreg_binary()
        .env("IDREG_HOME", data_dir)
        .env("IDREG_PASSPHRASE", "test-passphrase")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute idreg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_ok(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} should succeed, stderr: {}",
        stderr(output)
    );
}

#[test]
fn cli_responds_to_help() {
    let output = idreg_binary()
        .arg("--help")
        .output()
        .expect("failed to execute idreg --help");

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(
        stdout.contains("Usage") && stdout.contains("deploy"),
        "idreg --help output should list commands, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = idreg_binary()
        .arg("--version")
        .output()
        .expect("failed to execute idreg --version");

    assert!(output.status.success());
    assert!(stdout(&output).contains("0.1"));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = idreg_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute idreg");

    assert!(
        !output.status.success(),
        "idreg with unknown flag should exit with non-zero status"
    );
}

#[test]
fn cli_unknown_network_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = idreg(dir.path(), &["--network", "mainnet", "owner"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown network"));
}

#[test]
fn cli_account_new_and_list() {
    let dir = tempfile::tempdir().unwrap();

    let output = idreg(dir.path(), &["account", "new", "alice"]);
    assert_ok(&output, "account new");
    assert!(stdout(&output).contains("Address: 0x"));

    let duplicate = idreg(dir.path(), &["account", "new", "alice"]);
    assert!(!duplicate.status.success());
    assert!(stderr(&duplicate).contains("already exists"));

    let output = idreg(dir.path(), &["account", "list"]);
    assert_ok(&output, "account list");
    assert!(stdout(&output).contains("alice"));
}

#[test]
fn cli_deploy_on_hardhat() {
    let dir = tempfile::tempdir().unwrap();
    assert_ok(&idreg(dir.path(), &["account", "new"]), "account new");

    let output = idreg(dir.path(), &["--network", "hardhat", "deploy"]);
    assert_ok(&output, "deploy");
    let out = stdout(&output);
    assert!(out.contains("Registry deployed"));
    assert!(out.contains("Deployer is authorized verifier: false"));
    assert!(dir.path().join("deployments").join("hardhat.json").exists());
}

#[test]
fn cli_deploy_unfunded_prints_hint() {
    let dir = tempfile::tempdir().unwrap();
    assert_ok(&idreg(dir.path(), &["account", "new"]), "account new");

    let output = idreg(dir.path(), &["--network", "core_testnet2", "node", "init"]);
    assert_ok(&output, "node init");

    let output = idreg(dir.path(), &["--network", "core_testnet2", "deploy"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("warning: low balance"), "got: {err}");
    assert!(err.contains("error: deployment failed"), "got: {err}");
    assert!(err.contains("Add more ETH"), "got: {err}");
}

#[test]
fn cli_rejects_account_names_outside_keystore() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    assert_ok(&idreg(d, &["account", "new"]), "account new");

    let show = idreg(d, &["account", "show", "../outside"]);
    assert!(!show.status.success());
    assert!(stderr(&show).contains("must be 1-64 characters"));

    let signer = idreg(d, &["--account", "../outside", "--network", "hardhat", "deploy"]);
    assert!(!signer.status.success());
    assert!(stderr(&signer).contains("must be 1-64 characters"));

    let subject = idreg(d, &["--network", "hardhat", "verifier", "check", "../outside"]);
    assert!(!subject.status.success());
    assert!(stderr(&subject).contains("neither an address nor an account name"));
}

#[test]
fn cli_lists_deployments() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();

    let empty = idreg(d, &["deployments"]);
    assert_ok(&empty, "deployments");
    assert!(stdout(&empty).contains("No deployments recorded"));

    assert_ok(&idreg(d, &["account", "new"]), "account new");
    assert_ok(&idreg(d, &["node", "init"]), "node init");
    assert_ok(&idreg(d, &["deploy"]), "deploy");
    assert_ok(&idreg(d, &["--network", "hardhat", "deploy"]), "deploy");

    let list = idreg(d, &["deployments"]);
    assert_ok(&list, "deployments");
    let out = stdout(&list);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2, "got: {out}");
    assert!(lines[0].starts_with("hardhat"));
    assert!(lines[1].starts_with("localhost"));
}

#[test]
fn cli_missing_ledger_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert_ok(&idreg(dir.path(), &["account", "new"]), "account new");

    let output = idreg(dir.path(), &["deploy"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("node init"));
}

#[test]
fn cli_full_verification_flow_on_localhost() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();

    for name in ["default", "alice", "verifier"] {
        assert_ok(&idreg(d, &["account", "new", name]), "account new");
    }
    assert_ok(&idreg(d, &["node", "init"]), "node init");
    assert_ok(&idreg(d, &["deploy"]), "deploy");

    let owner = idreg(d, &["owner"]);
    assert_ok(&owner, "owner");
    assert!(stdout(&owner).starts_with("0x"));

    let check = idreg(d, &["verifier", "check", "default"]);
    assert_ok(&check, "verifier check");
    assert_eq!(stdout(&check).trim(), "false");

    let alice = ["--account", "alice"];
    let run = |args: &[&str]| {
        let mut full: Vec<&str> = alice.to_vec();
        full.extend_from_slice(args);
        idreg(d, &full)
    };

    assert_ok(
        &run(&[
            "identity",
            "create",
            "--name",
            "John Doe",
            "--contact",
            "john@example.com",
        ]),
        "identity create",
    );
    let again = run(&["identity", "create", "--name", "x", "--contact", "y"]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("Already exists"));

    assert_ok(
        &run(&["credential", "add", "education", "--text", "diploma"]),
        "credential add",
    );
    assert_ok(
        &run(&["verification", "request", "education", "--text", "diploma"]),
        "verification request",
    );

    let pending = idreg(d, &["verification", "pending"]);
    assert_ok(&pending, "verification pending");
    assert!(stdout(&pending).contains("education"));

    // Not yet authorized.
    let denied = idreg(
        d,
        &["--account", "verifier", "verification", "resolve", "alice", "education", "approve"],
    );
    assert!(!denied.status.success());
    assert!(stderr(&denied).contains("not an authorized verifier"));

    assert_ok(&idreg(d, &["verifier", "set", "verifier"]), "verifier set");
    assert_ok(
        &idreg(
            d,
            &["--account", "verifier", "verification", "resolve", "alice", "education", "approve"],
        ),
        "verification resolve",
    );

    let show = idreg(d, &["verification", "show", "alice", "education"]);
    assert_ok(&show, "verification show");
    assert!(stdout(&show).contains("approved"));

    let list = idreg(d, &["credential", "list", "alice"]);
    assert_ok(&list, "credential list");
    assert!(stdout(&list).contains("verified: yes"));

    let again = idreg(
        d,
        &["--account", "verifier", "verification", "resolve", "alice", "education", "approve"],
    );
    assert!(!again.status.success());
    assert!(stderr(&again).contains("Not found"));
}
