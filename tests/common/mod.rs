//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub const PRODUCT_ID: &str = "0123456789abcdef0123456789abcdef";
pub const DEPLOYMENT_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const OTHER_DEPLOYMENT_ID: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const SANDBOX_ID: &str = "11111111111111111111111111111111";
pub const PRE_PRODUCTION_SANDBOX: &str = "p-abcdefghijklmnopqrstuvwxyz0123";
pub const ENCRYPTION_KEY: &str = "1111111111111111111111111111111111111111111111111111111111111111";

/// Helper to get an eoscfg command, isolated from the caller's environment
pub fn eoscfg() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("eoscfg"));
    cmd.env_remove("EOSCFG_DIR").env_remove("EOSCFG_LOG");
    cmd
}

/// Helper to get an eoscfg command pointed at a config directory
pub fn eoscfg_in(tmp: &TempDir) -> Command {
    let mut cmd = eoscfg();
    cmd.arg("--dir").arg(tmp.path());
    cmd
}

/// Helper to create a config directory with a named product
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    eoscfg_in(&tmp)
        .args(["init", "--name", "Test Game", "--product-id", PRODUCT_ID])
        .assert()
        .success();
    tmp
}

pub fn add_client(tmp: &TempDir, name: &str, client_id: &str) {
    eoscfg_in(tmp)
        .args([
            "client",
            "add",
            "--name",
            name,
            "--client-id",
            client_id,
            "--client-secret",
            "secret",
        ])
        .assert()
        .success();
}

pub fn add_deployment(tmp: &TempDir, name: &str, deployment_id: &str, sandbox_id: &str) {
    eoscfg_in(tmp)
        .args([
            "deployment",
            "add",
            "--name",
            name,
            "--deployment-id",
            deployment_id,
            "--sandbox-id",
            sandbox_id,
        ])
        .assert()
        .success();
}

/// A project with one client and one deployment, both used on Windows
pub fn setup_assigned_project() -> TempDir {
    let tmp = setup_project();
    add_client(&tmp, "Game Client", "xyza7891");
    add_deployment(&tmp, "Live", DEPLOYMENT_ID, SANDBOX_ID);
    eoscfg_in(&tmp)
        .args([
            "platform",
            "assign",
            "windows",
            "--deployment",
            "Live",
            "--client",
            "Game Client",
        ])
        .assert()
        .success();
    tmp
}

pub fn read_json(tmp: &TempDir, file: &str) -> Value {
    let content = std::fs::read_to_string(tmp.path().join(file)).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn write_file(tmp: &TempDir, file: &str, content: &str) {
    std::fs::write(tmp.path().join(file), content).unwrap();
}

/// Run a command with `--format json` and parse its stdout
pub fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--format").arg("json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
