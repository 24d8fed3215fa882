//! Legacy config migration tests

mod common;

use common::{eoscfg_in, json_output, read_json, write_file, DEPLOYMENT_ID, PRODUCT_ID, SANDBOX_ID};
use predicates::prelude::*;
use tempfile::TempDir;

const OVERRIDE_DEPLOYMENT: &str = "cccccccc-cccc-cccc-cccc-cccccccccccc";
const OVERRIDE_SANDBOX: &str = "p-abcdefghijklmnopqrstuvwxyz0123";

fn legacy_config() -> String {
    format!(
        r#"{{
    "productName": "Legacy Game",
    "productVersion": "0.9",
    "productID": "{}",
    "sandboxID": "{}",
    "deploymentID": "{}",
    "clientID": "legacy-client",
    "clientSecret": "legacy-secret",
    "sandboxDeploymentOverrides": [
        {{ "sandboxID": "{}", "deploymentID": "{}" }}
    ]
}}"#,
        PRODUCT_ID, SANDBOX_ID, DEPLOYMENT_ID, OVERRIDE_SANDBOX, OVERRIDE_DEPLOYMENT
    )
}

fn setup_legacy_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "EpicOnlineServicesConfig.json", &legacy_config());
    tmp
}

#[test]
fn test_migrate_legacy_only_directory() {
    let tmp = setup_legacy_project();

    eoscfg_in(&tmp)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 client(s), 2 deployment(s)"))
        .stdout(predicate::str::contains("Wrote"));

    let product = read_json(&tmp, "eos_product_config.json");
    assert_eq!(product["ProductName"], "Legacy Game");
    assert_eq!(product["ProductVersion"], "0.9");
    assert_eq!(product["ProductId"], PRODUCT_ID);
    assert_eq!(product["imported"], true);
    assert_eq!(product["schemaVersion"], "1.0");
    assert_eq!(product["Clients"][0]["Value"]["ClientId"], "legacy-client");

    let deployments = product["Environments"]["Deployments"].as_array().unwrap();
    assert_eq!(deployments.len(), 2);
    assert_eq!(deployments[1]["Value"]["DeploymentId"], "cccccccccccccccccccccccccccccccc");
    assert_eq!(deployments[1]["Value"]["SandboxId"]["Value"], OVERRIDE_SANDBOX);

    let sandboxes = product["Environments"]["Sandboxes"].as_array().unwrap();
    assert_eq!(sandboxes.len(), 2);

    // The legacy file is left in place
    assert!(tmp.path().join("EpicOnlineServicesConfig.json").is_file());
}

#[test]
fn test_migrate_is_idempotent() {
    let tmp = setup_legacy_project();
    eoscfg_in(&tmp).arg("migrate").assert().success();
    let first = read_json(&tmp, "eos_product_config.json");

    eoscfg_in(&tmp)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("already at version 1.0"));

    assert_eq!(read_json(&tmp, "eos_product_config.json"), first);
}

#[test]
fn test_migrate_force_reimports_without_duplicates() {
    let tmp = setup_legacy_project();
    eoscfg_in(&tmp).arg("migrate").assert().success();

    eoscfg_in(&tmp)
        .args(["migrate", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 client(s), 0 deployment(s)"))
        .stdout(predicate::str::contains("already defined"));

    let product = read_json(&tmp, "eos_product_config.json");
    assert_eq!(product["Clients"].as_array().unwrap().len(), 1);
    assert_eq!(product["Environments"]["Deployments"].as_array().unwrap().len(), 2);
}

#[test]
fn test_migrate_dry_run_writes_nothing() {
    let tmp = setup_legacy_project();

    eoscfg_in(&tmp)
        .args(["migrate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!tmp.path().join("eos_product_config.json").exists());
}

#[test]
fn test_migrate_reports_unusable_values() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp,
        "EpicOnlineServicesConfig.json",
        r#"{
            "productName": "Partial",
            "productID": "not-a-guid",
            "sandboxDeploymentOverrides": [
                { "sandboxID": "bad sandbox", "deploymentID": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa" }
            ]
        }"#,
    );

    eoscfg_in(&tmp)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not parse product ID 'not-a-guid'"))
        .stdout(predicate::str::contains("sandbox deployment override #1"));

    let product = read_json(&tmp, "eos_product_config.json");
    assert_eq!(product["ProductName"], "Partial");
    assert_eq!(product["ProductId"], "00000000000000000000000000000000");
    assert!(product["Environments"]["Deployments"].as_array().unwrap().is_empty());
}

#[test]
fn test_outdated_product_without_legacy_is_stamped() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "eos_product_config.json", r#"{"ProductName": "Old", "Clients": []}"#);

    eoscfg_in(&tmp)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("updating version only"));

    let product = read_json(&tmp, "eos_product_config.json");
    assert_eq!(product["ProductName"], "Old");
    assert_eq!(product["schemaVersion"], "1.0");
    assert_eq!(product["imported"], true);
}

#[test]
fn test_editing_imports_legacy_first() {
    let tmp = setup_legacy_project();

    eoscfg_in(&tmp)
        .args(["client", "add", "--name", "New", "--client-id", "new-id", "--client-secret", "s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported legacy config"));

    let clients = json_output(eoscfg_in(&tmp).args(["client", "list"]));
    let names: Vec<&str> = clients
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Client", "New"]);

    // Already imported, so a second edit reports nothing
    eoscfg_in(&tmp)
        .args(["client", "rename", "New", "Newer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported legacy config").not());
}

#[test]
fn test_migrate_force_requires_legacy_file() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "eos_product_config.json", "{}");

    eoscfg_in(&tmp)
        .args(["migrate", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No EpicOnlineServicesConfig.json"));
}

#[test]
fn test_migrate_without_any_config_fails() {
    let tmp = TempDir::new().unwrap();

    eoscfg_in(&tmp).arg("migrate").assert().failure();
}
