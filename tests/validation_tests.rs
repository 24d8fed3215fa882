//! `eoscfg validate` tests

mod common;

use common::{
    add_deployment, eoscfg_in, json_output, read_json, setup_assigned_project, setup_project,
    write_file, OTHER_DEPLOYMENT_ID, PRODUCT_ID, SANDBOX_ID,
};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Every issue reported for `file` by `validate --format json`
fn issues_for(report: &Value, file: &str) -> Vec<Value> {
    report
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["file"] == file)
        .map(|r| r["issues"].as_array().unwrap().clone())
        .unwrap_or_default()
}

#[test]
fn test_fresh_project_passes_with_warnings() {
    let tmp = setup_project();

    eoscfg_in(&tmp)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed validation"))
        .stdout(predicate::str::contains("Files checked:  6"));

    // Unassigned platforms only warn, which strict mode refuses
    eoscfg_in(&tmp)
        .args(["validate", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("5 files have errors"));
}

#[test]
fn test_assigned_platform_is_clean() {
    let tmp = setup_assigned_project();

    let output = eoscfg_in(&tmp)
        .args(["validate", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert!(issues_for(&report, "eos_product_config.json").is_empty());
    assert!(issues_for(&report, "eos_windows_config.json").is_empty());

    let linux = issues_for(&report, "eos_linux_config.json");
    assert!(!linux.is_empty());
    assert!(linux.iter().all(|i| i["severity"] == "warning"));
}

#[test]
fn test_empty_product_name_is_an_error() {
    let tmp = TempDir::new().unwrap();
    eoscfg_in(&tmp)
        .args(["init", "--platform", "linux"])
        .assert()
        .success();

    eoscfg_in(&tmp)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("/ProductName"))
        .stdout(predicate::str::contains("at least 1 characters"));
}

#[test]
fn test_undefined_deployment_is_an_error() {
    let tmp = setup_assigned_project();
    add_deployment(&tmp, "Staging", OTHER_DEPLOYMENT_ID, SANDBOX_ID);
    eoscfg_in(&tmp)
        .args(["platform", "assign", "linux", "--deployment", "Staging"])
        .assert()
        .success();
    eoscfg_in(&tmp)
        .args(["deployment", "remove", "Staging"])
        .assert()
        .failure();

    // Edit the product behind the tool's back
    let product = std::fs::read_to_string(tmp.path().join("eos_product_config.json")).unwrap();
    let mut product: Value = serde_json::from_str(&product).unwrap();
    product["Environments"]["Deployments"]
        .as_array_mut()
        .unwrap()
        .retain(|d| d["Name"] != "Staging");
    write_file(&tmp, "eos_product_config.json", &product.to_string());

    let output = eoscfg_in(&tmp)
        .args(["validate", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let linux = issues_for(&report, "eos_linux_config.json");
    assert!(linux
        .iter()
        .any(|i| i["path"] == "/deployment/DeploymentId" && i["severity"] == "error"));
}

#[test]
fn test_syntax_error_is_reported_with_file() {
    let tmp = setup_project();
    write_file(&tmp, "eos_linux_config.json", "{ \"isServer\": tru }");

    eoscfg_in(&tmp)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("eos_linux_config.json"))
        .stderr(predicate::str::contains("1 file has errors"));
}

#[test]
fn test_schema_type_errors() {
    let tmp = setup_project();
    write_file(
        &tmp,
        "eos_windows_config.json",
        r#"{"isServer": "yes", "tickBudgetInMilliseconds": -1, "overrideCountryCode": "USA"}"#,
    );

    let output = eoscfg_in(&tmp)
        .args(["validate", "--format", "json"])
        .output()
        .unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<String> = issues_for(&report, "eos_windows_config.json")
        .iter()
        .filter(|i| i["severity"] == "error")
        .map(|i| i["path"].as_str().unwrap().to_string())
        .collect();

    assert!(paths.contains(&"/isServer".to_string()), "{:?}", paths);
    assert!(paths.contains(&"/tickBudgetInMilliseconds".to_string()), "{:?}", paths);
    assert!(paths.contains(&"/overrideCountryCode".to_string()), "{:?}", paths);
}

#[test]
fn test_unknown_flags_warn() {
    let tmp = setup_assigned_project();
    let windows = std::fs::read_to_string(tmp.path().join("eos_windows_config.json")).unwrap();
    let mut windows: Value = serde_json::from_str(&windows).unwrap();
    windows["platformOptionsFlags"] = serde_json::json!(["LoadingInEditor", "Turbo"]);
    write_file(&tmp, "eos_windows_config.json", &windows.to_string());

    let report = json_output(eoscfg_in(&tmp).arg("validate"));
    let issues = issues_for(&report, "eos_windows_config.json");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["severity"], "warning");
    assert!(issues[0]["message"].as_str().unwrap().contains("Turbo"));
}

#[test]
fn test_legacy_only_directory_warns() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp,
        "EpicOnlineServicesConfig.json",
        r#"{"productName": "Legacy"}"#,
    );

    eoscfg_in(&tmp)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("eoscfg migrate"));
}

#[test]
fn test_validate_without_config_fails() {
    let tmp = TempDir::new().unwrap();

    eoscfg_in(&tmp)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("eos_product_config.json"));
}

/// A product config as the editor writes it, with unset strings as null
fn product_with_nulls(product_name: &str) -> String {
    format!(
        r#"{{
  "schemaVersion": "1.0",
  "ProductName": {},
  "ProductId": "{}",
  "ProductVersion": null,
  "imported": true,
  "Clients": [
    {{"Name": "Client", "Value": {{"ClientId": "xyza7891", "ClientSecret": "secret", "EncryptionKey": null}}}}
  ],
  "Environments": {{"Deployments": [], "Sandboxes": []}}
}}"#,
        product_name, PRODUCT_ID
    )
}

#[test]
fn test_null_product_strings_load_and_validate() {
    let tmp = setup_project();
    write_file(&tmp, "eos_product_config.json", &product_with_nulls(r#""Null Game""#));

    let report = json_output(eoscfg_in(&tmp).arg("validate"));
    let issues = issues_for(&report, "eos_product_config.json");
    assert!(issues.is_empty(), "{:?}", issues);
}

#[test]
fn test_null_product_name_is_an_error() {
    let tmp = setup_project();
    write_file(&tmp, "eos_product_config.json", &product_with_nulls("null"));

    let output = eoscfg_in(&tmp)
        .args(["validate", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let issues = issues_for(&report, "eos_product_config.json");
    assert!(issues
        .iter()
        .any(|i| i["path"] == "/ProductName" && i["severity"] == "error"));
}

#[test]
fn test_same_sandbox_spelled_twice_warns() {
    let tmp = setup_project();
    let mut product = read_json(&tmp, "eos_product_config.json");
    product["Environments"]["Sandboxes"] = serde_json::json!([
        {"Name": "Sandbox", "Value": {"Value": SANDBOX_ID}},
        {"Name": "Hyphenated", "Value": {"Value": "11111111-1111-1111-1111-111111111111"}}
    ]);
    write_file(&tmp, "eos_product_config.json", &product.to_string());

    let report = json_output(eoscfg_in(&tmp).arg("validate"));
    let issues = issues_for(&report, "eos_product_config.json");
    let duplicate = issues
        .iter()
        .find(|i| i["path"] == "/Environments/Sandboxes/1")
        .unwrap();
    assert_eq!(duplicate["severity"], "warning");
    assert!(duplicate["message"].as_str().unwrap().contains("Hyphenated"));
}
