//! Importing the single-file config used by older plugin versions
//!
//! `EpicOnlineServicesConfig.json` held one client and one deployment, plus
//! a list of sandbox/deployment overrides. Migration folds all of it into the
//! product config's named sets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::ClientCredentials;
use super::environments::Deployment;
use super::product::ProductConfig;
use super::{Config, ConfigFile, CURRENT_SCHEMA_VERSION};
use crate::core::{SandboxId, Version};

/// A sandbox that uses a different deployment than the main one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxDeploymentOverride {
    #[serde(rename = "sandboxID", default)]
    pub sandbox_id: Option<String>,
    #[serde(rename = "deploymentID", default)]
    pub deployment_id: Option<String>,
}

/// The legacy config file. Every field is optional; old files are often
/// partially filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    #[serde(rename = "productVersion")]
    pub product_version: Option<String>,
    #[serde(rename = "productID")]
    pub product_id: Option<String>,
    #[serde(rename = "sandboxID")]
    pub sandbox_id: Option<String>,
    #[serde(rename = "deploymentID")]
    pub deployment_id: Option<String>,
    #[serde(rename = "clientID")]
    pub client_id: Option<String>,
    #[serde(rename = "clientSecret")]
    pub client_secret: Option<String>,
    #[serde(rename = "encryptionKey")]
    pub encryption_key: Option<String>,
    #[serde(rename = "sandboxDeploymentOverrides")]
    pub sandbox_deployment_overrides: Vec<SandboxDeploymentOverride>,
}

impl Config for LegacyConfig {
    // The legacy format predates schema versions
    fn schema_version(&self) -> Option<Version> {
        None
    }

    fn set_schema_version(&mut self, _version: Version) {}
}

impl ConfigFile for LegacyConfig {
    const FILE_NAME: &'static str = "EpicOnlineServicesConfig.json";
}

/// What a migration imported and what it had to leave behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub clients_imported: usize,
    pub deployments_imported: usize,
    pub warnings: Vec<String>,
}

impl MigrationReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

impl ProductConfig {
    /// Import a legacy config into this one and mark it as imported
    pub fn migrate_from(&mut self, legacy: &LegacyConfig) -> MigrationReport {
        let mut report = MigrationReport::default();

        self.migrate_product(legacy, &mut report);
        self.migrate_client(legacy, &mut report);

        if let Some(deployment) = parse_deployment(
            legacy.deployment_id.as_deref(),
            legacy.sandbox_id.as_deref(),
            "main deployment",
            &mut report,
        ) {
            if self.environments.add_deployment(deployment) {
                report.deployments_imported += 1;
            } else {
                report.warn("Could not import the main deployment: it is already defined".to_string());
            }
        }

        for (index, entry) in legacy.sandbox_deployment_overrides.iter().enumerate() {
            let label = format!("sandbox deployment override #{}", index + 1);
            let Some(deployment) = parse_deployment(
                entry.deployment_id.as_deref(),
                entry.sandbox_id.as_deref(),
                &label,
                &mut report,
            ) else {
                continue;
            };

            if self.environments.add_deployment(deployment) {
                report.deployments_imported += 1;
            } else {
                tracing::debug!("{} duplicates an existing deployment", label);
            }
        }

        self.imported = true;
        self.set_schema_version(CURRENT_SCHEMA_VERSION);
        report
    }

    fn migrate_product(&mut self, legacy: &LegacyConfig, report: &mut MigrationReport) {
        if let Some(name) = &legacy.product_name {
            self.product_name = name.clone();
        }
        if let Some(version) = &legacy.product_version {
            self.product_version = version.clone();
        }

        match legacy.product_id.as_deref().map(str::trim) {
            None | Some("") => {}
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => self.product_id = id,
                Err(_) => report.warn(format!("Could not parse product ID '{}'", raw)),
            },
        }
    }

    fn migrate_client(&mut self, legacy: &LegacyConfig, report: &mut MigrationReport) {
        let credentials = ClientCredentials::new(
            legacy.client_id.clone().unwrap_or_default(),
            legacy.client_secret.clone().unwrap_or_default(),
            legacy.encryption_key.clone().unwrap_or_default(),
        );

        if credentials.is_empty() {
            return;
        }

        if self.clients.add(credentials) {
            report.clients_imported += 1;
        } else {
            tracing::debug!("Legacy client credentials are already defined");
        }
    }
}

fn parse_deployment(
    deployment_id: Option<&str>,
    sandbox_id: Option<&str>,
    label: &str,
    report: &mut MigrationReport,
) -> Option<Deployment> {
    let deployment_id = deployment_id.map(str::trim).filter(|id| !id.is_empty());
    let sandbox_id = sandbox_id.map(str::trim).filter(|id| !id.is_empty());
    if deployment_id.is_none() && sandbox_id.is_none() {
        return None;
    }

    let deployment = match deployment_id.map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        Some(Err(_)) | None => {
            report.warn(format!(
                "Skipping {}: invalid deployment ID '{}'",
                label,
                deployment_id.unwrap_or_default()
            ));
            return None;
        }
    };

    let sandbox = match SandboxId::new(sandbox_id) {
        Ok(sandbox) => sandbox,
        Err(e) => {
            report.warn(format!("Skipping {}: {}", label, e));
            return None;
        }
    };

    Some(Deployment::new(deployment, sandbox))
}
