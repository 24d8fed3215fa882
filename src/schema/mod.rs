//! Schemas for config documents
//!
//! Two layers: JSON Schemas embedded in the binary check document shape, and
//! the field schemas in [`fields`] check values the way the editor does.

pub mod fields;
pub mod registry;

use std::fmt;

use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{ConfigFile, Platform, PlatformConfig, ProductConfig, SteamConfig};
use crate::core::guid;

pub use fields::{ConfigSchema, FieldKind, FieldSchema, FieldValidator, FlagKind};
pub use registry::SchemaRegistry;

/// The kinds of document that have a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Product,
    Platform,
    Steam,
}

impl DocumentKind {
    pub const fn all() -> &'static [DocumentKind] {
        &[DocumentKind::Product, DocumentKind::Platform, DocumentKind::Steam]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Product => "product",
            DocumentKind::Platform => "platform",
            DocumentKind::Steam => "steam",
        }
    }

    /// Work out the kind from a config file name. The legacy file has no
    /// schema of its own.
    pub fn from_file_name(file_name: &str) -> Option<DocumentKind> {
        if file_name == ProductConfig::FILE_NAME {
            Some(DocumentKind::Product)
        } else if file_name == SteamConfig::FILE_NAME {
            Some(DocumentKind::Steam)
        } else if Platform::from_file_name(file_name).is_some() {
            Some(DocumentKind::Platform)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found in a document, located by JSON pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
    pub severity: Severity,
}

impl FieldIssue {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Errors setting up validation
#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("No schema is embedded for {kind} documents")]
    #[diagnostic(code(eoscfg::schema::missing))]
    MissingSchema { kind: DocumentKind },

    #[error("Embedded schema for {kind} documents is invalid: {message}")]
    #[diagnostic(code(eoscfg::schema::invalid))]
    InvalidSchema { kind: DocumentKind, message: String },
}

/// Run both the JSON schema and the field validators over a document
pub fn validate_document(
    registry: &SchemaRegistry,
    kind: DocumentKind,
    document: &Value,
) -> Result<Vec<FieldIssue>, ValidationError> {
    let mut issues = registry.validate(kind, document)?;
    issues.extend(ConfigSchema::for_kind(kind).validate(document));
    Ok(issues)
}

/// Check that a platform config only uses values its product config defines
pub fn check_platform_references(product: &ProductConfig, config: &PlatformConfig) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    let deployment = &config.deployment;
    if !deployment.deployment_id.is_nil() {
        match product.environments.find_deployment(&deployment.deployment_id) {
            None => issues.push(FieldIssue::error(
                "/deployment/DeploymentId",
                format!(
                    "Deployment {} is not defined in the product config",
                    guid::to_stripped_string(&deployment.deployment_id)
                ),
            )),
            Some(item) if item.value().sandbox_id != deployment.sandbox_id => {
                issues.push(FieldIssue::warning(
                    "/deployment/SandboxId",
                    format!(
                        "Sandbox '{}' does not match deployment '{}' in the product config, which uses '{}'",
                        deployment.sandbox_id,
                        item.name(),
                        item.value().sandbox_id
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    let credentials = &config.client_credentials;
    if !credentials.is_empty() && product.find_client(credentials).is_none() {
        issues.push(FieldIssue::warning(
            "/clientCredentials",
            "Client credentials are not defined in the product config",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(
            DocumentKind::from_file_name("eos_product_config.json"),
            Some(DocumentKind::Product)
        );
        assert_eq!(
            DocumentKind::from_file_name("eos_android_config.json"),
            Some(DocumentKind::Platform)
        );
        assert_eq!(
            DocumentKind::from_file_name("eos_steam_config.json"),
            Some(DocumentKind::Steam)
        );
        assert_eq!(DocumentKind::from_file_name("EpicOnlineServicesConfig.json"), None);
        assert_eq!(DocumentKind::from_file_name("notes.json"), None);
    }

    #[test]
    fn test_issue_display() {
        let issue = FieldIssue::error("/ProductId", "bad");
        assert_eq!(issue.to_string(), "/ProductId: bad");
        assert!(issue.is_error());
        assert_eq!(FieldIssue::warning("", "x").to_string(), "/: x");
    }

    #[test]
    fn test_platform_references() {
        use crate::config::{ClientCredentials, Deployment};
        use crate::core::SandboxId;
        use uuid::Uuid;

        let deployment = Deployment::new(
            Uuid::parse_str("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap(),
            SandboxId::parse("11111111111111111111111111111111").unwrap(),
        );
        let credentials = ClientCredentials::new("id", "secret", "");

        let mut product = ProductConfig::new();
        product.environments.add_deployment(deployment.clone());
        product.clients.add(credentials.clone());

        let mut config = PlatformConfig::for_platform(Platform::Linux);
        assert!(check_platform_references(&product, &config).is_empty());

        config.deployment = deployment.clone();
        config.client_credentials = credentials;
        assert!(check_platform_references(&product, &config).is_empty());

        config.deployment.sandbox_id = SandboxId::parse("22222222222222222222222222222222").unwrap();
        config.client_credentials = ClientCredentials::new("other", "secret", "");
        let issues = check_platform_references(&product, &config);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| !i.is_error()));

        config.deployment.deployment_id = Uuid::parse_str("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap();
        let issues = check_platform_references(&product, &config);
        assert!(issues[0].is_error());
        assert_eq!(issues[0].path, "/deployment/DeploymentId");
    }
}
