//! Deployments and sandboxes available to a product

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::guid;
use crate::core::named_set::{NamedItem, NamedSet};
use crate::core::sandbox::SandboxId;

pub const DEPLOYMENTS_DEFAULT_NAME: &str = "Deployment";
pub const SANDBOXES_DEFAULT_NAME: &str = "Sandbox";

/// A deployment and the sandbox it lives in
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(rename = "DeploymentId", with = "guid", default)]
    pub deployment_id: Uuid,

    #[serde(rename = "SandboxId", default)]
    pub sandbox_id: SandboxId,
}

impl Deployment {
    pub fn new(deployment_id: Uuid, sandbox_id: SandboxId) -> Self {
        Self {
            deployment_id,
            sandbox_id,
        }
    }

    /// Neither the deployment nor the sandbox has been set
    pub fn is_unset(&self) -> bool {
        self.deployment_id.is_nil() && self.sandbox_id.is_empty()
    }
}

/// The production environments defined for the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EnvironmentsRepr", into = "EnvironmentsRepr")]
pub struct ProductionEnvironments {
    pub deployments: NamedSet<Deployment>,
    pub sandboxes: NamedSet<SandboxId>,
}

impl Default for ProductionEnvironments {
    fn default() -> Self {
        Self {
            deployments: NamedSet::new(DEPLOYMENTS_DEFAULT_NAME),
            sandboxes: NamedSet::new(SANDBOXES_DEFAULT_NAME),
        }
    }
}

impl ProductionEnvironments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deployment, registering its sandbox if it is not known yet.
    /// Nothing changes when the deployment is already defined.
    pub fn add_deployment(&mut self, deployment: Deployment) -> bool {
        if self.deployments.contains_value(&deployment) {
            return false;
        }

        let sandbox = deployment.sandbox_id.clone();
        if !self.deployments.add(deployment) {
            return false;
        }
        self.register_sandbox(sandbox);
        true
    }

    pub fn add_named_deployment(&mut self, name: &str, deployment: Deployment) -> bool {
        if self.deployments.contains_name(name) || self.deployments.contains_value(&deployment) {
            return false;
        }

        let sandbox = deployment.sandbox_id.clone();
        if !self.deployments.add_named(name, deployment) {
            return false;
        }
        self.register_sandbox(sandbox);
        true
    }

    fn register_sandbox(&mut self, sandbox: SandboxId) {
        if !sandbox.is_empty() && !self.sandboxes.contains_value(&sandbox) {
            self.sandboxes.add(sandbox);
        }
    }

    /// Add a sandbox on its own. Empty sandboxes are refused.
    pub fn add_sandbox(&mut self, sandbox: SandboxId) -> bool {
        if sandbox.is_empty() {
            return false;
        }
        self.sandboxes.add(sandbox)
    }

    pub fn remove_deployment(&mut self, name: &str) -> bool {
        self.deployments.remove(name)
    }

    /// Remove a sandbox unless a deployment still points at it
    pub fn remove_sandbox(&mut self, name: &str) -> bool {
        let Some(sandbox) = self.sandboxes.get(name).map(|item| item.value().clone()) else {
            return false;
        };

        if self.deployments.values().any(|d| d.sandbox_id == sandbox) {
            return false;
        }

        self.sandboxes.remove(name)
    }

    pub fn is_deployment_defined(&self, deployment_id: &Uuid) -> bool {
        self.deployments
            .values()
            .any(|d| d.deployment_id == *deployment_id)
    }

    pub fn is_sandbox_defined(&self, sandbox_id: &SandboxId) -> bool {
        self.sandboxes.contains_value(sandbox_id)
            || self.deployments.values().any(|d| d.sandbox_id == *sandbox_id)
    }

    pub fn find_deployment(&self, deployment_id: &Uuid) -> Option<&NamedItem<Deployment>> {
        self.deployments
            .iter()
            .find(|item| item.value().deployment_id == *deployment_id)
    }
}

#[derive(Serialize, Deserialize)]
struct EnvironmentsRepr {
    #[serde(rename = "DeploymentsDefaultName", default = "default_deployments_name")]
    deployments_default_name: String,

    #[serde(rename = "SandboxesDefaultName", default = "default_sandboxes_name")]
    sandboxes_default_name: String,

    #[serde(rename = "Deployments", default)]
    deployments: NamedSet<Deployment>,

    #[serde(rename = "Sandboxes", default)]
    sandboxes: NamedSet<SandboxId>,
}

fn default_deployments_name() -> String {
    DEPLOYMENTS_DEFAULT_NAME.to_string()
}

fn default_sandboxes_name() -> String {
    SANDBOXES_DEFAULT_NAME.to_string()
}

impl From<EnvironmentsRepr> for ProductionEnvironments {
    fn from(repr: EnvironmentsRepr) -> Self {
        let mut deployments = repr.deployments;
        deployments.set_default_name_pattern(repr.deployments_default_name);
        let mut sandboxes = repr.sandboxes;
        sandboxes.set_default_name_pattern(repr.sandboxes_default_name);
        Self {
            deployments,
            sandboxes,
        }
    }
}

impl From<ProductionEnvironments> for EnvironmentsRepr {
    fn from(envs: ProductionEnvironments) -> Self {
        Self {
            deployments_default_name: envs.deployments.default_name_pattern().to_string(),
            sandboxes_default_name: envs.sandboxes.default_name_pattern().to_string(),
            deployments: envs.deployments,
            sandboxes: envs.sandboxes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(s: &str) -> SandboxId {
        SandboxId::parse(s).unwrap()
    }

    fn deployment(id: &str, sb: &str) -> Deployment {
        Deployment::new(Uuid::parse_str(id).unwrap(), sandbox(sb))
    }

    const SB1: &str = "11111111111111111111111111111111";
    const SB2: &str = "22222222222222222222222222222222";
    const DEP1: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const DEP2: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    #[test]
    fn test_add_deployment_registers_sandbox() {
        let mut envs = ProductionEnvironments::new();
        assert!(envs.add_deployment(deployment(DEP1, SB1)));
        assert_eq!(envs.sandboxes.len(), 1);
        assert!(envs.is_sandbox_defined(&sandbox(SB1)));
        assert!(envs.is_deployment_defined(&Uuid::parse_str(DEP1).unwrap()));
        assert_eq!(envs.deployments.first().unwrap().name(), "Deployment");
    }

    #[test]
    fn test_add_deployment_shares_sandbox() {
        let mut envs = ProductionEnvironments::new();
        assert!(envs.add_deployment(deployment(DEP1, SB1)));
        assert!(envs.add_deployment(deployment(DEP2, SB1)));
        assert_eq!(envs.deployments.len(), 2);
        assert_eq!(envs.sandboxes.len(), 1);
    }

    #[test]
    fn test_duplicate_deployment_changes_nothing() {
        let mut envs = ProductionEnvironments::new();
        envs.add_deployment(deployment(DEP1, SB1));
        assert!(!envs.add_deployment(deployment(DEP1, SB1)));
        assert_eq!(envs.deployments.len(), 1);
        assert_eq!(envs.sandboxes.len(), 1);
    }

    #[test]
    fn test_refused_named_deployment_leaves_sandboxes_alone() {
        let mut envs = ProductionEnvironments::new();
        assert!(!envs.add_named_deployment("", deployment(DEP1, SB1)));
        assert!(envs.deployments.is_empty());
        assert!(envs.sandboxes.is_empty());

        assert!(envs.add_named_deployment("Live", deployment(DEP1, SB1)));
        assert!(!envs.add_named_deployment("Live", deployment(DEP2, SB2)));
        assert_eq!(envs.sandboxes.len(), 1);
        assert!(!envs.is_sandbox_defined(&sandbox(SB2)));
    }

    #[test]
    fn test_remove_sandbox_in_use_refused() {
        let mut envs = ProductionEnvironments::new();
        envs.add_deployment(deployment(DEP1, SB1));
        assert!(envs.add_sandbox(sandbox(SB2)));

        assert!(!envs.remove_sandbox("Sandbox"));
        assert!(envs.remove_sandbox("Sandbox (1)"));
        assert!(envs.remove_deployment("Deployment"));
        assert!(envs.remove_sandbox("Sandbox"));
        assert!(envs.sandboxes.is_empty());
    }

    #[test]
    fn test_empty_sandbox_refused() {
        let mut envs = ProductionEnvironments::new();
        assert!(!envs.add_sandbox(SandboxId::unset()));
    }

    #[test]
    fn test_json_layout() {
        let mut envs = ProductionEnvironments::new();
        envs.add_deployment(deployment(DEP1, SB1));
        let json = serde_json::to_value(&envs).unwrap();

        assert_eq!(json["DeploymentsDefaultName"], "Deployment");
        assert_eq!(json["Deployments"][0]["Name"], "Deployment");
        assert_eq!(json["Deployments"][0]["Value"]["DeploymentId"], DEP1);
        assert_eq!(json["Deployments"][0]["Value"]["SandboxId"]["Value"], SB1);
        assert_eq!(json["Sandboxes"][0]["Value"]["Value"], SB1);

        let back: ProductionEnvironments = serde_json::from_value(json).unwrap();
        assert_eq!(back, envs);
        assert_eq!(back.deployments.default_name_pattern(), "Deployment");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let envs: ProductionEnvironments = serde_json::from_str("{}").unwrap();
        assert!(envs.deployments.is_empty());
        assert_eq!(envs.sandboxes.default_name_pattern(), "Sandbox");
    }
}
