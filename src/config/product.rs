//! Product-wide configuration: `eos_product_config.json`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::ClientCredentials;
use super::environments::ProductionEnvironments;
use super::{is_outdated, Config, ConfigFile, CURRENT_SCHEMA_VERSION};
use crate::core::{guid, nullable};
use crate::core::named_set::NamedSet;
use crate::core::Version;

pub const CLIENTS_DEFAULT_NAME: &str = "Client";

/// Values that are the same on every platform the product ships on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductConfigRepr", into = "ProductConfigRepr")]
pub struct ProductConfig {
    pub schema_version: Option<Version>,
    pub product_name: String,
    pub product_id: Uuid,
    pub product_version: String,

    /// Set once the legacy config file has been imported, or when the
    /// document was created fresh and there is nothing to import
    pub imported: bool,

    pub clients: NamedSet<ClientCredentials>,
    pub environments: ProductionEnvironments,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            schema_version: None,
            product_name: String::new(),
            product_id: Uuid::nil(),
            product_version: String::new(),
            imported: false,
            clients: NamedSet::new(CLIENTS_DEFAULT_NAME),
            environments: ProductionEnvironments::default(),
        }
    }
}

impl ProductConfig {
    /// A fresh document at the current schema version
    pub fn new() -> Self {
        Self {
            schema_version: Some(CURRENT_SCHEMA_VERSION),
            imported: true,
            ..Self::default()
        }
    }

    pub fn product_id_string(&self) -> String {
        guid::to_stripped_string(&self.product_id)
    }

    pub fn find_client(&self, credentials: &ClientCredentials) -> Option<&str> {
        self.clients.find_value(credentials).map(|item| item.name())
    }
}

impl Config for ProductConfig {
    fn schema_version(&self) -> Option<Version> {
        self.schema_version
    }

    fn set_schema_version(&mut self, version: Version) {
        self.schema_version = Some(version);
    }

    fn needs_migration(&self) -> bool {
        is_outdated(self.schema_version) || !self.imported
    }
}

impl ConfigFile for ProductConfig {
    const FILE_NAME: &'static str = "eos_product_config.json";
}

#[derive(Serialize, Deserialize)]
struct ProductConfigRepr {
    #[serde(rename = "schemaVersion", default, skip_serializing_if = "Option::is_none")]
    schema_version: Option<Version>,

    #[serde(rename = "ProductName", default, deserialize_with = "nullable::deserialize")]
    product_name: String,

    #[serde(rename = "ProductId", with = "guid", default)]
    product_id: Uuid,

    #[serde(rename = "ProductVersion", default, deserialize_with = "nullable::deserialize")]
    product_version: String,

    #[serde(default)]
    imported: bool,

    #[serde(rename = "ClientsDefaultName", default = "default_clients_name")]
    clients_default_name: String,

    #[serde(rename = "Clients", default)]
    clients: NamedSet<ClientCredentials>,

    #[serde(rename = "Environments", default)]
    environments: ProductionEnvironments,
}

fn default_clients_name() -> String {
    CLIENTS_DEFAULT_NAME.to_string()
}

impl From<ProductConfigRepr> for ProductConfig {
    fn from(repr: ProductConfigRepr) -> Self {
        let mut clients = repr.clients;
        clients.set_default_name_pattern(repr.clients_default_name);
        Self {
            schema_version: repr.schema_version,
            product_name: repr.product_name,
            product_id: repr.product_id,
            product_version: repr.product_version,
            imported: repr.imported,
            clients,
            environments: repr.environments,
        }
    }
}

impl From<ProductConfig> for ProductConfigRepr {
    fn from(config: ProductConfig) -> Self {
        Self {
            schema_version: config.schema_version,
            product_name: config.product_name,
            product_id: config.product_id,
            product_version: config.product_version,
            imported: config.imported,
            clients_default_name: config.clients.default_name_pattern().to_string(),
            clients: config.clients,
            environments: config.environments,
        }
    }
}
