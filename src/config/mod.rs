//! Configuration documents and their storage
//!
//! Each document is a JSON file in the plugin's config directory. Documents
//! carry a schema version; files written by older plugin versions (or with no
//! version at all) are flagged for migration when loaded.

pub mod credentials;
pub mod environments;
pub mod legacy;
pub mod platform;
pub mod product;
pub mod steam;
pub mod store;

use std::path::PathBuf;

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::core::{versions_equal, Version};
use crate::json::JsonError;

pub use credentials::{is_valid_encryption_key, ClientCredentials};
pub use environments::{Deployment, ProductionEnvironments};
pub use legacy::{LegacyConfig, MigrationReport, SandboxDeploymentOverride};
pub use platform::{Platform, PlatformConfig, ThreadAffinity};
pub use product::ProductConfig;
pub use steam::SteamConfig;
pub use store::{ConfigStore, CONFIG_DIR_CANDIDATES};

/// Schema version written by this version of the toolkit
pub const CURRENT_SCHEMA_VERSION: Version = Version::new(1, 0);

/// A configuration document
pub trait Config: Serialize + DeserializeOwned + Default {
    fn schema_version(&self) -> Option<Version>;

    fn set_schema_version(&mut self, version: Version);

    /// Stored schema version is missing or differs from the current one
    fn needs_migration(&self) -> bool {
        is_outdated(self.schema_version())
    }

    /// Called after the document has been read from disk
    fn after_load(&mut self) {}
}

/// True when a stored schema version is missing or not the current one
pub fn is_outdated(version: Option<Version>) -> bool {
    version.map_or(true, |v| !versions_equal(&v, &CURRENT_SCHEMA_VERSION))
}

/// A document stored under one fixed file name
pub trait ConfigFile: Config {
    const FILE_NAME: &'static str;
}

/// Errors loading or saving configuration documents
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Json(#[from] JsonError),

    #[error("Config file not found: {}", path.display())]
    #[diagnostic(
        code(eoscfg::config::not_found),
        help("Run `eoscfg init` to create the default config files")
    )]
    NotFound { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    #[diagnostic(code(eoscfg::config::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {file}: {source}")]
    #[diagnostic(code(eoscfg::config::serialize))]
    Serialize {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No config directory found (looked for {})", CONFIG_DIR_CANDIDATES.join(", "))]
    #[diagnostic(
        code(eoscfg::config::no_dir),
        help("Pass --dir or set EOSCFG_DIR to the directory holding eos_product_config.json")
    )]
    NoConfigDir,
}
