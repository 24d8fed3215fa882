//! Translating config documents into SDK start-up options
//!
//! The SDK is started with two option blocks: one for `EOS_Initialize` and one
//! for `EOS_Platform_Create`. This module builds both from a product config
//! and one platform config, as plain serializable values.

use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{Platform, PlatformConfig, ProductConfig, ThreadAffinity};
use crate::core::flags::{IntegratedPlatformManagementFlags, PlatformFlags};
use crate::core::{guid, SandboxId};

const SANDBOX_ARGUMENTS: &[&str] = &["eossandboxid", "epicsandboxid"];
const DEPLOYMENT_ARGUMENTS: &[&str] = &["eosdeploymentid", "epicdeploymentid"];

/// Errors building platform options
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum OptionsError {
    #[error("No deployment is set for {platform}")]
    #[diagnostic(
        code(eoscfg::options::deployment_unset),
        help("Choose one with `eoscfg platform assign <PLATFORM> --deployment <NAME>`")
    )]
    DeploymentUnset { platform: Platform },

    #[error("Deployment {deployment_id} used by {platform} is not defined in the product config")]
    #[diagnostic(
        code(eoscfg::options::deployment_undefined),
        help("Add it with `eoscfg deployment add`, or assign a defined deployment")
    )]
    DeploymentNotDefined {
        platform: Platform,
        deployment_id: String,
    },

    #[error("Deployment {deployment_id} used by {platform} has no sandbox")]
    #[diagnostic(code(eoscfg::options::sandbox_empty))]
    SandboxEmpty {
        platform: Platform,
        deployment_id: String,
    },
}

/// Options for `EOS_Initialize`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOptions {
    pub product_name: String,
    pub product_version: String,
    pub thread_affinity: ThreadAffinity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCredentialsOptions {
    pub client_id: String,
    pub client_secret: String,
}

/// Options for `EOS_Platform_Create`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCreateOptions {
    pub product_id: String,
    pub sandbox_id: String,
    pub deployment_id: String,
    pub client_credentials: ClientCredentialsOptions,
    pub encryption_key: Option<String>,
    pub is_server: bool,
    pub flags: PlatformFlags,
    pub integrated_platform_management_flags: IntegratedPlatformManagementFlags,
    pub cache_directory: Option<String>,
    pub tick_budget_in_milliseconds: u32,
    pub task_network_timeout_seconds: Option<f64>,
    pub override_country_code: Option<String>,
    pub override_locale_code: Option<String>,
}

/// Both option blocks for one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkOptions {
    pub platform: Platform,
    pub initialize: InitializeOptions,
    pub create: PlatformCreateOptions,
}

/// Sandbox and deployment given on the game's command line, e.g.
/// `-eossandboxid=<id> -eosdeploymentid=<id>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub sandbox_id: Option<SandboxId>,
    pub deployment_id: Option<Uuid>,
}

impl LaunchOverrides {
    /// Pick the overrides out of a launch command line. Arguments with values
    /// that do not parse are ignored with a warning.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = argument_value(arg, SANDBOX_ARGUMENTS) {
                match SandboxId::parse(value) {
                    Ok(sandbox) => overrides.sandbox_id = Some(sandbox),
                    Err(e) => tracing::warn!("Ignoring {}: {}", arg, e),
                }
            } else if let Some(value) = argument_value(arg, DEPLOYMENT_ARGUMENTS) {
                match Uuid::parse_str(value) {
                    Ok(id) => overrides.deployment_id = Some(id),
                    Err(e) => tracing::warn!("Ignoring {}: {}", arg, e),
                }
            }
        }
        overrides
    }

    pub fn is_empty(&self) -> bool {
        self.sandbox_id.is_none() && self.deployment_id.is_none()
    }
}

/// `-name=value` for any of `names`, case-insensitive on the name
fn argument_value<'a>(arg: &'a str, names: &[&str]) -> Option<&'a str> {
    let rest = arg.strip_prefix('-')?;
    let (name, value) = rest.split_once('=')?;
    if value.is_empty() || !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        return None;
    }
    Some(value)
}

/// Inputs that come from the running environment rather than config files
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub cache_directory: Option<PathBuf>,
    pub in_editor: bool,
    pub overrides: LaunchOverrides,
}

pub fn initialize_options(product: &ProductConfig, config: &PlatformConfig) -> InitializeOptions {
    InitializeOptions {
        product_name: product.product_name.clone(),
        product_version: product.product_version.clone(),
        thread_affinity: config.thread_affinity,
    }
}

/// Build the platform creation options for `platform`.
///
/// The deployment must be set and defined in the product config, and its
/// sandbox must not be empty. Launch overrides replace the configured values
/// and are used even when the product config does not define them.
pub fn platform_create_options(
    product: &ProductConfig,
    platform: Platform,
    config: &PlatformConfig,
    context: &BuildContext,
) -> Result<PlatformCreateOptions, OptionsError> {
    let mut deployment = config.deployment.clone();

    if let Some(sandbox) = &context.overrides.sandbox_id {
        if !product.environments.is_sandbox_defined(sandbox) {
            tracing::warn!(
                "Sandbox {} from the command line is not in the product config, using it anyway",
                sandbox
            );
        }
        deployment.sandbox_id = sandbox.clone();
    }

    if let Some(deployment_id) = context.overrides.deployment_id {
        if !product.environments.is_deployment_defined(&deployment_id) {
            tracing::warn!(
                "Deployment {} from the command line is not in the product config, using it anyway",
                guid::to_stripped_string(&deployment_id)
            );
        }
        deployment.deployment_id = deployment_id;
    }

    if deployment.deployment_id.is_nil() {
        return Err(OptionsError::DeploymentUnset { platform });
    }

    let deployment_id = guid::to_stripped_string(&deployment.deployment_id);

    if context.overrides.deployment_id.is_none()
        && !product
            .environments
            .is_deployment_defined(&deployment.deployment_id)
    {
        return Err(OptionsError::DeploymentNotDefined {
            platform,
            deployment_id,
        });
    }

    if deployment.sandbox_id.is_empty() {
        return Err(OptionsError::SandboxEmpty {
            platform,
            deployment_id,
        });
    }

    let credentials = &config.client_credentials;
    let encryption_key = if credentials.encryption_key.is_empty() {
        None
    } else if credentials.is_encryption_key_valid() {
        Some(credentials.encryption_key.clone())
    } else {
        tracing::error!(
            "Encryption key for {} is not 64 hexadecimal characters, leaving it out",
            platform
        );
        None
    };

    let flags = if context.in_editor {
        PlatformFlags::LOADING_IN_EDITOR
    } else {
        config.platform_options_flags
    };

    let task_network_timeout_seconds =
        Some(config.task_network_timeout_seconds).filter(|seconds| *seconds > 0.0);

    Ok(PlatformCreateOptions {
        product_id: product.product_id_string(),
        sandbox_id: deployment.sandbox_id.to_string(),
        deployment_id,
        client_credentials: ClientCredentialsOptions {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
        },
        encryption_key,
        is_server: config.is_server,
        flags,
        integrated_platform_management_flags: config.integrated_platform_management_flags,
        cache_directory: context
            .cache_directory
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
        tick_budget_in_milliseconds: config.tick_budget_in_milliseconds,
        task_network_timeout_seconds,
        override_country_code: config.override_country_code.clone(),
        override_locale_code: config.override_locale_code.clone(),
    })
}

pub fn build_sdk_options(
    product: &ProductConfig,
    platform: Platform,
    config: &PlatformConfig,
    context: &BuildContext,
) -> Result<SdkOptions, OptionsError> {
    Ok(SdkOptions {
        platform,
        initialize: initialize_options(product, config),
        create: platform_create_options(product, platform, config, context)?,
    })
}
