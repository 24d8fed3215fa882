//! Shared helper functions for CLI commands

use console::style;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{
    ClientCredentials, ConfigStore, Deployment, MigrationReport, Platform, PlatformConfig,
    ProductConfig,
};

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Show only the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

pub fn open_store(global: &GlobalOpts) -> Result<ConfigStore> {
    Ok(ConfigStore::resolve(global.dir.clone())?)
}

/// Load the product config for editing, importing the legacy file first if
/// it has not been imported yet. The import is reported unless output is JSON.
pub fn load_product(store: &ConfigStore, global: &GlobalOpts) -> Result<ProductConfig> {
    let (config, report) = store.load_migrated_product_config()?;
    if let Some(report) = report {
        if !global.quiet && global.format != OutputFormat::Json {
            print_migration_report(&report);
        }
    }
    Ok(config)
}

pub fn save_product(store: &ConfigStore, config: &ProductConfig) -> Result<()> {
    store.save_file(config)?;
    Ok(())
}

pub fn print_migration_report(report: &MigrationReport) {
    println!(
        "{} Imported legacy config: {} client(s), {} deployment(s)",
        style("→").blue(),
        style(report.clients_imported).cyan(),
        style(report.deployments_imported).cyan()
    );
    for warning in &report.warnings {
        println!("  {} {}", style("!").yellow(), warning);
    }
}

/// Platforms whose config uses the given client. Empty credentials mean no
/// client is assigned, so nothing uses an empty client.
pub fn platforms_using_client(
    platforms: &[(Platform, PlatformConfig)],
    credentials: &ClientCredentials,
) -> Vec<Platform> {
    if credentials.is_empty() {
        return Vec::new();
    }
    platforms
        .iter()
        .filter(|(_, config)| config.client_credentials == *credentials)
        .map(|(platform, _)| *platform)
        .collect()
}

/// Platforms whose config uses the given deployment
pub fn platforms_using_deployment(
    platforms: &[(Platform, PlatformConfig)],
    deployment: &Deployment,
) -> Vec<Platform> {
    platforms
        .iter()
        .filter(|(_, config)| config.deployment == *deployment)
        .map(|(platform, _)| *platform)
        .collect()
}

pub fn join_platforms(platforms: &[Platform]) -> String {
    if platforms.is_empty() {
        return "-".to_string();
    }
    platforms
        .iter()
        .map(Platform::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
