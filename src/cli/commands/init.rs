//! `eoscfg init` command - Write starter config files

use console::style;
use miette::Result;
use uuid::Uuid;

use crate::cli::GlobalOpts;
use crate::config::{
    ConfigFile, ConfigStore, Platform, PlatformConfig, ProductConfig, SteamConfig,
};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Platforms to write configs for (default: all)
    #[arg(long, short = 'p', value_enum)]
    pub platform: Vec<Platform>,

    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Product version
    #[arg(long = "product-version")]
    pub product_version: Option<String>,

    /// Product ID from the Developer Portal
    #[arg(long)]
    pub product_id: Option<Uuid>,

    /// Also write a Steam config
    #[arg(long)]
    pub steam: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let store = ConfigStore::resolve(global.dir.clone())?;

    let platforms: Vec<Platform> = if args.platform.is_empty() {
        Platform::all().to_vec()
    } else {
        let mut platforms = Vec::new();
        for platform in &args.platform {
            if !platforms.contains(platform) {
                platforms.push(*platform);
            }
        }
        platforms
    };

    let mut files = vec![ProductConfig::FILE_NAME.to_string()];
    files.extend(platforms.iter().map(Platform::file_name));
    if args.steam {
        files.push(SteamConfig::FILE_NAME.to_string());
    }

    let existing: Vec<&String> = files.iter().filter(|f| store.exists(f)).collect();
    if !existing.is_empty() && !args.force {
        return Err(miette::miette!(
            help = "Use --force to overwrite them",
            "{} already exist(s) in {}",
            existing
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            store.dir().display()
        ));
    }

    let mut product = ProductConfig::new();
    if let Some(name) = args.name {
        product.product_name = name;
    }
    if let Some(version) = args.product_version {
        product.product_version = version;
    }
    if let Some(id) = args.product_id {
        product.product_id = id;
    }

    let mut written = vec![store.save_file(&product)?];
    for platform in &platforms {
        written.push(store.save_platform_config(*platform, &PlatformConfig::for_platform(*platform))?);
    }
    if args.steam {
        written.push(store.save_file(&SteamConfig::new())?);
    }

    tracing::info!(dir = %store.dir().display(), files = written.len(), "Initialized config directory");

    if !global.quiet {
        for path in &written {
            println!("{} Created {}", style("✓").green(), path.display());
        }
        println!();
        println!("Next steps:");
        println!(
            "  {}  Add client credentials",
            style("eoscfg client add --client-id <ID> --client-secret <SECRET>").yellow()
        );
        println!(
            "  {}  Add a deployment",
            style("eoscfg deployment add --deployment-id <ID> --sandbox-id <ID>").yellow()
        );
        println!(
            "  {}  Use them on a platform",
            style("eoscfg platform assign <PLATFORM>").yellow()
        );
    }

    Ok(())
}
