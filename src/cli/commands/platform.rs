//! `eoscfg platform` command - Manage per-platform configs

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{load_product, open_store};
use crate::cli::output::{effective_format, print_header, print_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{
    Config, Platform, PlatformConfig, ProductConfig, CURRENT_SCHEMA_VERSION,
};
use crate::core::flags::{
    parse_flag_names, AuthScopeFlags, IntegratedPlatformManagementFlags, NamedFlags, PlatformFlags,
};

#[derive(Subcommand, Debug)]
pub enum PlatformCommands {
    /// List platform configs and what they use
    List,

    /// Print a platform config
    Show(ShowArgs),

    /// Choose the deployment and client a platform uses
    Assign(AssignArgs),

    /// Show or replace a platform's flags
    Flags(FlagsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub platform: Platform,
}

#[derive(clap::Args, Debug)]
#[command(group = clap::ArgGroup::new("assignment").required(true).multiple(true))]
pub struct AssignArgs {
    #[arg(value_enum)]
    pub platform: Platform,

    /// Deployment name from the product config
    #[arg(long, short = 'd', group = "assignment")]
    pub deployment: Option<String>,

    /// Client name from the product config
    #[arg(long, short = 'c', group = "assignment")]
    pub client: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FlagsArgs {
    #[arg(value_enum)]
    pub platform: Platform,

    /// Platform option flags, comma separated (e.g. LoadingInEditor,DisableOverlay)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub platform_options: Option<Vec<String>>,

    /// Auth scope flags, comma separated (e.g. BasicProfile,FriendsList)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub auth_scope: Option<Vec<String>>,

    /// Integrated platform management flags, comma separated
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    pub integrated_platform_management: Option<Vec<String>>,
}

pub fn run(cmd: PlatformCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PlatformCommands::List => run_list(global),
        PlatformCommands::Show(args) => run_show(args, global),
        PlatformCommands::Assign(args) => run_assign(args, global),
        PlatformCommands::Flags(args) => run_flags(args, global),
    }
}

fn deployment_label(product: &ProductConfig, config: &PlatformConfig) -> String {
    if config.deployment.deployment_id.is_nil() {
        return "-".to_string();
    }
    match product.environments.find_deployment(&config.deployment.deployment_id) {
        Some(item) => item.name().to_string(),
        None => "(undefined)".to_string(),
    }
}

fn client_label(product: &ProductConfig, config: &PlatformConfig) -> String {
    if config.client_credentials.is_empty() {
        return "-".to_string();
    }
    product
        .find_client(&config.client_credentials)
        .unwrap_or("(undefined)")
        .to_string()
}

fn flag_names<F: NamedFlags>(flags: &F) -> String {
    let (names, leftover) = flags.to_flag_names();
    let mut parts: Vec<String> = names.iter().map(|name| name.to_string()).collect();
    if leftover != 0 {
        parts.push(format!("{:#x}", leftover));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(",")
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let product = load_product(&store, global)?;
    let platforms = store.platform_configs()?;

    if platforms.is_empty() && global.format != OutputFormat::Json {
        println!("No platform configs found in {}.", store.dir().display());
        println!();
        println!("Create some with: {}", style("eoscfg init --platform <PLATFORM>").yellow());
        return Ok(());
    }

    match effective_format(global.format) {
        OutputFormat::Json => {
            let items: Vec<_> = platforms
                .iter()
                .map(|(platform, config)| {
                    json!({
                        "platform": platform,
                        "file": platform.file_name(),
                        "deployment": deployment_label(&product, config),
                        "client": client_label(&product, config),
                        "platformOptionsFlags": config.platform_options_flags,
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Id => {
            for (platform, _) in &platforms {
                println!("{}", platform);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[("PLATFORM", 10), ("DEPLOYMENT", 20), ("CLIENT", 20), ("FLAGS", 30)]);
            for (platform, config) in &platforms {
                println!(
                    "{:<10} {:<20} {:<20} {}",
                    style(platform.as_str()).cyan(),
                    deployment_label(&product, config),
                    client_label(&product, config),
                    flag_names(&config.platform_options_flags)
                );
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = store.load_platform_config(args.platform)?;
    print_json(&config)
}

fn run_assign(args: AssignArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let product = load_product(&store, global)?;

    let mut config = store.load_or_else(&args.platform.file_name(), || {
        PlatformConfig::for_platform(args.platform)
    })?;

    if let Some(name) = &args.deployment {
        let item = product.environments.deployments.get(name).ok_or_else(|| {
            miette::miette!(
                help = "See `eoscfg deployment list`",
                "No deployment named '{}'",
                name
            )
        })?;
        config.deployment = item.value().clone();
    }

    if let Some(name) = &args.client {
        let item = product.clients.get(name).ok_or_else(|| {
            miette::miette!(help = "See `eoscfg client list`", "No client named '{}'", name)
        })?;
        config.client_credentials = item.value().clone();
    }

    config.set_schema_version(CURRENT_SCHEMA_VERSION);
    let path = store.save_platform_config(args.platform, &config)?;

    tracing::info!(platform = %args.platform, "Updated platform assignment");
    if !global.quiet {
        println!(
            "{} {} now uses deployment {} and client {}",
            style("✓").green(),
            style(args.platform).cyan(),
            style(deployment_label(&product, &config)).yellow(),
            style(client_label(&product, &config)).yellow()
        );
        println!("  {}", style(path.display()).dim());
    }
    Ok(())
}

fn run_flags(args: FlagsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut config = store.load_platform_config(args.platform)?;

    let mut changed = false;
    if let Some(names) = &args.platform_options {
        config.platform_options_flags = parse_flag_names::<PlatformFlags, _, _>(names).into_diagnostic()?;
        changed = true;
    }
    if let Some(names) = &args.auth_scope {
        config.auth_scope_options_flags = parse_flag_names::<AuthScopeFlags, _, _>(names).into_diagnostic()?;
        changed = true;
    }
    if let Some(names) = &args.integrated_platform_management {
        config.integrated_platform_management_flags =
            parse_flag_names::<IntegratedPlatformManagementFlags, _, _>(names).into_diagnostic()?;
        changed = true;
    }

    if changed {
        store.save_platform_config(args.platform, &config)?;
    }

    if global.format == OutputFormat::Json {
        return print_json(&json!({
            "platformOptionsFlags": config.platform_options_flags,
            "authScopeOptionsFlags": config.auth_scope_options_flags,
            "integratedPlatformManagementFlags": config.integrated_platform_management_flags,
        }));
    }

    if changed && !global.quiet {
        println!("{} Updated flags for {}", style("✓").green(), style(args.platform).cyan());
    }
    println!("  Platform options:            {}", flag_names(&config.platform_options_flags));
    println!("  Auth scope:                  {}", flag_names(&config.auth_scope_options_flags));
    println!(
        "  Integrated platform mgmt:    {}",
        flag_names(&config.integrated_platform_management_flags)
    );
    Ok(())
}
