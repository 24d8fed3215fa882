//! `eoscfg client` command - Manage client credentials

use std::sync::mpsc;

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::helpers::{
    join_platforms, load_product, mask_secret, open_store, platforms_using_client, save_product,
    truncate_str,
};
use crate::cli::output::{effective_format, print_header, print_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{is_valid_encryption_key, ClientCredentials};

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List client credentials
    List(ListArgs),

    /// Add client credentials
    Add(AddArgs),

    /// Change the values of existing credentials
    Update(UpdateArgs),

    /// Remove client credentials not used by any platform
    Remove(RemoveArgs),

    /// Rename client credentials
    Rename(RenameArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show secrets in full
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub client_id: String,

    #[arg(long)]
    pub client_secret: String,

    /// 64 hexadecimal characters
    #[arg(long)]
    pub encryption_key: Option<String>,

    /// Name (default: generated)
    #[arg(long, short = 'n')]
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub name: String,

    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub client_secret: Option<String>,

    /// 64 hexadecimal characters, or "" to clear
    #[arg(long)]
    pub encryption_key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    pub name: String,
    pub new_name: String,
}

pub fn run(cmd: ClientCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ClientCommands::List(args) => run_list(args, global),
        ClientCommands::Add(args) => run_add(args, global),
        ClientCommands::Update(args) => run_update(args, global),
        ClientCommands::Remove(args) => run_remove(args, global),
        ClientCommands::Rename(args) => run_rename(args, global),
    }
}

fn check_encryption_key(key: &str) -> Result<()> {
    if !key.is_empty() && !is_valid_encryption_key(key) {
        return Err(miette::miette!(
            help = "Generate one with e.g. `openssl rand -hex 32`",
            "Encryption key must be exactly 64 hexadecimal characters"
        ));
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let product = load_product(&store, global)?;
    let platforms = store.platform_configs()?;

    if product.clients.is_empty() && global.format != OutputFormat::Json {
        println!("No client credentials defined.");
        println!();
        println!(
            "Add some with: {}",
            style("eoscfg client add --client-id <ID> --client-secret <SECRET>").yellow()
        );
        return Ok(());
    }

    let secret = |value: &str| {
        if args.show_secrets {
            value.to_string()
        } else {
            mask_secret(value)
        }
    };

    match effective_format(global.format) {
        OutputFormat::Json => {
            let items: Vec<_> = product
                .clients
                .iter()
                .map(|item| {
                    let credentials = item.value();
                    json!({
                        "name": item.name(),
                        "clientId": credentials.client_id,
                        "clientSecret": secret(&credentials.client_secret),
                        "encryptionKey": secret(&credentials.encryption_key),
                        "platforms": platforms_using_client(&platforms, credentials),
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Id => {
            for name in product.clients.names() {
                println!("{}", name);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[
                ("NAME", 20),
                ("CLIENT ID", 34),
                ("SECRET", 16),
                ("KEY", 8),
                ("PLATFORMS", 20),
            ]);
            for item in &product.clients {
                let credentials = item.value();
                let key = if credentials.encryption_key.is_empty() {
                    style("none").dim()
                } else if credentials.is_encryption_key_valid() {
                    style("ok").green()
                } else {
                    style("invalid").red()
                };
                println!(
                    "{:<20} {:<34} {:<16} {:<8} {}",
                    style(truncate_str(item.name(), 20)).cyan(),
                    truncate_str(&credentials.client_id, 34),
                    truncate_str(&secret(&credentials.client_secret), 16),
                    key,
                    join_platforms(&platforms_using_client(&platforms, credentials))
                );
            }
            println!();
            println!("{} client(s)", style(product.clients.len()).cyan());
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let encryption_key = args.encryption_key.unwrap_or_default();
    check_encryption_key(&encryption_key)?;

    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let credentials = ClientCredentials::new(args.client_id, args.client_secret, encryption_key);

    if let Some(existing) = product.find_client(&credentials) {
        return Err(miette::miette!(
            "These credentials are already defined as '{}'",
            existing
        ));
    }

    let added = match &args.name {
        Some(name) => {
            if product.clients.contains_name(name) {
                return Err(miette::miette!("A client named '{}' already exists", name));
            }
            product.clients.add_named(name.clone(), credentials.clone())
        }
        None => product.clients.add(credentials.clone()),
    };
    if !added {
        return Err(miette::miette!("Could not add client credentials"));
    }

    save_product(&store, &product)?;

    let name = product.find_client(&credentials).unwrap_or_default();
    tracing::info!(name, "Added client");
    if !global.quiet {
        println!("{} Added client {}", style("✓").green(), style(name).cyan());
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    if let Some(key) = &args.encryption_key {
        check_encryption_key(key)?;
    }

    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;

    let mut item = product
        .clients
        .get_mut(&args.name)
        .ok_or_else(|| miette::miette!("No client named '{}'", args.name))?;

    let previous = item.value().clone();
    let mut updated = previous.clone();
    if let Some(client_id) = args.client_id {
        updated.client_id = client_id;
    }
    if let Some(client_secret) = args.client_secret {
        updated.client_secret = client_secret;
    }
    if let Some(key) = args.encryption_key {
        updated.encryption_key = key;
    }

    if updated == previous {
        if !global.quiet {
            println!("{} Nothing to change", style("→").blue());
        }
        return Ok(());
    }

    if !item.replace_value(updated.clone()) {
        return Err(miette::miette!(
            "Another client already has these credentials"
        ));
    }
    save_product(&store, &product)?;

    // Platforms hold a copy of the credentials, so carry the change over
    for (platform, mut config) in store.platform_configs()? {
        if !previous.is_empty() && config.client_credentials == previous {
            config.client_credentials = updated.clone();
            store.save_platform_config(platform, &config)?;
            if !global.quiet {
                println!("{} Updated {}", style("✓").green(), platform.file_name());
            }
        }
    }

    if !global.quiet {
        println!("{} Updated client {}", style("✓").green(), style(&args.name).cyan());
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let platforms = store.platform_configs()?;

    let Some(credentials) = product.clients.get(&args.name).map(|item| item.value().clone()) else {
        return Err(miette::miette!("No client named '{}'", args.name));
    };

    let in_use: Vec<ClientCredentials> = platforms
        .iter()
        .map(|(_, config)| config.client_credentials.clone())
        .filter(|credentials| !credentials.is_empty())
        .collect();
    product
        .clients
        .set_remove_predicate(move |value| !in_use.contains(value));

    if !product.clients.remove(&args.name) {
        return Err(miette::miette!(
            help = "Assign different credentials to those platforms first",
            "Client '{}' is used by: {}",
            args.name,
            join_platforms(&platforms_using_client(&platforms, &credentials))
        ));
    }

    save_product(&store, &product)?;
    if !global.quiet {
        println!("{} Removed client {}", style("✓").green(), style(&args.name).cyan());
    }
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;

    if !product.clients.contains_name(&args.name) {
        return Err(miette::miette!("No client named '{}'", args.name));
    }

    let (tx, rx) = mpsc::channel();
    product.clients.subscribe(move |change| {
        let _ = tx.send(change.clone());
    });

    if !product.clients.rename(&args.name, args.new_name.as_str()) {
        return Err(miette::miette!(
            "Cannot rename '{}' to '{}': the name is empty or already taken",
            args.name,
            args.new_name
        ));
    }

    save_product(&store, &product)?;
    for change in rx.try_iter() {
        tracing::info!(previous = %change.previous, current = %change.current, "Renamed client");
        if !global.quiet {
            println!(
                "{} Renamed client {} → {}",
                style("✓").green(),
                style(&change.previous).dim(),
                style(&change.current).cyan()
            );
        }
    }
    Ok(())
}
