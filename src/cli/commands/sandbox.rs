//! `eoscfg sandbox` command - Manage sandboxes

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::helpers::{load_product, open_store, save_product, truncate_str};
use crate::cli::output::{effective_format, print_header, print_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::SandboxId;

#[derive(Subcommand, Debug)]
pub enum SandboxCommands {
    /// List sandboxes
    List,

    /// Add a sandbox
    Add(AddArgs),

    /// Remove a sandbox no deployment lives in
    Remove(RemoveArgs),

    /// Rename a sandbox
    Rename(RenameArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// A GUID or a `p-` pre-production id
    pub sandbox_id: SandboxId,

    /// Name (default: generated)
    #[arg(long, short = 'n')]
    pub name: Option<String>,
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

pub fn run(cmd: SandboxCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SandboxCommands::List => run_list(global),
        SandboxCommands::Add(args) => run_add(args, global),
        SandboxCommands::Remove(args) => run_remove(args, global),
        SandboxCommands::Rename(args) => run_rename(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let product = load_product(&store, global)?;
    let environments = &product.environments;

    if environments.sandboxes.is_empty() && global.format != OutputFormat::Json {
        println!("No sandboxes defined.");
        return Ok(());
    }

    let deployments_in = |sandbox: &SandboxId| -> Vec<String> {
        environments
            .deployments
            .iter()
            .filter(|item| item.value().sandbox_id == *sandbox)
            .map(|item| item.name().to_string())
            .collect()
    };

    match effective_format(global.format) {
        OutputFormat::Json => {
            let items: Vec<_> = environments
                .sandboxes
                .iter()
                .map(|item| {
                    json!({
                        "name": item.name(),
                        "sandboxId": item.value().value(),
                        "preProduction": item.value().is_pre_production(),
                        "deployments": deployments_in(item.value()),
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Id => {
            for name in environments.sandboxes.names() {
                println!("{}", name);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[("NAME", 20), ("SANDBOX ID", 34), ("DEPLOYMENTS", 30)]);
            for item in &environments.sandboxes {
                let deployments = deployments_in(item.value());
                println!(
                    "{:<20} {:<34} {}",
                    style(truncate_str(item.name(), 20)).cyan(),
                    item.value().to_string(),
                    if deployments.is_empty() {
                        "-".to_string()
                    } else {
                        deployments.join(",")
                    }
                );
            }
            println!();
            println!("{} sandbox(es)", style(environments.sandboxes.len()).cyan());
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    if args.sandbox_id.is_empty() {
        return Err(miette::miette!("Sandbox ID must not be empty"));
    }

    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    if let Some(existing) = product.environments.sandboxes.find_value(&args.sandbox_id) {
        return Err(miette::miette!(
            "This sandbox is already defined as '{}'",
            existing.name()
        ));
    }

    let added = match &args.name {
        Some(name) => product
            .environments
            .sandboxes
            .add_named(name.clone(), args.sandbox_id.clone()),
        None => product.environments.add_sandbox(args.sandbox_id.clone()),
    };
    if !added {
        return Err(miette::miette!("Could not add sandbox: the name is empty or already taken"));
    }

    save_product(&store, &product)?;

    let name = product
        .environments
        .sandboxes
        .find_value(&args.sandbox_id)
        .map(|item| item.name().to_string())
        .unwrap_or_default();
    if !global.quiet {
        println!("{} Added sandbox {}", style("✓").green(), style(&name).cyan());
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;

    if !product.environments.sandboxes.contains_name(&args.name) {
        return Err(miette::miette!("No sandbox named '{}'", args.name));
    }
    if !product.environments.remove_sandbox(&args.name) {
        return Err(miette::miette!(
            help = "Remove the deployments in it first",
            "Sandbox '{}' still has deployments",
            args.name
        ));
    }

    save_product(&store, &product)?;
    if !global.quiet {
        println!("{} Removed sandbox {}", style("✓").green(), style(&args.name).cyan());
    }
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let sandboxes = &mut product.environments.sandboxes;

    if !sandboxes.contains_name(&args.name) {
        return Err(miette::miette!("No sandbox named '{}'", args.name));
    }
    if !sandboxes.rename(&args.name, args.new_name.as_str()) {
        return Err(miette::miette!(
            "Cannot rename '{}' to '{}': the name is empty or already taken",
            args.name,
            args.new_name
        ));
    }

    save_product(&store, &product)?;
    if !global.quiet {
        println!(
            "{} Renamed sandbox {} → {}",
            style("✓").green(),
            style(&args.name).dim(),
            style(&args.new_name).cyan()
        );
    }
    Ok(())
}
