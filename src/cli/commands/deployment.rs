//! `eoscfg deployment` command - Manage deployments

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;
use uuid::Uuid;

use crate::cli::helpers::{
    join_platforms, load_product, open_store, platforms_using_deployment, save_product, truncate_str,
};
use crate::cli::output::{effective_format, print_header, print_json};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::Deployment;
use crate::core::{guid, SandboxId};

#[derive(Subcommand, Debug)]
pub enum DeploymentCommands {
    /// List deployments
    List,

    /// Add a deployment, registering its sandbox if needed
    Add(AddArgs),

    /// Remove a deployment not used by any platform
    Remove(RemoveArgs),

    /// Rename a deployment
    Rename(RenameArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Deployment ID from the Developer Portal
    #[arg(long)]
    pub deployment_id: Uuid,

    /// Sandbox ID: a GUID or a `p-` pre-production id
    #[arg(long)]
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

pub fn run(cmd: DeploymentCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DeploymentCommands::List => run_list(global),
        DeploymentCommands::Add(args) => run_add(args, global),
        DeploymentCommands::Remove(args) => run_remove(args, global),
        DeploymentCommands::Rename(args) => run_rename(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let product = load_product(&store, global)?;
    let platforms = store.platform_configs()?;
    let deployments = &product.environments.deployments;

    if deployments.is_empty() && global.format != OutputFormat::Json {
        println!("No deployments defined.");
        println!();
        println!(
            "Add one with: {}",
            style("eoscfg deployment add --deployment-id <ID> --sandbox-id <ID>").yellow()
        );
        return Ok(());
    }

    match effective_format(global.format) {
        OutputFormat::Json => {
            let items: Vec<_> = deployments
                .iter()
                .map(|item| {
                    let deployment = item.value();
                    json!({
                        "name": item.name(),
                        "deploymentId": guid::to_stripped_string(&deployment.deployment_id),
                        "sandboxId": deployment.sandbox_id.value(),
                        "platforms": platforms_using_deployment(&platforms, deployment),
                    })
                })
                .collect();
            print_json(&items)?;
        }
        OutputFormat::Id => {
            for name in deployments.names() {
                println!("{}", name);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print_header(&[("NAME", 20), ("DEPLOYMENT ID", 34), ("SANDBOX ID", 34), ("PLATFORMS", 20)]);
            for item in deployments {
                let deployment = item.value();
                println!(
                    "{:<20} {:<34} {:<34} {}",
                    style(truncate_str(item.name(), 20)).cyan(),
                    guid::to_stripped_string(&deployment.deployment_id),
                    deployment.sandbox_id.to_string(),
                    join_platforms(&platforms_using_deployment(&platforms, deployment))
                );
            }
            println!();
            println!("{} deployment(s)", style(deployments.len()).cyan());
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    if args.deployment_id.is_nil() {
        return Err(miette::miette!("Deployment ID must not be the nil GUID"));
    }
    if args.sandbox_id.is_empty() {
        return Err(miette::miette!("Sandbox ID must not be empty"));
    }

    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let deployment = Deployment::new(args.deployment_id, args.sandbox_id);

    if let Some(existing) = product.environments.deployments.find_value(&deployment) {
        return Err(miette::miette!(
            "This deployment is already defined as '{}'",
            existing.name()
        ));
    }

    let added = match &args.name {
        Some(name) => {
            if product.environments.deployments.contains_name(name) {
                return Err(miette::miette!("A deployment named '{}' already exists", name));
            }
            product.environments.add_named_deployment(name, deployment.clone())
        }
        None => product.environments.add_deployment(deployment.clone()),
    };
    if !added {
        return Err(miette::miette!("Could not add deployment"));
    }

    save_product(&store, &product)?;

    let name = product
        .environments
        .deployments
        .find_value(&deployment)
        .map(|item| item.name().to_string())
        .unwrap_or_default();
    tracing::info!(name = %name, "Added deployment");
    if !global.quiet {
        println!("{} Added deployment {}", style("✓").green(), style(&name).cyan());
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let platforms = store.platform_configs()?;

    let Some(deployment) = product
        .environments
        .deployments
        .get(&args.name)
        .map(|item| item.value().clone())
    else {
        return Err(miette::miette!("No deployment named '{}'", args.name));
    };

    let in_use: Vec<Deployment> = platforms
        .iter()
        .map(|(_, config)| config.deployment.clone())
        .collect();
    product
        .environments
        .deployments
        .set_remove_predicate(move |value| !in_use.contains(value));

    if !product.environments.remove_deployment(&args.name) {
        return Err(miette::miette!(
            help = "Assign a different deployment to those platforms first",
            "Deployment '{}' is used by: {}",
            args.name,
            join_platforms(&platforms_using_deployment(&platforms, &deployment))
        ));
    }

    save_product(&store, &product)?;
    if !global.quiet {
        println!("{} Removed deployment {}", style("✓").green(), style(&args.name).cyan());
    }
    Ok(())
}

fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut product = load_product(&store, global)?;
    let deployments = &mut product.environments.deployments;

    if !deployments.contains_name(&args.name) {
        return Err(miette::miette!("No deployment named '{}'", args.name));
    }
    if !deployments.rename(&args.name, args.new_name.as_str()) {
        return Err(miette::miette!(
            "Cannot rename '{}' to '{}': the name is empty or already taken",
            args.name,
            args.new_name
        ));
    }

    save_product(&store, &product)?;
    if !global.quiet {
        println!(
            "{} Renamed deployment {} → {}",
            style("✓").green(),
            style(&args.name).dim(),
            style(&args.new_name).cyan()
        );
    }
    Ok(())
}
