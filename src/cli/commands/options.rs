//! `eoscfg options` command - Print the SDK start-up options for a platform

use std::path::PathBuf;

use miette::Result;

use crate::cli::helpers::open_store;
use crate::cli::output::print_json;
use crate::cli::GlobalOpts;
use crate::config::Platform;
use crate::options::{build_sdk_options, BuildContext, LaunchOverrides};

#[derive(clap::Args, Debug)]
pub struct OptionsArgs {
    #[arg(value_enum)]
    pub platform: Platform,

    /// Build the options the editor would use
    #[arg(long)]
    pub in_editor: bool,

    /// Cache directory handed to the SDK
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Game launch arguments, e.g. -eossandboxid=<ID> -eosdeploymentid=<ID>
    #[arg(last = true, allow_hyphen_values = true)]
    pub launch_args: Vec<String>,
}

pub fn run(args: OptionsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let (product, report) = store.load_migrated_product_config()?;
    if let Some(report) = report {
        tracing::info!(
            clients = report.clients_imported,
            deployments = report.deployments_imported,
            "Imported legacy config in memory"
        );
    }
    let config = store.load_platform_config(args.platform)?;

    let overrides = LaunchOverrides::from_args(&args.launch_args);
    if !overrides.is_empty() {
        tracing::info!(?overrides, "Applying launch overrides");
    }

    let context = BuildContext {
        cache_directory: args.cache_dir,
        in_editor: args.in_editor,
        overrides,
    };

    let options = build_sdk_options(&product, args.platform, &config, &context)?;
    print_json(&options)
}
