//! Command line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    client::ClientCommands, deployment::DeploymentCommands, init::InitArgs,
    migrate::MigrateArgs, options::OptionsArgs, platform::PlatformCommands,
    sandbox::SandboxCommands, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(name = "eoscfg")]
#[command(author, version, about = "Manage Epic Online Services plugin config files")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Config directory (default: discovered from the current directory)
    #[arg(long, short = 'C', global = true, env = "EOSCFG_DIR")]
    pub dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, text otherwise
    #[default]
    Auto,
    /// Pretty JSON
    Json,
    /// Tab-separated values
    Tsv,
    /// Names only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write starter config files
    Init(InitArgs),

    /// Check config files for errors
    Validate(ValidateArgs),

    /// Import the legacy config file into the product config
    Migrate(MigrateArgs),

    /// Manage client credentials
    #[command(subcommand)]
    Client(ClientCommands),

    /// Manage deployments
    #[command(subcommand)]
    Deployment(DeploymentCommands),

    /// Manage sandboxes
    #[command(subcommand)]
    Sandbox(SandboxCommands),

    /// Manage per-platform configs
    #[command(subcommand)]
    Platform(PlatformCommands),

    /// Print the options the SDK would be started with
    Options(OptionsArgs),
}
