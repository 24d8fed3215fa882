//! `eoscfg migrate` command - Import the legacy config file

use console::style;
use miette::Result;

use crate::cli::helpers::print_migration_report;
use crate::cli::GlobalOpts;
use crate::config::{
    Config, ConfigFile, ConfigStore, LegacyConfig, ProductConfig, CURRENT_SCHEMA_VERSION,
};

#[derive(clap::Args, Debug)]
pub struct MigrateArgs {
    /// Import the legacy file again even if it was already imported
    #[arg(long)]
    pub force: bool,

    /// Show what would be imported without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: MigrateArgs, global: &GlobalOpts) -> Result<()> {
    let store = ConfigStore::resolve(global.dir.clone())?;

    let (config, report) = if args.force {
        if !store.exists(LegacyConfig::FILE_NAME) {
            return Err(miette::miette!(
                "No {} found in {}",
                LegacyConfig::FILE_NAME,
                store.dir().display()
            ));
        }
        let mut config = if store.exists(ProductConfig::FILE_NAME) {
            store.load_product_config()?
        } else {
            ProductConfig::default()
        };
        let legacy: LegacyConfig = store.load_file()?;
        let report = config.migrate_from(&legacy);
        (config, Some(report))
    } else {
        let stored_is_current = store.exists(ProductConfig::FILE_NAME)
            && !store.load_product_config()?.needs_migration();
        if stored_is_current {
            if !global.quiet {
                println!(
                    "{} Product config is already at version {}",
                    style("✓").green(),
                    CURRENT_SCHEMA_VERSION
                );
            }
            return Ok(());
        }
        store.load_migrated_product_config()?
    };

    if !global.quiet {
        match &report {
            Some(report) => print_migration_report(report),
            None => println!(
                "{} No legacy config found, updating version only",
                style("→").blue()
            ),
        }
    }

    if args.dry_run {
        if !global.quiet {
            println!("{} Dry run, nothing written", style("→").blue());
        }
        return Ok(());
    }

    let path = store.save_file(&config)?;
    if !global.quiet {
        println!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}
