use clap::Parser;
use miette::Result;
use eoscfg::cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    logging::init(&cli.global);
    let global = &cli.global;

    match cli.command {
        Commands::Init(args) => commands::init::run(args, global),
        Commands::Validate(args) => commands::validate::run(args, global),
        Commands::Migrate(args) => commands::migrate::run(args, global),
        Commands::Client(cmd) => commands::client::run(cmd, global),
        Commands::Deployment(cmd) => commands::deployment::run(cmd, global),
        Commands::Sandbox(cmd) => commands::sandbox::run(cmd, global),
        Commands::Platform(cmd) => commands::platform::run(cmd, global),
        Commands::Options(args) => commands::options::run(args, global),
    }
}
