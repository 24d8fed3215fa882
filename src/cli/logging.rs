//! Log output for the command line tool
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `EOSCFG_LOG` takes an `EnvFilter` directive and wins over `-v`/`-q`.

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

pub const LOG_ENV: &str = "EOSCFG_LOG";

pub fn default_directive(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
