//! CLI binary for `sfawesome`.
//!
//! This binary is a thin wrapper that sets up logging and delegates to the library.

use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use sfawesome::{cli, pager, Config, RestRecordService};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "SFAWESOME_LOG";

fn main() -> ExitCode {
    init_logging();
    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let output = cli::run(env::args_os(), Config::load, |config| {
        RestRecordService::connect(&config.salesforce)
    });

    for msg in &output.stderr {
        eprintln!("{msg}");
    }
    if !output.stdout.is_empty() {
        if let Err(e) = pager::show(&output.stdout, output.pager.as_deref()) {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    output.exit_code
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}
