//! ewtools - launch and housekeeping tools for DCC, screenshot and game workflows
//!
//! Entry point for the `ewtools` binary. It:
//! - Parses the command line ([`Cli`])
//! - Initializes logging (rotating file + console)
//! - Creates a current-thread tokio runtime (subprocesses and HTTP are awaited one at a time)
//! - Runs the selected subcommand and converts its result into the process exit code
//!
//! Exit codes: 0 on success, 1 on any recognized failure, and Houdini's own
//! exit code for `ewtools houdini`.

use anyhow::Result;
use clap::Parser;
use ewtools::cli::{Cli, run};
use ewtools::logging::{default_log_dir, setup_logging};
use ewtools::{APP_NAME, VERSION};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    let _guard = match setup_logging(&log_dir, APP_NAME, cli.verbose, true) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging unavailable: {:#}", e);
            None
        }
    };

    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    match execute(cli) {
        Ok(code) => exit_code(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn execute(cli: Cli) -> Result<i32> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(cli))
}

/// Child exit codes outside 0..=255 are truncated the way a shell would.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}
