use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log directory: `<data_local_dir>/ewtools/logs`, or `./logs` when
/// the platform has no data directory.
pub fn default_log_dir() -> Utf8PathBuf {
    dirs::data_local_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map(|dir| dir.join("ewtools").join("logs"))
        .unwrap_or_else(|| Utf8PathBuf::from("logs"))
}

fn level_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Setup logging with a daily rotating file and optional console output.
///
/// # Arguments
/// * `log_dir` - Directory for log files
/// * `log_prefix` - Prefix for log files (e.g., "ewtools")
/// * `verbose` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to the console
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &Utf8Path,
    log_prefix: &str,
    verbose: bool,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if console_output {
        // Console mirrors the scripts' terse "LEVEL: message" output
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(level_filter(verbose))
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(level_filter(verbose))
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    tracing::debug!(
        "Logging initialized: dir={}, prefix={}, verbose={}, console={}",
        log_dir,
        log_prefix,
        verbose,
        console_output
    );

    Ok(guard)
}
