//! Log routing for the server and the one-shot CLI commands.
//!
//! `docsum serve` logs to stdout. `docsum summarize` and `docsum prefs` print their results on
//! stdout, so their console log goes to stderr and a piped summary stays clean. Every mode also
//! appends to `DOCSUM_LOG_FILE`, or `logs/docsum.log` when that is unset.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` filters both layers (default `info`).
///
/// Pass `quiet_stdout = true` for commands whose stdout is program output.
pub fn init_tracing(quiet_stdout: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = if quiet_stdout {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .boxed()
    } else {
        fmt::layer().with_target(false).compact().boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

const DEFAULT_LOG_FILE: &str = "logs/docsum.log";

fn log_file_path() -> PathBuf {
    std::env::var_os("DOCSUM_LOG_FILE")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Open the log file for appending, creating its directory when needed.
///
/// Returns `None` when either step fails; console logging still works in that case.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
