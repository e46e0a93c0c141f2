//! src/logging.rs
//! ============================================================================
//! # Logging: Tracing Subscriber Setup
//!
//! File-based structured logging. Terminal stdout belongs to the interactive
//! session (and, in picker mode, to the picked path), so all diagnostics go to
//! a daily-rolling file under the app data dir through a non-blocking writer.
//! The filter honours `RUST_LOG`, defaulting to `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize the global subscriber. The returned guard must be held for the
/// lifetime of the process; dropping it flushes and stops the writer thread.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = rolling::daily(log_dir, "kestrel.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
