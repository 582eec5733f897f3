use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const STUDIO_LOG_FILE: &str = "studio.log";

/// Filter from `RUST_LOG`, falling back to `level`
fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level)),
    }
}

/// Log to stderr
pub fn init_stderr(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Log to a file in `dir`, keeping the terminal free for the studio
///
/// The returned guard flushes pending lines when dropped.
pub fn init_file(level: &str, dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, STUDIO_LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
