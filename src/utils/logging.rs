use std::{path::Path, sync::LazyLock};

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Sends diagnostics to `log_file` and to the console. Only called when debugging was requested,
/// otherwise no subscriber exists and every `tracing` call is a no-op.
pub fn enable_logging(log_file: &Path, level: LevelFilter) -> Result<()> {
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("Log file {log_file:?} has no file name"))?
        .to_string_lossy()
        .to_string();

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(std::io::stderr.and(appender))
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
