//! Subscriber setup for the console binary

use anyhow::{Context, Result};
use dmxflow_control::LogConfig;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so `main` holds
/// it until exit. `None` when file output is off.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let level = LevelFilter::from_level(config.parse_level());
    // RUST_LOG overrides the configured level
    let env_filter = || {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };

    let mut guard = None;
    let file_layer = if config.file_output {
        let appender = config
            .file_appender()
            .with_context(|| format!("Could not open log files in {:?}", config.log_dir))?;
        let (writer, worker) = tracing_appender::non_blocking(appender);
        guard = Some(worker);
        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    // stdout carries status lines
    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter())
    });

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        level = %config.level,
        file = config.file_output,
        dir = ?config.log_dir,
        "logging ready"
    );
    Ok(guard)
}
