//! Subscriber installation
//!
//! Daemon runs log to stderr (plain text when stderr is not a terminal, e.g.
//! under a service manager). While the status panel owns the terminal only the
//! file layer is active; see [`LogConfig::disable_console`].

use anyhow::{Context, Result};
use scenebridge_core::LogConfig;
use std::fs::File;
use std::io::IsTerminal;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

/// Keeps the file writer thread alive; logs written after drop are lost
pub struct LogGuard {
    _guard: WorkerGuard,
}

// RUST_LOG takes precedence over the configured level
fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.parse_level()).into())
        .from_env_lossy()
}

/// Install the global subscriber for `config`
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    if !config.has_output() {
        eprintln!("Warning: console and file logging are both disabled");
    }

    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;

    if config.file_output {
        if let Err(e) = config.cleanup_old_logs() {
            eprintln!("Warning: Failed to cleanup old log files: {}", e);
        }
    }

    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .with_filter(build_filter(config))
    });

    let (file_layer, guard) = if config.file_output {
        let log_path = config.current_log_path();
        let file = File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(build_filter(config));

        (
            Some(layer),
            Some(LogGuard {
                _guard: worker_guard,
            }),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized at level: {}", config.level);
    if config.file_output {
        tracing::info!("Log file path: {:?}", config.current_log_path());
    }

    Ok(guard)
}
