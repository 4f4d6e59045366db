use std::fs::OpenOptions;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::prelude::*;

use crate::config::LogConfig;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: String, source: std::io::Error },
    #[error("failed to initialize logger: {0}")]
    InitError(String),
}

/// Log to a file: the terminal belongs to the renderer while a game runs.
/// `RUST_LOG` overrides the configured level.
pub fn init_logger(config: &LogConfig) -> Result<(), LoggerError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .map_err(|source| LoggerError::OpenFile {
            path: config.file.display().to_string(),
            source,
        })?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()
        .map_err(|e| LoggerError::InitError(e.to_string()))
}
