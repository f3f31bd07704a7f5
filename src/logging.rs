//! Log set-up for a `haul` run.
//!
//! Every run writes a fresh log file; the last heartbeat of an unattended
//! session uploads it. Console output is only installed for interactive runs.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default session log file
pub const DEFAULT_LOG_FILE: &str = "haul.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub path: PathBuf,
    /// Mirror the log on stderr
    pub console: bool,
    pub debug: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_FILE),
            console: true,
            debug: false,
        }
    }
}

/// The installed logger. Holds the path of the session log file.
#[derive(Debug, Clone)]
pub struct LogHandle {
    path: PathBuf,
}

impl LogHandle {
    pub fn log_path(&self) -> &Path {
        &self.path
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. The log file is truncated.
pub fn init(config: &LogConfig) -> Result<LogHandle> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&config.path)
        .with_context(|| format!("Failed to create log file {}", config.path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.debug)));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Arc::new(file));
    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install logger")?;

    Ok(LogHandle {
        path: config.path.clone(),
    })
}
