//! Logging setup shared by the binaries.
//!
//! `BOTDASH_LOG` (EnvFilter syntax) overrides the configured level.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BOTDASH_LOG";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Append to a file. Used by the TUI, which owns the terminal.
    File(PathBuf),
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str, sink: LogSink) -> std::io::Result<()> {
    let result = match sink {
        LogSink::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter(level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter(level))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
    Ok(())
}
