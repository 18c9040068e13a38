use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Level;

use crate::error::{AnalyzerError, Result};

pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the process-wide subscriber writing plain lines to `log_file`.
/// Falls back to stderr when the file cannot be opened.
pub fn init(log_file: &Path, level: &str) -> Result<()> {
    let level = parse_level(level);

    if let Some(parent) = log_file.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = fs::create_dir_all(parent);
    }

    let installed = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(level)
            .with_writer(Mutex::new(file))
            .try_init(),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}; logging to stderr", log_file.display());
            tracing_subscriber::fmt()
                .with_max_level(Level::WARN)
                .with_writer(std::io::stderr)
                .try_init()
        }
    };
    installed.map_err(|e| AnalyzerError::Io(std::io::Error::other(e.to_string())))
}

/// First lines of every log: when, who and where.
pub fn log_startup(user: Option<&str>, platform: &str) {
    let started_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    tracing::info!("System Analyzer started.");
    tracing::info!(started_at_unix_s = started_at, "analyzer start time");
    tracing::info!(pid = std::process::id(), "analyzer PID");
    tracing::info!(user = user.unwrap_or("unknown"), "user");
    tracing::info!(platform, "platform");
}
