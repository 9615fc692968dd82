//! Logging for wslocate
//!
//! Writes to `wslocate.log` next to the executable, truncated on every run.
//! Call sites tag each line with the component that wrote it:
//!
//! ```no_run
//! wslocate::logging::init();
//! wslocate::logging::info("MAIN", "starting up");
//! ```
//!
//! The level is fixed at `wslocate=info`; no environment variable changes it.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "wslocate.log";
const LOG_FILTER: &str = "wslocate=info";

/// Path of the active log file, set once by [`init`]
static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Get the log file path (same directory as executable)
fn get_log_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

fn open_log_file(path: &Path) -> Option<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Start fresh each run
        .open(path)
        .ok()
}

fn log_filter() -> EnvFilter {
    EnvFilter::new(LOG_FILTER)
}

/// Initialize the global logger. Safe to call more than once; logging is
/// silently disabled when the file cannot be created.
pub fn init() {
    LOG_PATH.get_or_init(|| {
        let path = get_log_path();
        let file = open_log_file(&path)?;

        let installed = tracing_subscriber::registry()
            .with(log_filter())
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(Arc::new(file)),
            )
            .try_init()
            .is_ok();

        installed.then_some(path)
    });
}

/// Where log lines go, if logging is active
pub fn log_path() -> Option<PathBuf> {
    LOG_PATH.get().cloned().flatten()
}

/// Log debug message
pub fn debug(module: &str, message: &str) {
    tracing::debug!(module, "{}", message);
}

/// Log info message
pub fn info(module: &str, message: &str) {
    tracing::info!(module, "{}", message);
}

/// Log warning message
pub fn warn(module: &str, message: &str) {
    tracing::warn!(module, "{}", message);
}

/// Log error message
pub fn error(module: &str, message: &str) {
    tracing::error!(module, "{}", message);
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    info("---", &format!("========== {} ==========", label));
}
