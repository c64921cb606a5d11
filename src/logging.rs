use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "resource-hub.log";

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// `<data_dir>/resource-hub/logs`
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("resource-hub").join("logs"))
}

/// `RUST_LOG` wins over the level passed on the command line.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Log to a file since the TUI owns stdout. Falls back to stderr when the
/// file cannot be opened.
pub fn init(level: &str) {
    let opened = logs_dir().ok_or_else(|| "no data directory".to_string()).and_then(|dir| {
        std::fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(LOG_FILE);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map(|file| (path, file))
            .map_err(|err| err.to_string())
    });

    match opened {
        Ok((path, file)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(level))
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %path.display(), "logging initialized");
        }
        Err(error) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(level))
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            tracing::warn!(%error, "failed to open log file; using stderr");
        }
    }
}
