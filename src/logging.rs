use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "NODEDESK_LOG";
const DEFAULT_FILTER: &str = "nodedesk=info";

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Installs a file-backed subscriber. The TUI owns stdout, so nothing is
/// written there. Returns `None` when no log directory is usable.
pub fn init() -> Option<LoggingGuard> {
    let log_dir = ensure_log_dir(state_log_dir())
        .or_else(|| ensure_log_dir(Some(std::env::temp_dir().join("nodedesk").join("logs"))))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "nodedesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

fn state_log_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| crate::config::home_dir().map(|home| home.join(".local").join("state")))
        .map(|base| base.join("nodedesk").join("logs"))
}

fn ensure_log_dir(dir: Option<PathBuf>) -> Option<PathBuf> {
    let dir = dir?;
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
