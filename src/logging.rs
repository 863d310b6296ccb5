use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Directory holding `taskweb.log`, next to the session file.
pub fn log_dir() -> PathBuf {
    let mut p = crate::session::session_path();
    p.pop();
    p
}

/// Installs a file-backed subscriber. Filter comes from `TASKWEB_LOG`, default `info`.
///
/// Logs go to a file so they never draw over the TUI. Keep the returned guard
/// alive for the lifetime of the program or buffered lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, "taskweb.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("TASKWEB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
