use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "quadtiles.log";

/// Sends tracing output to a daily rolling file under `LOGS_DIR` (default
/// `logs`). Keep the returned guard alive until exit or buffered lines are lost.
pub fn init() -> WorkerGuard {
    let logs_dir = env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string());
    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quadtiles=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
