use crate::error::{AppError, AppResult};
use crate::modules::system::config::get_data_dir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "ga4-mcp.log";

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.to_rfc3339())
    }
}

pub fn get_log_dir() -> AppResult<PathBuf> {
    let log_dir = get_data_dir()?.join("logs");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)
            .map_err(|e| AppError::Config(format!("Failed to create log directory: {}", e)))?;
    }

    Ok(log_dir)
}

/// Console output goes to stderr: stdout carries protocol frames.
pub fn init_logger(retention_days: u64) {
    let log_dir = match get_log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to initialize log directory: {}", e);
            return;
        }
    };
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let console_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_timer(LocalTimer);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(LocalTimer);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    std::mem::forget(_guard);

    info!("Log system initialized (stderr + {:?})", log_dir);
    if let Err(e) = cleanup_old_logs(&log_dir, retention_days) {
        warn!("Failed to cleanup old logs: {}", e);
    }
}

/// Deletes log files not modified within `days_to_keep` days. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, days_to_keep: u64) -> AppResult<usize> {
    use std::time::{Duration, SystemTime};

    if !log_dir.exists() {
        return Ok(0);
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days_to_keep * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted_count = 0;
    for entry in fs::read_dir(log_dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if modified >= cutoff {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                deleted_count += 1;
                info!("Deleted old log file (expired): {:?}", path.file_name());
            }
            Err(e) => warn!("Failed to delete old log file {:?}: {}", path, e),
        }
    }

    if deleted_count > 0 {
        info!("Log cleanup completed: deleted {} files", deleted_count);
    }
    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_home;
    use std::time::{Duration, SystemTime};

    #[test]
    fn cleanup_removes_only_expired_files() {
        let dir = temp_home("logs");
        let old = dir.join("ga4-mcp.log.2020-01-01");
        let fresh = dir.join("ga4-mcp.log.2026-10-17");
        fs::write(&old, "old").unwrap();
        fs::write(&fresh, "fresh").unwrap();
        fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60))
            .unwrap();

        assert_eq!(cleanup_old_logs(&dir, 7).unwrap(), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn cleanup_of_missing_dir_is_a_no_op() {
        let dir = std::env::temp_dir().join(format!(".ga4-mcp-missing-{}", uuid::Uuid::new_v4()));
        assert_eq!(cleanup_old_logs(&dir, 7).unwrap(), 0);
    }
}
