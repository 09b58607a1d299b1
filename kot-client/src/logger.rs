//! Logging setup
//!
//! Console output plus optional daily-rotating files:
//! - `app/`: application logs, rotated daily and pruned by [`cleanup_old_logs`]
//! - `audit/`: bill lifecycle events (`target: "audit"`), never pruned

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days of application logs kept on disk
pub const LOG_RETENTION_DAYS: i64 = 14;

const APP_LOG_PREFIX: &str = "app";
const AUDIT_LOG_PREFIX: &str = "audit";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Console logging plus file logging under `log_dir` when given.
///
/// `RUST_LOG` overrides `level` for the console. Existing application logs
/// past the retention window are pruned once at startup.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let max_level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);

    let console: BoxedLayer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_filter(env_filter)
            .boxed()
    };
    let mut layers = vec![console];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_dir = log_dir.join(APP_LOG_PREFIX);
        let audit_dir = log_dir.join(AUDIT_LOG_PREFIX);
        fs::create_dir_all(&app_dir)?;
        fs::create_dir_all(&audit_dir)?;

        let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, APP_LOG_PREFIX);
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(filter_fn(|meta| meta.target() != "audit"))
                .with_filter(max_level)
                .boxed(),
        );

        let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_dir, AUDIT_LOG_PREFIX);
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(filter_fn(|meta| meta.target() == "audit"))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    if let Some(dir) = log_dir {
        let removed = cleanup_old_logs(Path::new(dir), LOG_RETENTION_DAYS)?;
        if removed > 0 {
            tracing::info!(removed, "Pruned old log files");
        }
    }
    Ok(())
}

/// Delete application log files older than `keep_days`.
///
/// Only `app/app.YYYY-MM-DD` files are considered; audit logs are kept.
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, keep_days: i64) -> anyhow::Result<usize> {
    let app_dir = log_dir.join(APP_LOG_PREFIX);
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - chrono::Duration::days(keep_days);
    let mut removed = 0;

    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = name
            .strip_prefix(APP_LOG_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };

        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::debug!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}
