use anyhow::{Context, Result};
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Default directive for a verbosity level.
/// 0 = info, 1 = debug (with hyper connection chatter suppressed), 2+ = trace
fn default_directive(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    }
}

fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose_level)))
}

/// Rotation prefix for a log path: "plex-catalog.log" rotates as
/// plex-catalog.2026-01-17, plex-catalog.2026-01-18, ...
fn rotation_prefix(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
}

fn daily_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

    Ok(RollingFileAppender::new(
        Rotation::DAILY,
        log_dir,
        rotation_prefix(file_name),
    ))
}

/// Install the global subscriber. Logs go to stderr, or to a daily rolling
/// file when `log_file` is set. JSON lines are used when RUST_LOG_JSON=true
/// or stdout is not a terminal.
pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let (writer, ansi) = match log_file {
        Some(path) => (BoxMakeWriter::new(daily_appender(&path)?), false),
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    let registry = Registry::default().with(build_filter(verbose_level, quiet));

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_by_verbosity() {
        assert_eq!(default_directive(0), "info");
        assert!(default_directive(1).starts_with("debug,"));
        assert_eq!(default_directive(2), "trace");
        assert_eq!(default_directive(5), "trace");
    }

    #[test]
    fn test_rotation_prefix() {
        assert_eq!(rotation_prefix("plex-catalog.log"), "plex-catalog");
        assert_eq!(rotation_prefix("server.2026.log"), "server.2026");
        assert_eq!(rotation_prefix("plain"), "plain");
        assert_eq!(rotation_prefix(".hidden"), ".hidden");
    }

    #[test]
    fn test_daily_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("plex-catalog.log");
        daily_appender(&path).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
