//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "rocket_catalog={}",
                config.level.to_tracing_level()
            ))
        })
        .map_err(|e| ConfigError::Logging(format!("failed to create log filter: {e}")))?;

    match config.file {
        Some(ref path) => init_file_logging(path, env_filter),
        None => init_stderr_logging(env_filter),
    }
}

fn init_stderr_logging(env_filter: EnvFilter) -> Result<(), ConfigError> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Open the log file for appending, creating it on first use.
fn open_log_file(path: &Path) -> Result<File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ConfigError::Logging(format!("failed to open log file {}: {e}", path.display()))
        })
}

fn init_file_logging(path: &Path, env_filter: EnvFilter) -> Result<(), ConfigError> {
    let file = open_log_file(path)?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_keeps_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket-catalog.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        file.write_all(b"next run\n").unwrap();
        drop(file);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier run\nnext run\n"
        );
    }

    #[test]
    fn test_log_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());

        let err = open_log_file(&dir.path().join("missing/dir/x.log")).unwrap_err();
        assert!(matches!(err, ConfigError::Logging(_)));
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        let config = LoggingConfig::default();
        // The first call may already have lost to another test.
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(ConfigError::Logging(_))
        ));
    }
}
