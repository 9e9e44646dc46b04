// Logger initialization

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "student-assist.log";
const DEFAULT_FILTER: &str = "student_assist=info";

/// Where log events are written
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogTarget {
    /// One-shot commands: stderr, leaving stdout for results
    Stderr,
    /// Full-screen mode: a daily rolling file under the log directory
    File,
}

/// Install the global subscriber.
///
/// For [`LogTarget::File`] the returned guard flushes buffered events when
/// dropped and must be held until the process exits.
pub fn init_logger(config: &LoggingConfig, target: LogTarget) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
            Ok(None)
        }
        LogTarget::File => {
            let (writer, guard) = file_writer(config)?;
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
            Ok(Some(guard))
        }
    }
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.log_dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create log directory {}: {}",
            config.log_dir.display(),
            e
        )
    })?;
    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_writer_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().join("nested").join("logs"),
            filter: DEFAULT_FILTER.to_string(),
        };

        let (_writer, guard) = file_writer(&config).unwrap();
        drop(guard);

        assert!(config.log_dir.is_dir());
    }
}
