use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

pub const LOG_ENV: &str = "POMODORO_LOG";

/// `$HOME/.local/share/pomodoro_timer/pomodoro.log`, or the working directory without `HOME`.
pub fn default_log_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("pomodoro_timer")
        .join("pomodoro.log")
}

fn resolve_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_ENV)
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Sends logs to `log_file` when given, otherwise to stderr.
///
/// The terminal UI owns stdout and stderr, so it always passes a file.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = resolve_env_filter(verbose);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| format!("log path {} has no file name", path.display()))?;
            let writer = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(dir)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(writer),
                )
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    tracing::info!(
        started = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=== session log started ==="
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_layout() {
        let path = default_log_path();
        assert!(path.ends_with(".local/share/pomodoro_timer/pomodoro.log"));
    }
}
