use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. "movieshelf=debug"
const LOG_ENV: &str = "MOVIESHELF_LOG";
const LOG_FILE_PREFIX: &str = "movieshelf.log";

/// Install the global subscriber.
///
/// Logs go to a daily-rolling file under `log_dir` so stdout stays usable for
/// command output and the terminal UI. With `stderr` set they are also
/// mirrored to stderr. The returned guard flushes the file on drop and must be
/// held until exit.
pub fn init(log_dir: &Path, stderr: bool) -> Result<WorkerGuard> {
  std::fs::create_dir_all(log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

  let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
  let stderr_layer = stderr.then(|| {
    fmt::layer()
      .with_writer(std::io::stderr)
      .with_target(false)
  });

  tracing_subscriber::registry()
    .with(env_filter)
    .with(file_layer)
    .with(stderr_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
