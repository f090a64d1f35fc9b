//! Logging setup for the codesift binary

use std::{
  io::Write,
  path::Path,
  sync::{Arc, Mutex},
};

use codesift_core::LoggingConfig;
use indicatif::ProgressBar;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, fmt::MakeWriter, prelude::*};

/// Stderr log writer that clears the active progress bar while a log line is
/// printed, so spinner redraws and log output do not interleave
#[derive(Clone, Default)]
pub struct ProgressLogWriter {
  active: Arc<Mutex<Option<ProgressBar>>>,
}

impl ProgressLogWriter {
  pub fn attach(&self, pb: &ProgressBar) {
    if let Ok(mut active) = self.active.lock() {
      *active = Some(pb.clone());
    }
  }

  pub fn detach(&self) {
    if let Ok(mut active) = self.active.lock() {
      *active = None;
    }
  }

  fn current(&self) -> Option<ProgressBar> {
    self.active.lock().ok().and_then(|active| active.clone())
  }
}

impl<'a> MakeWriter<'a> for ProgressLogWriter {
  type Writer = LogLine;

  fn make_writer(&'a self) -> Self::Writer {
    LogLine {
      buf: Vec::new(),
      progress: self.current(),
    }
  }
}

/// One formatted event, written to stderr when dropped
pub struct LogLine {
  buf: Vec<u8>,
  progress: Option<ProgressBar>,
}

impl Write for LogLine {
  fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
    self.buf.extend_from_slice(data);
    Ok(data.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

impl Drop for LogLine {
  fn drop(&mut self) {
    if self.buf.is_empty() {
      return;
    }
    let emit = || {
      let _ = std::io::stderr().write_all(&self.buf);
    };
    match &self.progress {
      Some(pb) => pb.suspend(emit),
      None => emit(),
    }
  }
}

/// Parse log level from config string
fn parse_log_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => LevelFilter::OFF,
    "error" => LevelFilter::ERROR,
    "warn" => LevelFilter::WARN,
    "info" => LevelFilter::INFO,
    "debug" => LevelFilter::DEBUG,
    "trace" => LevelFilter::TRACE,
    _ => LevelFilter::INFO,
  }
}

/// Level from `-v` flags, falling back to the configured level
fn effective_level(config: &LoggingConfig, verbose: u8) -> LevelFilter {
  match verbose {
    0 => parse_log_level(&config.level),
    1 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  }
}

/// Initialize logging to stderr through `stderr`, plus a plain-text log file
/// when configured.
///
/// `RUST_LOG` overrides the level. Returns the guard that must be kept alive
/// for the file writer to flush.
pub fn init_logging(config: &LoggingConfig, verbose: u8, stderr: ProgressLogWriter) -> Option<WorkerGuard> {
  let env_filter = EnvFilter::builder()
    .with_default_directive(effective_level(config, verbose).into())
    .from_env_lossy();

  let mut file_error = None;
  let (file_layer, guard) = match config.file.as_deref().map(file_appender) {
    Some(Ok(appender)) => {
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer().with_ansi(false).with_target(true).with_writer(writer);
      (Some(layer), Some(guard))
    }
    Some(Err(e)) => {
      file_error = Some(e);
      (None, None)
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false).with_writer(stderr))
    .with(file_layer)
    .init();

  if let Some(e) = file_error {
    // Fall back to stderr-only logging
    tracing::warn!(err = %e, "Failed to open log file");
  }

  guard
}

fn file_appender(path: &Path) -> std::io::Result<tracing_appender::rolling::RollingFileAppender> {
  let file_name = path
    .file_name()
    .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "log file path has no file name"))?;
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  std::fs::create_dir_all(dir)?;
  Ok(tracing_appender::rolling::never(dir, file_name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_verbose_overrides_config_level() {
    let config = LoggingConfig {
      level: "warn".to_string(),
      file: None,
    };
    assert_eq!(effective_level(&config, 0), LevelFilter::WARN);
    assert_eq!(effective_level(&config, 1), LevelFilter::DEBUG);
    assert_eq!(effective_level(&config, 3), LevelFilter::TRACE);
  }

  #[test]
  fn test_unknown_level_defaults_to_info() {
    assert_eq!(parse_log_level("LOUD"), LevelFilter::INFO);
    assert_eq!(parse_log_level("Off"), LevelFilter::OFF);
  }

  #[test]
  fn test_log_writer_tracks_active_progress_bar() {
    let writer = ProgressLogWriter::default();
    assert!(writer.make_writer().progress.is_none());

    let pb = ProgressBar::hidden();
    writer.attach(&pb);
    let mut line = writer.make_writer();
    assert!(line.progress.is_some());
    line.write_all(b"first ").unwrap();
    line.write_all(b"second\n").unwrap();
    assert_eq!(line.buf, b"first second\n");
    drop(line);

    writer.detach();
    assert!(writer.make_writer().progress.is_none());
  }

  #[test]
  fn test_file_appender_creates_parent_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("logs").join("codesift.log");
    file_appender(&path).unwrap();
    assert!(dir.path().join("logs").is_dir());
  }
}
