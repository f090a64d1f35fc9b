use std::path::PathBuf;

mod backend;
mod classify;
mod process;

pub use backend::{Result, Validator};
pub use classify::{Classifier, RejectReason, Verdict};
pub use process::{ProcessValidator, resolve_executable};

/// What the external validator did with one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
  /// Exit code, `None` when the process was terminated by a signal
  pub exit_code: Option<i32>,
  /// Captured standard output (lossy UTF-8)
  pub stdout: String,
  /// Captured standard error (lossy UTF-8)
  pub stderr: String,
}

impl ValidationOutcome {
  pub fn exited_cleanly(&self) -> bool {
    self.exit_code == Some(0)
  }
}

/// Errors that can occur while invoking the external validator
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
  #[error("Validator executable not found: {}", .0.display())]
  NotFound(PathBuf),
  #[error("No validator executable configured. Pass --validator or set validator.executable.")]
  NotConfigured,
  #[error("Failed to write scratch source file: {0}")]
  ScratchFile(#[source] std::io::Error),
  #[error("Failed to spawn validator: {0}")]
  SpawnFailed(#[source] std::io::Error),
  #[error("Failed to collect validator output: {0}")]
  Io(#[from] std::io::Error),
  #[error("validator timed out after {0} seconds")]
  Timeout(u64),
}
