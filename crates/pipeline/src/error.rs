use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures. Per-record problems never surface here; they become
/// outcomes instead.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Input file not found: {}", .0.display())]
  InputNotFound(PathBuf),

  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Validator(#[from] validator::ValidatorError),

  #[error(transparent)]
  Parser(#[from] parser::ParseError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
