//! Single-file validation

use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use codesift_core::Config;
use pipeline::{Pipeline, RecordOutcome};

/// Validate one snippet file. Exits 1 unless it is accepted.
pub async fn cmd_check(config: &Config, file: &Path) -> Result<ExitCode> {
  let source = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("Failed to read {}", file.display()))?;
  let mut pipeline = Pipeline::from_config(config).context("Failed to set up validator")?;

  let outcome = pipeline.check_snippet(&source).await;
  match &outcome {
    RecordOutcome::Accepted => println!("accepted: {}", file.display()),
    RecordOutcome::Filtered => println!(
      "filtered: {} (blank or contains an invalid escape sequence)",
      file.display()
    ),
    RecordOutcome::Rejected(reason) => println!("rejected: {} ({reason})", file.display()),
  }

  Ok(if outcome.is_accepted() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}
