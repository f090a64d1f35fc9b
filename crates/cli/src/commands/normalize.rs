use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};

/// Print the canonical rendering of a snippet file
pub async fn cmd_normalize(file: &Path) -> Result<ExitCode> {
  let source = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("Failed to read {}", file.display()))?;

  let rendered = parser::normalize(&source).with_context(|| format!("Failed to parse {}", file.display()))?;
  print!("{rendered}");

  Ok(ExitCode::SUCCESS)
}
