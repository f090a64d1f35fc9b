//! Dataset run command

use std::{io::IsTerminal, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use codesift_core::Config;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{Pipeline, RunPaths};

use crate::logging::ProgressLogWriter;

/// Filter the configured dataset and print the summary.
///
/// Log lines go through `log_writer`, which hides the spinner while they print.
pub async fn cmd_run(config: &Config, no_progress: bool, json: bool, log_writer: &ProgressLogWriter) -> Result<ExitCode> {
  let mut paths = RunPaths::new(&config.dataset.input, &config.dataset.output);
  if let Some(report) = &config.dataset.report {
    paths = paths.with_report(report);
  }

  // Fail on a missing input before looking for the validator
  if !paths.input.is_file() {
    anyhow::bail!("Input file not found: {}", paths.input.display());
  }
  let mut pipeline = Pipeline::from_config(config).context("Failed to set up validator")?;

  let pb = progress_bar(no_progress);
  log_writer.attach(&pb);
  let result = pipeline
    .run_with(&paths, |event| {
      pb.set_message(format!(
        "{} records, {} accepted, {} filtered",
        event.stats.total, event.stats.accepted, event.stats.filtered
      ));
    })
    .await;
  log_writer.detach();
  pb.finish_and_clear();

  let stats = result.with_context(|| format!("Failed to process {}", paths.input.display()))?;

  if json {
    println!("{}", serde_json::to_string_pretty(&stats)?);
  } else {
    println!("{stats}");
    println!("Valid records saved to: {}", paths.output.display());
    if let Some(report) = &paths.report {
      println!("Report saved to: {}", report.display());
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn progress_bar(disabled: bool) -> ProgressBar {
  if disabled || !std::io::stderr().is_terminal() {
    return ProgressBar::hidden();
  }

  let pb = ProgressBar::new_spinner();
  pb.set_style(
    ProgressStyle::default_spinner()
      .template("{spinner:.green} [{elapsed}] {msg}")
      .unwrap(),
  );
  pb.set_message("Starting...");
  pb.enable_steady_tick(Duration::from_millis(120));
  pb
}
