//! codesift CLI - filter code-snippet datasets through an external validator

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codesift_core::{ClassificationPolicy, Config, ExtractSchema, ValidatorConfig};

mod commands;
mod logging;

use commands::{cmd_check, cmd_config_init, cmd_config_show, cmd_normalize, cmd_run};
use logging::{ProgressLogWriter, init_logging};

#[derive(Parser)]
#[command(name = "codesift", version)]
#[command(about = "Filter code-snippet datasets through an external validator")]
#[command(after_help = "\
QUICK START:
  codesift config init                          # Write ./.codesift.toml
  codesift run --validator python3 --arg -W --arg error
  codesift check snippet.py --validator python3 # Validate a single file

CONFIG LOCATIONS:
  Project: ./.codesift.toml
  User:    ~/.config/codesift/config.toml")]
struct Cli {
  /// Config file to use instead of project/user discovery
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

/// Validator options shared by `run` and `check`
#[derive(Args, Debug, Default)]
pub struct ValidatorArgs {
  /// Validator executable (path or command name)
  #[arg(long, value_name = "EXE")]
  validator: Option<PathBuf>,

  /// Argument passed to the validator before the source path (repeatable)
  #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
  args: Vec<String>,

  /// How validator diagnostics are judged: lenient or strict
  #[arg(long)]
  policy: Option<ClassificationPolicy>,

  /// Per-snippet validator timeout in seconds
  #[arg(long, value_name = "SECS")]
  timeout: Option<u64>,
}

impl ValidatorArgs {
  fn apply(&self, config: &mut ValidatorConfig) {
    if let Some(validator) = &self.validator {
      config.executable = Some(validator.clone());
    }
    if !self.args.is_empty() {
      config.args = self.args.clone();
    }
    if let Some(policy) = self.policy {
      config.policy = policy;
    }
    if let Some(timeout) = self.timeout {
      config.timeout_secs = timeout;
    }
  }
}

#[derive(Args, Debug)]
pub struct RunArgs {
  /// Input dataset (JSON Lines)
  #[arg(short, long, value_name = "FILE")]
  input: Option<PathBuf>,

  /// Output file for accepted records
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Also write per-record verdicts to this file
  #[arg(long, value_name = "FILE")]
  report: Option<PathBuf>,

  /// Dataset schema: auto, code, or prompt
  #[arg(long)]
  schema: Option<ExtractSchema>,

  /// Marker line preceding the snippet in the prompt field
  #[arg(long, value_name = "TEXT")]
  marker: Option<String>,

  /// Don't show the progress spinner
  #[arg(long)]
  no_progress: bool,

  /// Print the summary as JSON
  #[arg(long)]
  json: bool,

  #[command(flatten)]
  validator: ValidatorArgs,
}

impl RunArgs {
  fn apply(&self, config: &mut Config) {
    if let Some(input) = &self.input {
      config.dataset.input = input.clone();
    }
    if let Some(output) = &self.output {
      config.dataset.output = output.clone();
    }
    if let Some(report) = &self.report {
      config.dataset.report = Some(report.clone());
    }
    if let Some(schema) = self.schema {
      config.extract.schema = schema;
    }
    if let Some(marker) = &self.marker {
      config.extract.marker = marker.clone();
    }
    self.validator.apply(&mut config.validator);
  }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
  /// Source file holding one snippet
  file: PathBuf,

  #[command(flatten)]
  validator: ValidatorArgs,
}

/// Subcommands for `codesift config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show current effective configuration
  Show,

  /// Write a commented config template to ./.codesift.toml
  Init {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Filter a dataset, keeping records the validator accepts
  #[command(after_help = "\
EXAMPLES:
  codesift run -i dataset.jsonl -o valid_codes.jsonl --validator ./main
  codesift run --policy strict --report report.jsonl
  codesift run --schema prompt --marker 'Correct code:'")]
  Run(RunArgs),
  /// Validate a single snippet file; exits 1 when rejected
  Check(CheckArgs),
  /// Print the canonical rendering of a snippet file
  Normalize {
    /// Source file to normalize
    file: PathBuf,
  },
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

/// Explicit `--config` must load; otherwise project, then user, then defaults
fn load_config(explicit: Option<&Path>) -> Result<Config> {
  match explicit {
    Some(path) => Config::load_from(path).context("Failed to load config"),
    None => {
      let cwd = std::env::current_dir().context("Failed to read current directory")?;
      Ok(Config::load_for_project(&cwd))
    }
  }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let mut config = load_config(cli.config.as_deref())?;
  let log_writer = ProgressLogWriter::default();
  let _guard = init_logging(&config.logging, cli.verbose, log_writer.clone());

  match cli.command {
    Commands::Run(args) => {
      args.apply(&mut config);
      cmd_run(&config, args.no_progress, args.json, &log_writer).await
    }
    Commands::Check(args) => {
      args.validator.apply(&mut config.validator);
      cmd_check(&config, &args.file).await
    }
    Commands::Normalize { file } => cmd_normalize(&file).await,
    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(&config, cli.config.as_deref()),
      ConfigCommand::Init { force } => cmd_config_init(force),
    },
  }
}
