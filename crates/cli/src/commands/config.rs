//! Configuration commands

use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use codesift_core::Config;

/// Show the effective configuration and where it came from
pub fn cmd_config_show(config: &Config, explicit: Option<&Path>) -> Result<ExitCode> {
  let cwd = std::env::current_dir()?;
  let project_config = Config::project_config_path(&cwd);
  let user_config = Config::user_config_path();

  if let Some(path) = explicit {
    println!("# Using config: {}", path.display());
  } else if project_config.exists() {
    println!("# Using project config: {}", project_config.display());
  } else if let Some(user_path) = user_config.filter(|p| p.exists()) {
    println!("# Using user config: {}", user_path.display());
  } else {
    println!("# Using default configuration (no config file found)");
  }
  println!();
  println!("{}", config.to_toml().context("Failed to render config")?);

  Ok(ExitCode::SUCCESS)
}

/// Write the commented template to ./.codesift.toml
pub fn cmd_config_init(force: bool) -> Result<ExitCode> {
  let cwd = std::env::current_dir()?;
  let config_path = Config::project_config_path(&cwd);

  if config_path.exists() && !force {
    anyhow::bail!(
      "Config file already exists: {} (use --force to overwrite)",
      config_path.display()
    );
  }

  std::fs::write(&config_path, Config::generate_template())
    .with_context(|| format!("Failed to write {}", config_path.display()))?;

  println!("Created project config: {}", config_path.display());
  println!("Set validator.executable before running `codesift run`.");

  Ok(ExitCode::SUCCESS)
}
