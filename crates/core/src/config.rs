//! Configuration system for codesift with per-project overrides.
//!
//! Config priority: explicit path > project-relative (.codesift.toml) > user (~/.config/codesift/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Project-relative config file name
pub const PROJECT_CONFIG_FILE: &str = ".codesift.toml";

/// Diagnostics that reject a record under the lenient policy
pub const DEFAULT_REJECTION_MARKERS: &[&str] = &["SyntaxWarning: invalid escape sequence", "SyntaxError"];

// ============================================================================
// Dataset Configuration
// ============================================================================

/// Input/output locations for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
  /// JSON Lines file to filter
  pub input: PathBuf,

  /// Where accepted records are written (overwritten each run)
  pub output: PathBuf,

  /// Optional per-record report (one JSON line per parsed record)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub report: Option<PathBuf>,
}

impl Default for DatasetConfig {
  fn default() -> Self {
    Self {
      input: PathBuf::from("dataset.jsonl"),
      output: PathBuf::from("valid_codes.jsonl"),
      report: None,
    }
  }
}

// ============================================================================
// Extraction Configuration
// ============================================================================

/// Which record shape the dataset uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractSchema {
  /// Use the code field when present, otherwise the prompt marker
  #[default]
  Auto,
  /// Snippet is the value of `code_field`
  Code,
  /// Snippet is the line after `marker` inside `prompt_field`
  Prompt,
}

impl ExtractSchema {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExtractSchema::Auto => "auto",
      ExtractSchema::Code => "code",
      ExtractSchema::Prompt => "prompt",
    }
  }
}

impl std::fmt::Display for ExtractSchema {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for ExtractSchema {
  type Err = ConfigError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "auto" => Ok(ExtractSchema::Auto),
      "code" => Ok(ExtractSchema::Code),
      "prompt" => Ok(ExtractSchema::Prompt),
      other => Err(ConfigError::InvalidValue {
        key: "extract.schema",
        value: other.to_string(),
      }),
    }
  }
}

/// Snippet extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
  pub schema: ExtractSchema,

  /// Field holding the code directly (default: "correct_code")
  pub code_field: String,

  /// Field holding free-form prompt text (default: "prompt")
  pub prompt_field: String,

  /// Heading line that precedes the snippet inside the prompt
  pub marker: String,
}

impl Default for ExtractConfig {
  fn default() -> Self {
    Self {
      schema: ExtractSchema::Auto,
      code_field: "correct_code".to_string(),
      prompt_field: "prompt".to_string(),
      marker: "Correct code:".to_string(),
    }
  }
}

// ============================================================================
// Validator Configuration
// ============================================================================

/// How validator diagnostics on stderr are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
  /// Reject only when stderr contains one of the rejection markers
  #[default]
  #[serde(alias = "loose")]
  Lenient,
  /// Reject on any stderr output
  Strict,
}

impl ClassificationPolicy {
  pub fn as_str(&self) -> &'static str {
    match self {
      ClassificationPolicy::Lenient => "lenient",
      ClassificationPolicy::Strict => "strict",
    }
  }
}

impl std::fmt::Display for ClassificationPolicy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for ClassificationPolicy {
  type Err = ConfigError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "lenient" | "loose" => Ok(ClassificationPolicy::Lenient),
      "strict" => Ok(ClassificationPolicy::Strict),
      other => Err(ConfigError::InvalidValue {
        key: "validator.policy",
        value: other.to_string(),
      }),
    }
  }
}

/// External validator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
  /// Path or bare command name of the validator executable
  #[serde(skip_serializing_if = "Option::is_none")]
  pub executable: Option<PathBuf>,

  /// Extra arguments placed before the source file path
  pub args: Vec<String>,

  /// Per-invocation timeout in seconds (default: 30)
  pub timeout_secs: u64,

  pub policy: ClassificationPolicy,

  /// Stderr substrings that reject a record under the lenient policy
  pub rejection_markers: Vec<String>,

  /// Directory for scratch source files (default: system temp dir)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temp_dir: Option<PathBuf>,
}

impl Default for ValidatorConfig {
  fn default() -> Self {
    Self {
      executable: None,
      args: Vec::new(),
      timeout_secs: 30,
      policy: ClassificationPolicy::Lenient,
      rejection_markers: DEFAULT_REJECTION_MARKERS.iter().map(|s| s.to_string()).collect(),
      temp_dir: None,
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level: "error", "warn", "info", "debug", "trace"
  /// Default: "info"
  pub level: String,

  /// Also write logs to this file (no ANSI)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
    }
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
  #[serde(default)]
  pub dataset: DatasetConfig,

  #[serde(default)]
  pub extract: ExtractConfig,

  #[serde(default)]
  pub validator: ValidatorConfig,

  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Load config from an explicit file. Unlike project/user discovery,
  /// a missing or malformed file is an error.
  pub fn load_from(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load config for a project directory, with fallback to user config
  pub fn load_for_project(project_path: &Path) -> Self {
    let project_config = Self::project_config_path(project_path);
    if project_config.exists()
      && let Ok(config) = Self::load_from(&project_config)
    {
      return config;
    }

    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
      && let Ok(config) = Self::load_from(&user_config_path)
    {
      return config;
    }

    Self::default()
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CODESIFT_CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("codesift").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("codesift").join("config.toml"))
  }

  /// Get the project-relative config path
  pub fn project_config_path(project_path: &Path) -> PathBuf {
    project_path.join(PROJECT_CONFIG_FILE)
  }

  /// Render the effective config as TOML
  pub fn to_toml(&self) -> Result<String> {
    Ok(toml::to_string_pretty(self)?)
  }

  /// Generate a commented config file as a string
  pub fn generate_template() -> String {
    let markers = DEFAULT_REJECTION_MARKERS
      .iter()
      .map(|m| format!("\"{m}\""))
      .collect::<Vec<_>>()
      .join(", ");

    format!(
      r#"# codesift configuration
# Place in ./{PROJECT_CONFIG_FILE} (project) or ~/.config/codesift/config.toml (user)

[dataset]
input = "dataset.jsonl"
output = "valid_codes.jsonl"
# Per-record verdicts, one JSON line each:
# report = "report.jsonl"

[extract]
# auto   = use code_field when present, otherwise the prompt marker
# code   = snippet is the value of code_field
# prompt = snippet is the line following `marker` in prompt_field
schema = "auto"
code_field = "correct_code"
prompt_field = "prompt"
marker = "Correct code:"

[validator]
# Executable invoked as `<executable> [args...] <source-file>`
# executable = "../build/bin/main"
args = []
timeout_secs = 30
# lenient = reject when stderr contains a rejection marker
# strict  = reject on any stderr output
policy = "lenient"
rejection_markers = [{markers}]
# temp_dir = "/tmp"

[logging]
level = "info"
# file = "codesift.log"
"#
    )
  }
}
