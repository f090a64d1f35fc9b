//! Shared types for codesift: configuration and dataset records.

pub mod config;
pub mod error;
pub mod record;

pub use config::{
  ClassificationPolicy, Config, DEFAULT_REJECTION_MARKERS, DatasetConfig, ExtractConfig, ExtractSchema, LoggingConfig,
  PROJECT_CONFIG_FILE, ValidatorConfig,
};
pub use error::{ConfigError, Result};
pub use record::{Record, string_field};
