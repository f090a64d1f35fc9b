//! Validator trait for ground-truth checks
//!
//! This module defines the `Validator` trait that external checkers implement.
//! The pipeline only talks to this trait, so tests can swap in an in-process
//! implementation.

use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{ValidationOutcome, ValidatorError};

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Trait for ground-truth validators
#[async_trait]
pub trait Validator: Send + Sync + DynClone {
  /// The name of this validator (for logging/identification)
  fn name(&self) -> &str;

  /// Run the validator over one normalized source text.
  ///
  /// An `Err` means the validator could not produce an outcome at all
  /// (launch failure, I/O error, timeout). Callers treat it as a rejection
  /// of the current record only.
  async fn validate(&self, source: &str) -> Result<ValidationOutcome>;
}

dyn_clone::clone_trait_object!(Validator);
