//! Verdicts from validator outcomes

use std::fmt;

use codesift_core::{ClassificationPolicy, DEFAULT_REJECTION_MARKERS, ValidatorConfig};

use crate::ValidationOutcome;

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
  /// The snippet did not parse
  ParseFailed(String),
  /// The validator exited non-zero or was killed by a signal
  ExitStatus(Option<i32>),
  /// The validator exited zero but reported unwanted diagnostics
  Diagnostics(String),
  /// The validator could not be run (launch failure, I/O, timeout)
  Invocation(String),
}

impl RejectReason {
  pub fn kind(&self) -> &'static str {
    match self {
      RejectReason::ParseFailed(_) => "parse_failed",
      RejectReason::ExitStatus(_) => "exit_status",
      RejectReason::Diagnostics(_) => "diagnostics",
      RejectReason::Invocation(_) => "invocation",
    }
  }
}

impl fmt::Display for RejectReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RejectReason::ParseFailed(msg) => write!(f, "parse failed: {msg}"),
      RejectReason::ExitStatus(Some(code)) => write!(f, "validator exited with status {code}"),
      RejectReason::ExitStatus(None) => write!(f, "validator terminated by signal"),
      RejectReason::Diagnostics(line) => write!(f, "validator diagnostics: {line}"),
      RejectReason::Invocation(msg) => write!(f, "validator invocation failed: {msg}"),
    }
  }
}

/// Final accept/reject decision for one snippet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Accepted,
  Rejected(RejectReason),
}

impl Verdict {
  pub fn is_accepted(&self) -> bool {
    matches!(self, Verdict::Accepted)
  }
}

/// Applies one classification policy consistently for a run
#[derive(Debug, Clone)]
pub struct Classifier {
  policy: ClassificationPolicy,
  markers: Vec<String>,
}

impl Classifier {
  /// Classifier with the default rejection markers
  pub fn new(policy: ClassificationPolicy) -> Self {
    Self {
      policy,
      markers: DEFAULT_REJECTION_MARKERS.iter().map(|s| s.to_string()).collect(),
    }
  }

  pub fn with_markers(mut self, markers: Vec<String>) -> Self {
    // An empty marker would match every stderr
    self.markers = markers.into_iter().filter(|m| !m.is_empty()).collect();
    self
  }

  pub fn from_config(config: &ValidatorConfig) -> Self {
    Self::new(config.policy).with_markers(config.rejection_markers.clone())
  }

  pub fn policy(&self) -> ClassificationPolicy {
    self.policy
  }

  pub fn classify(&self, outcome: &ValidationOutcome) -> Verdict {
    if !outcome.exited_cleanly() {
      return Verdict::Rejected(RejectReason::ExitStatus(outcome.exit_code));
    }

    let offending = match self.policy {
      ClassificationPolicy::Strict => outcome.stderr.lines().map(str::trim).find(|line| !line.is_empty()),
      ClassificationPolicy::Lenient => outcome
        .stderr
        .lines()
        .find(|line| self.markers.iter().any(|m| line.contains(m.as_str())))
        .map(str::trim),
    };

    match offending {
      Some(line) => Verdict::Rejected(RejectReason::Diagnostics(line.to_string())),
      None => Verdict::Accepted,
    }
  }
}
