//! Per-run counters

use std::fmt;

use serde::Serialize;
use validator::RejectReason;

/// What happened to one parsed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
  Accepted,
  /// No usable snippet (missing field or marker, blank, invalid escape)
  Filtered,
  Rejected(RejectReason),
}

impl RecordOutcome {
  pub fn status(&self) -> &'static str {
    match self {
      RecordOutcome::Accepted => "accepted",
      RecordOutcome::Filtered => "filtered",
      RecordOutcome::Rejected(_) => "rejected",
    }
  }

  pub fn is_accepted(&self) -> bool {
    matches!(self, RecordOutcome::Accepted)
  }
}

/// Counters for one run. `total == filtered + rejected + accepted` always
/// holds; malformed lines are counted separately and are not records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
  /// Records parsed from the input
  pub total: usize,
  /// Records without a usable snippet
  pub filtered: usize,
  /// Records accepted by the validator
  pub accepted: usize,
  /// Records rejected for any reason
  pub rejected: usize,
  /// Subset of `rejected`: snippet did not parse
  pub parse_failed: usize,
  /// Subset of `rejected`: validator could not be run
  pub invocation_failed: usize,
  /// Input lines that were not JSON objects
  pub malformed: usize,
}

impl RunStatistics {
  pub fn record(&mut self, outcome: &RecordOutcome) {
    self.total += 1;
    match outcome {
      RecordOutcome::Accepted => self.accepted += 1,
      RecordOutcome::Filtered => self.filtered += 1,
      RecordOutcome::Rejected(reason) => {
        self.rejected += 1;
        match reason {
          RejectReason::ParseFailed(_) => self.parse_failed += 1,
          RejectReason::Invocation(_) => self.invocation_failed += 1,
          RejectReason::ExitStatus(_) | RejectReason::Diagnostics(_) => {}
        }
      }
    }
  }
}

impl fmt::Display for RunStatistics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Total records processed: {}", self.total)?;
    writeln!(f, "Filtered (no usable snippet): {}", self.filtered)?;
    writeln!(
      f,
      "Rejected: {} (parse failures: {}, invocation failures: {})",
      self.rejected, self.parse_failed, self.invocation_failed
    )?;
    if self.malformed > 0 {
      writeln!(f, "Malformed lines skipped: {}", self.malformed)?;
    }
    write!(f, "Accepted: {}", self.accepted)
  }
}
