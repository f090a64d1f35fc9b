//! Optional per-record report

use serde::Serialize;

use crate::RecordOutcome;

/// One report line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
  /// 1-based input line number
  pub line: usize,
  pub status: &'static str,
  /// Rejection kind, e.g. "parse_failed"
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<&'static str>,
  pub reason: Option<String>,
}

impl ReportEntry {
  pub fn new(line: usize, outcome: &RecordOutcome) -> Self {
    let (kind, reason) = match outcome {
      RecordOutcome::Rejected(reason) => (Some(reason.kind()), Some(reason.to_string())),
      RecordOutcome::Accepted | RecordOutcome::Filtered => (None, None),
    };
    Self {
      line,
      status: outcome.status(),
      kind,
      reason,
    }
  }
}
