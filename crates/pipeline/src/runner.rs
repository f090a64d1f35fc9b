//! The per-record validation loop
//!
//! Records are processed strictly one at a time. Anything that goes wrong
//! with a single record becomes a [`RecordOutcome`]; only run-level problems
//! (missing input, unwritable output) are returned as errors.

use std::{path::PathBuf, time::Instant};

use codesift_core::{Config, Record};
use extract::{SnippetExtractor, extractor_for, find_invalid_escape};
use parser::PythonNormalizer;
use tracing::{debug, info, trace, warn};
use validator::{Classifier, ProcessValidator, RejectReason, Validator, Verdict};

use crate::{
  DatasetReader, ParsedLine, RecordOutcome, ReportEntry, Result, RunStatistics,
  dataset::{parse_line, preview, write_jsonl},
};

/// Files used by one run
#[derive(Debug, Clone)]
pub struct RunPaths {
  pub input: PathBuf,
  pub output: PathBuf,
  pub report: Option<PathBuf>,
}

impl RunPaths {
  pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
    Self {
      input: input.into(),
      output: output.into(),
      report: None,
    }
  }

  pub fn with_report(mut self, report: impl Into<PathBuf>) -> Self {
    self.report = Some(report.into());
    self
  }
}

/// Passed to the observer after each record
#[derive(Debug)]
pub struct RecordEvent<'a> {
  /// 1-based input line number
  pub line: usize,
  pub outcome: &'a RecordOutcome,
  /// Counters including this record
  pub stats: &'a RunStatistics,
}

pub struct Pipeline {
  extractor: Box<dyn SnippetExtractor>,
  normalizer: PythonNormalizer,
  validator: Box<dyn Validator>,
  classifier: Classifier,
}

impl Pipeline {
  pub fn new(
    extractor: Box<dyn SnippetExtractor>,
    validator: Box<dyn Validator>,
    classifier: Classifier,
  ) -> Result<Self> {
    Ok(Self {
      extractor,
      normalizer: PythonNormalizer::new()?,
      validator,
      classifier,
    })
  }

  /// Build the production pipeline. Fails when the validator executable is
  /// not configured or cannot be found.
  pub fn from_config(config: &Config) -> Result<Self> {
    let validator = ProcessValidator::from_config(&config.validator)?;
    info!(
      executable = %validator.executable().display(),
      policy = %config.validator.policy,
      schema = %config.extract.schema,
      "Pipeline configured"
    );
    Self::new(
      extractor_for(&config.extract),
      Box::new(validator),
      Classifier::from_config(&config.validator),
    )
  }

  /// Normalize, invoke and classify one snippet that already passed extraction
  pub async fn validate_snippet(&mut self, snippet: &str) -> Verdict {
    let normalized = match self.normalizer.normalize(snippet) {
      Ok(normalized) => normalized,
      Err(e) => {
        debug!(err = %e, "Snippet rejected by parser");
        return Verdict::Rejected(RejectReason::ParseFailed(e.to_string()));
      }
    };

    let outcome = match self.validator.validate(&normalized).await {
      Ok(outcome) => outcome,
      Err(e) => {
        warn!(err = %e, validator = self.validator.name(), "Validator invocation failed");
        return Verdict::Rejected(RejectReason::Invocation(e.to_string()));
      }
    };

    let verdict = self.classifier.classify(&outcome);
    if let Verdict::Rejected(reason) = &verdict {
      debug!(reason = %reason, "Snippet rejected by validator");
    }
    verdict
  }

  /// Check free-standing source text, applying the same escape screen that
  /// extraction applies to record snippets
  pub async fn check_snippet(&mut self, source: &str) -> RecordOutcome {
    if source.trim().is_empty() {
      return RecordOutcome::Filtered;
    }
    if let Some(seq) = find_invalid_escape(source) {
      debug!(escape = %seq, "Source has invalid escape sequence");
      return RecordOutcome::Filtered;
    }
    self.validate_snippet(source).await.into()
  }

  pub async fn process_record(&mut self, record: &Record) -> RecordOutcome {
    let Some(snippet) = self.extractor.extract(record) else {
      trace!(extractor = self.extractor.name(), "No usable snippet");
      return RecordOutcome::Filtered;
    };
    self.validate_snippet(&snippet).await.into()
  }

  pub async fn run(&mut self, paths: &RunPaths) -> Result<RunStatistics> {
    self.run_with(paths, |_| {}).await
  }

  /// Run over the whole input, calling `observer` after every record.
  ///
  /// The output (and report) files are only written once all lines were
  /// read, so a failed run leaves no partial output behind.
  pub async fn run_with<F>(&mut self, paths: &RunPaths, mut observer: F) -> Result<RunStatistics>
  where
    F: FnMut(RecordEvent<'_>),
  {
    let start = Instant::now();
    let mut reader = DatasetReader::open(&paths.input).await?;
    info!(input = %paths.input.display(), "Processing dataset");

    let mut stats = RunStatistics::default();
    let mut accepted: Vec<Record> = Vec::new();
    let mut report: Vec<ReportEntry> = Vec::new();

    while let Some(line) = reader.next_line().await? {
      let record = match parse_line(&line.bytes) {
        ParsedLine::Record(record) => record,
        ParsedLine::Blank => continue,
        ParsedLine::Malformed(err) => {
          stats.malformed += 1;
          warn!(
            line = line.number,
            err = %err,
            preview = %preview(&line.bytes),
            "Skipping malformed line"
          );
          continue;
        }
      };

      let outcome = self.process_record(&record).await;
      stats.record(&outcome);
      if paths.report.is_some() {
        report.push(ReportEntry::new(line.number, &outcome));
      }
      if outcome.is_accepted() {
        accepted.push(record);
      }

      observer(RecordEvent {
        line: line.number,
        outcome: &outcome,
        stats: &stats,
      });
    }

    write_jsonl(&paths.output, &accepted).await?;
    if let Some(report_path) = &paths.report {
      write_jsonl(report_path, &report).await?;
      debug!(path = %report_path.display(), entries = report.len(), "Wrote report");
    }

    info!(
      total = stats.total,
      filtered = stats.filtered,
      accepted = stats.accepted,
      rejected = stats.rejected,
      malformed = stats.malformed,
      elapsed_ms = start.elapsed().as_millis() as u64,
      output = %paths.output.display(),
      "Run complete"
    );
    Ok(stats)
  }
}

impl From<Verdict> for RecordOutcome {
  fn from(verdict: Verdict) -> Self {
    match verdict {
      Verdict::Accepted => RecordOutcome::Accepted,
      Verdict::Rejected(reason) => RecordOutcome::Rejected(reason),
    }
  }
}
