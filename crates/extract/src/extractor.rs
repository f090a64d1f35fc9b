//! Snippet extraction strategies
//!
//! Each dataset schema gets its own [`SnippetExtractor`]. Every strategy runs
//! the escape screen before handing a snippet back, so callers only ever see
//! snippets that are worth parsing.

use codesift_core::{ExtractConfig, ExtractSchema, Record, string_field};
use tracing::{debug, trace};

use crate::escape::find_invalid_escape;

/// Pulls a candidate snippet out of a record
pub trait SnippetExtractor: Send + Sync {
  /// The name of this strategy (for logging)
  fn name(&self) -> &str;

  /// Returns the snippet, or `None` when the record has no usable one
  /// (missing field, missing marker, blank snippet, invalid escape).
  fn extract(&self, record: &Record) -> Option<String>;
}

/// Final gate shared by all strategies
fn screen(raw: &str) -> Option<String> {
  if raw.trim().is_empty() {
    trace!("Snippet is blank");
    return None;
  }
  if let Some(seq) = find_invalid_escape(raw) {
    debug!(escape = %seq, "Snippet has invalid escape sequence");
    return None;
  }
  Some(raw.to_string())
}

/// Returns the line following the marker heading, trimmed.
///
/// A line matches the marker when both are equal after trimming. Only the
/// first marker occurrence is considered.
pub fn snippet_after_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
  let marker = marker.trim();
  let mut lines = text.lines();
  lines.by_ref().find(|line| line.trim() == marker)?;
  lines.next().map(str::trim)
}

/// Snippet is the string value of a dedicated code field
#[derive(Debug, Clone)]
pub struct CodeFieldExtractor {
  field: String,
}

impl CodeFieldExtractor {
  pub fn new(field: impl Into<String>) -> Self {
    Self { field: field.into() }
  }

  fn has_field(&self, record: &Record) -> bool {
    record.contains_key(&self.field)
  }
}

impl SnippetExtractor for CodeFieldExtractor {
  fn name(&self) -> &str {
    "code-field"
  }

  fn extract(&self, record: &Record) -> Option<String> {
    let Some(code) = string_field(record, &self.field) else {
      trace!(field = %self.field, "Code field missing or not a string");
      return None;
    };
    screen(code)
  }
}

/// Snippet is the line right after a marker heading inside free-form text
#[derive(Debug, Clone)]
pub struct MarkerLineExtractor {
  field: String,
  marker: String,
}

impl MarkerLineExtractor {
  pub fn new(field: impl Into<String>, marker: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      marker: marker.into(),
    }
  }
}

impl SnippetExtractor for MarkerLineExtractor {
  fn name(&self) -> &str {
    "marker-line"
  }

  fn extract(&self, record: &Record) -> Option<String> {
    let Some(text) = string_field(record, &self.field) else {
      trace!(field = %self.field, "Prompt field missing or not a string");
      return None;
    };
    let Some(raw) = snippet_after_marker(text, &self.marker) else {
      trace!(marker = %self.marker, "Marker absent or on last line");
      return None;
    };
    screen(raw)
  }
}

/// Code field when the record has one, prompt marker otherwise
#[derive(Debug, Clone)]
pub struct AutoExtractor {
  code: CodeFieldExtractor,
  prompt: MarkerLineExtractor,
}

impl SnippetExtractor for AutoExtractor {
  fn name(&self) -> &str {
    "auto"
  }

  fn extract(&self, record: &Record) -> Option<String> {
    if self.code.has_field(record) {
      self.code.extract(record)
    } else {
      self.prompt.extract(record)
    }
  }
}

/// Build the extractor for the configured schema
pub fn extractor_for(config: &ExtractConfig) -> Box<dyn SnippetExtractor> {
  let code = CodeFieldExtractor::new(&config.code_field);
  let prompt = MarkerLineExtractor::new(&config.prompt_field, &config.marker);
  match config.schema {
    ExtractSchema::Code => Box::new(code),
    ExtractSchema::Prompt => Box::new(prompt),
    ExtractSchema::Auto => Box::new(AutoExtractor { code, prompt }),
  }
}
