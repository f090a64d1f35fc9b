//! Dataset filtering pipeline for codesift
//!
//! Reads a JSON Lines dataset, validates each record's snippet and writes the
//! accepted records back out.

mod dataset;
mod error;
mod report;
mod runner;
mod stats;

pub use dataset::{DatasetReader, ParsedLine, RawLine, parse_line, preview, write_jsonl};
pub use error::{PipelineError, Result};
pub use report::ReportEntry;
pub use runner::{Pipeline, RecordEvent, RunPaths};
pub use stats::{RecordOutcome, RunStatistics};
