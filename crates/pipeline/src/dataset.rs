//! JSON Lines reading and writing

use std::path::{Path, PathBuf};

use codesift_core::Record;
use serde::Serialize;
use tokio::{
  fs::File,
  io::{AsyncBufReadExt, BufReader},
};

use crate::{PipelineError, Result};

/// Characters of a malformed line shown in logs
const PREVIEW_CHARS: usize = 50;

/// One raw input line with its 1-based line number
#[derive(Debug, Clone)]
pub struct RawLine {
  pub number: usize,
  pub bytes: Vec<u8>,
}

/// Result of decoding one raw line
#[derive(Debug)]
pub enum ParsedLine {
  Record(Record),
  /// Whitespace-only line
  Blank,
  /// Not a JSON object (invalid JSON, invalid UTF-8, or another JSON type)
  Malformed(String),
}

/// Streams an input file line by line without decoding it up front
pub struct DatasetReader {
  path: PathBuf,
  reader: BufReader<File>,
  line_number: usize,
}

impl DatasetReader {
  pub async fn open(path: &Path) -> Result<Self> {
    let file = match File::open(path).await {
      Ok(file) => file,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
      }
      Err(source) => {
        return Err(PipelineError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };
    Ok(Self {
      path: path.to_path_buf(),
      reader: BufReader::new(file),
      line_number: 0,
    })
  }

  /// Next line without its terminator, or `None` at end of file
  pub async fn next_line(&mut self) -> Result<Option<RawLine>> {
    let mut bytes = Vec::new();
    let read = self
      .reader
      .read_until(b'\n', &mut bytes)
      .await
      .map_err(|source| PipelineError::Read {
        path: self.path.clone(),
        source,
      })?;
    if read == 0 {
      return Ok(None);
    }

    if bytes.last() == Some(&b'\n') {
      bytes.pop();
      if bytes.last() == Some(&b'\r') {
        bytes.pop();
      }
    }
    self.line_number += 1;
    Ok(Some(RawLine {
      number: self.line_number,
      bytes,
    }))
  }
}

pub fn parse_line(bytes: &[u8]) -> ParsedLine {
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return ParsedLine::Blank;
  }
  match serde_json::from_slice::<Record>(bytes) {
    Ok(record) => ParsedLine::Record(record),
    Err(e) => ParsedLine::Malformed(e.to_string()),
  }
}

/// Short lossy prefix of a line for diagnostics
pub fn preview(bytes: &[u8]) -> String {
  let text = String::from_utf8_lossy(bytes);
  let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
  if text.chars().count() > PREVIEW_CHARS {
    preview.push_str("...");
  }
  preview
}

/// Write items as JSON Lines, replacing any existing file.
///
/// Non-ASCII text is written as-is rather than escaped.
pub async fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
  let write_err = |source: std::io::Error| PipelineError::Write {
    path: path.to_path_buf(),
    source,
  };

  let mut buf = Vec::new();
  for item in items {
    serde_json::to_writer(&mut buf, item).map_err(|e| write_err(e.into()))?;
    buf.push(b'\n');
  }
  tokio::fs::write(path, buf).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_reads_lines_with_numbers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("in.jsonl");
    std::fs::write(&path, "{\"a\":1}\r\n\n{\"b\":2}").unwrap();

    let mut reader = DatasetReader::open(&path).await.unwrap();
    let first = reader.next_line().await.unwrap().unwrap();
    assert_eq!((first.number, first.bytes.as_slice()), (1, b"{\"a\":1}".as_slice()));
    let second = reader.next_line().await.unwrap().unwrap();
    assert_eq!((second.number, second.bytes.len()), (2, 0));
    let third = reader.next_line().await.unwrap().unwrap();
    assert_eq!((third.number, third.bytes.as_slice()), (3, b"{\"b\":2}".as_slice()));
    assert!(reader.next_line().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = DatasetReader::open(&dir.path().join("absent.jsonl")).await.err().unwrap();
    assert!(matches!(err, PipelineError::InputNotFound(_)));
  }

  #[test]
  fn test_parse_line() {
    assert!(matches!(parse_line(b"{\"correct_code\": \"x\"}"), ParsedLine::Record(_)));
    assert!(matches!(parse_line(b"  \t"), ParsedLine::Blank));
    assert!(matches!(parse_line(b"not json"), ParsedLine::Malformed(_)));
    assert!(matches!(parse_line(b"[1, 2]"), ParsedLine::Malformed(_)));
    assert!(matches!(parse_line(b"{\"a\": \xff}"), ParsedLine::Malformed(_)));
  }

  #[test]
  fn test_preview_truncates() {
    let long = "x".repeat(80);
    assert_eq!(preview(long.as_bytes()), format!("{}...", "x".repeat(50)));
    assert_eq!(preview(b"short"), "short");
  }

  #[tokio::test]
  async fn test_write_preserves_non_ascii_and_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.jsonl");
    std::fs::write(&path, "stale contents\n").unwrap();

    let records: Vec<Record> = vec![
      serde_json::from_value(json!({"z": "ñandú", "a": 1})).unwrap(),
      serde_json::from_value(json!({"code": "print('日本')"})).unwrap(),
    ];
    write_jsonl(&path, &records).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "{\"z\":\"ñandú\",\"a\":1}\n{\"code\":\"print('日本')\"}\n");
  }

  #[tokio::test]
  async fn test_write_empty_creates_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.jsonl");
    write_jsonl::<Record>(&path, &[]).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
  }
}
