//! Shared fixtures for pipeline integration tests
//!
//! The external validator is faked with small shell scripts run as
//! `/bin/sh <script> <scratch-file>`. Every script appends the scratch path it
//! was given to `calls.log` before running its body.

use std::path::PathBuf;

use codesift_core::Config;
use pipeline::{Pipeline, RunPaths};
use serde_json::Value;
use tempfile::TempDir;

pub struct Fixture {
  pub dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
  pub fn new() -> Self {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("scratch")).expect("Failed to create scratch dir");
    Self { dir }
  }

  pub fn path(&self, name: &str) -> PathBuf {
    self.dir.path().join(name)
  }

  pub fn scratch_dir(&self) -> PathBuf {
    self.path("scratch")
  }

  /// Write records as compact JSON Lines to `input.jsonl`
  pub fn write_input(&self, records: &[Value]) -> PathBuf {
    let text: String = records
      .iter()
      .map(|r| format!("{}\n", serde_json::to_string(r).unwrap()))
      .collect();
    self.write_raw_input(&text)
  }

  pub fn write_raw_input(&self, text: &str) -> PathBuf {
    let path = self.path("input.jsonl");
    std::fs::write(&path, text).unwrap();
    path
  }

  /// Config whose validator runs `body` as a shell script
  pub fn config(&self, body: &str) -> Config {
    let script = self.path("validator.sh");
    let log = self.path("calls.log");
    std::fs::write(&script, format!("echo \"$1\" >> '{}'\n{body}", log.display())).unwrap();

    let mut config = Config::default();
    config.validator.executable = Some(PathBuf::from("/bin/sh"));
    config.validator.args = vec![script.to_string_lossy().into_owned()];
    config.validator.temp_dir = Some(self.scratch_dir());
    config
  }

  pub fn pipeline(&self, config: &Config) -> Pipeline {
    Pipeline::from_config(config).expect("Failed to build pipeline")
  }

  pub fn paths(&self) -> RunPaths {
    RunPaths::new(self.path("input.jsonl"), self.path("output.jsonl"))
  }

  pub fn output_text(&self) -> String {
    std::fs::read_to_string(self.path("output.jsonl")).unwrap()
  }

  pub fn output_records(&self) -> Vec<Value> {
    self
      .output_text()
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect()
  }

  /// Scratch paths the validator was invoked with, in call order
  pub fn calls(&self) -> Vec<PathBuf> {
    match std::fs::read_to_string(self.path("calls.log")) {
      Ok(text) => text.lines().map(PathBuf::from).collect(),
      Err(_) => Vec::new(),
    }
  }
}
