//! External validator invoked as a subprocess
//!
//! The normalized source is written to a scratch file with a unique name,
//! the executable is run as `<executable> [args...] <scratch-file>`, and the
//! scratch file is removed once the process has finished. The file handle is
//! an RAII guard, so early returns, timeouts and cancellation remove it too.

use std::{
  io::Write,
  path::{Path, PathBuf},
  process::Stdio,
  time::{Duration, Instant},
};

use async_trait::async_trait;
use codesift_core::ValidatorConfig;
use tempfile::NamedTempFile;
use tokio::{process::Command, time::timeout};
use tracing::{debug, error, trace, warn};

use crate::{Result, ValidationOutcome, Validator, ValidatorError};

/// Default per-invocation timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SCRATCH_PREFIX: &str = "codesift-";
const SCRATCH_SUFFIX: &str = ".py";

/// Runs an external executable against each source text
#[derive(Debug, Clone)]
pub struct ProcessValidator {
  /// Resolved path to the executable
  executable: PathBuf,
  /// Arguments placed before the scratch file path
  args: Vec<String>,
  timeout_secs: u64,
  /// Where scratch files are created (system temp dir when unset)
  temp_dir: Option<PathBuf>,
}

impl ProcessValidator {
  /// Create a validator for `executable`.
  ///
  /// Fails with [`ValidatorError::NotFound`] when the executable cannot be
  /// located, so a missing tool is caught before any record is processed.
  pub fn new(executable: impl AsRef<Path>) -> Result<Self> {
    Ok(Self {
      executable: resolve_executable(executable.as_ref())?,
      args: Vec::new(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      temp_dir: None,
    })
  }

  pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
    let executable = config.executable.as_deref().ok_or(ValidatorError::NotConfigured)?;
    let mut validator = Self::new(executable)?
      .with_args(config.args.clone())
      .with_timeout_secs(config.timeout_secs);
    validator.temp_dir = config.temp_dir.clone();
    Ok(validator)
  }

  pub fn with_args(mut self, args: Vec<String>) -> Self {
    self.args = args;
    self
  }

  pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
    self.timeout_secs = timeout_secs;
    self
  }

  pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.temp_dir = Some(dir.into());
    self
  }

  pub fn executable(&self) -> &Path {
    &self.executable
  }

  /// Write the source to a fresh, uniquely named scratch file
  fn scratch_file(&self, source: &str) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SCRATCH_PREFIX).suffix(SCRATCH_SUFFIX);
    let mut file = match &self.temp_dir {
      Some(dir) => builder.tempfile_in(dir),
      None => builder.tempfile(),
    }
    .map_err(ValidatorError::ScratchFile)?;

    file
      .write_all(source.as_bytes())
      .and_then(|_| file.flush())
      .map_err(ValidatorError::ScratchFile)?;
    Ok(file)
  }

  async fn invoke(&self, source_path: &Path) -> Result<ValidationOutcome> {
    let start = Instant::now();

    let mut cmd = Command::new(&self.executable);
    cmd
      .args(&self.args)
      .arg(source_path)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      // A timed-out child is killed when its handle drops
      .kill_on_drop(true);

    trace!(
      executable = %self.executable.display(),
      source_path = %source_path.display(),
      "Spawning validator process"
    );

    let child = match cmd.spawn() {
      Ok(child) => child,
      Err(e) => {
        error!(err = %e, executable = %self.executable.display(), "Failed to spawn validator process");
        return Err(ValidatorError::SpawnFailed(e));
      }
    };

    let output = match timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output()).await {
      Ok(Ok(output)) => output,
      Ok(Err(e)) => {
        error!(err = %e, "Failed to read validator output");
        return Err(e.into());
      }
      Err(_) => {
        warn!(
          timeout_secs = self.timeout_secs,
          elapsed_ms = start.elapsed().as_millis() as u64,
          "Validator timed out"
        );
        return Err(ValidatorError::Timeout(self.timeout_secs));
      }
    };

    let outcome = ValidationOutcome {
      exit_code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    debug!(
      exit_code = ?outcome.exit_code,
      stdout_len = outcome.stdout.len(),
      stderr_len = outcome.stderr.len(),
      elapsed_ms = start.elapsed().as_millis() as u64,
      "Validator finished"
    );
    trace!(stdout = %outcome.stdout, stderr = %outcome.stderr, "Validator output");

    Ok(outcome)
  }
}

#[async_trait]
impl Validator for ProcessValidator {
  fn name(&self) -> &str {
    "process"
  }

  async fn validate(&self, source: &str) -> Result<ValidationOutcome> {
    let scratch = self.scratch_file(source)?;
    let result = self.invoke(scratch.path()).await;

    let path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
      warn!(err = %e, path = %path.display(), "Failed to remove scratch source file");
    }

    result
  }
}

/// Locate the validator executable.
///
/// An existing path is used as-is (made absolute). A bare command name is
/// looked up in PATH.
pub fn resolve_executable(executable: &Path) -> Result<PathBuf> {
  if executable.is_file() {
    return executable
      .canonicalize()
      .map_err(|_| ValidatorError::NotFound(executable.to_path_buf()));
  }

  let is_bare_name = !executable.is_absolute() && executable.components().count() == 1;
  if is_bare_name && let Some(found) = find_in_path(executable) {
    return Ok(found);
  }

  Err(ValidatorError::NotFound(executable.to_path_buf()))
}

/// Find a command in PATH
fn find_in_path(name: &Path) -> Option<PathBuf> {
  let which_cmd = if cfg!(windows) { "where" } else { "which" };

  let output = match std::process::Command::new(which_cmd).arg(name).output() {
    Ok(output) => output,
    Err(e) => {
      debug!(err = %e, "Failed to execute '{which_cmd}'");
      return None;
    }
  };

  if !output.status.success() {
    debug!(name = %name.display(), "Executable not found in PATH");
    return None;
  }

  let path = String::from_utf8_lossy(&output.stdout)
    .lines()
    .next()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())?;

  trace!(path = %path, "Found executable in PATH");
  Some(PathBuf::from(path))
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use tempfile::TempDir;

  /// Validators in these tests run `/bin/sh <script> <scratch-file>`, which
  /// avoids exec'ing a freshly written file.
  fn script_validator(dir: &TempDir, body: &str) -> ProcessValidator {
    let script = dir.path().join("validator.sh");
    std::fs::write(&script, body).unwrap();
    ProcessValidator::new("/bin/sh")
      .unwrap()
      .with_args(vec![script.to_string_lossy().into_owned()])
  }

  fn scratch_dir(dir: &TempDir) -> PathBuf {
    let scratch = dir.path().join("scratch");
    std::fs::create_dir_all(&scratch).unwrap();
    scratch
  }

  fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
  }

  #[tokio::test]
  async fn test_captures_exit_code_and_streams() {
    let dir = TempDir::new().unwrap();
    let validator = script_validator(&dir, "echo out\necho err >&2\nexit 3\n");

    let outcome = validator.validate("x = 1\n").await.unwrap();
    assert_eq!(outcome.exit_code, Some(3));
    assert_eq!(outcome.stdout, "out\n");
    assert_eq!(outcome.stderr, "err\n");
    assert!(!outcome.exited_cleanly());
  }

  #[tokio::test]
  async fn test_scratch_file_holds_source_and_is_removed() {
    let dir = TempDir::new().unwrap();
    let scratch = scratch_dir(&dir);
    let validator = script_validator(&dir, "cat \"$1\"\necho \"$1\" >&2\n").with_temp_dir(&scratch);

    let outcome = validator.validate("print(1 + 1)\n").await.unwrap();
    assert!(outcome.exited_cleanly());
    assert_eq!(outcome.stdout, "print(1 + 1)\n");

    let used = PathBuf::from(outcome.stderr.trim());
    assert!(used.starts_with(&scratch));
    let name = used.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(SCRATCH_PREFIX) && name.ends_with(SCRATCH_SUFFIX));
    assert!(!used.exists());
    assert!(dir_is_empty(&scratch));
  }

  #[tokio::test]
  async fn test_scratch_names_are_unique() {
    let dir = TempDir::new().unwrap();
    let validator = script_validator(&dir, "echo \"$1\"\n");

    let first = validator.validate("a = 1\n").await.unwrap();
    let second = validator.validate("a = 1\n").await.unwrap();
    assert_ne!(first.stdout, second.stdout);
  }

  #[tokio::test]
  async fn test_args_precede_source_path() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("echo.sh");
    std::fs::write(&script, "echo \"$@\"\n").unwrap();
    let validator = ProcessValidator::new("/bin/sh").unwrap().with_args(vec![
      script.to_string_lossy().into_owned(),
      "-W".to_string(),
      "error".to_string(),
    ]);

    let outcome = validator.validate("pass\n").await.unwrap();
    assert!(outcome.stdout.starts_with("-W error "), "got {:?}", outcome.stdout);
    assert!(outcome.stdout.trim_end().ends_with(SCRATCH_SUFFIX));
  }

  #[tokio::test]
  async fn test_timeout_is_error_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let scratch = scratch_dir(&dir);
    let validator = script_validator(&dir, "exec sleep 5\n")
      .with_timeout_secs(1)
      .with_temp_dir(&scratch);

    let start = Instant::now();
    let err = validator.validate("pass\n").await.unwrap_err();
    assert!(matches!(err, ValidatorError::Timeout(1)), "got {err:?}");
    assert!(start.elapsed() < Duration::from_secs(4));
    assert!(dir_is_empty(&scratch));
  }

  #[tokio::test]
  async fn test_undecodable_output_is_replaced() {
    let dir = TempDir::new().unwrap();
    let validator = script_validator(&dir, "printf '\\377oops\\n' >&2\n");

    let outcome = validator.validate("pass\n").await.unwrap();
    assert!(outcome.stderr.contains('\u{FFFD}'));
    assert!(outcome.stderr.contains("oops"));
  }

  #[tokio::test]
  async fn test_missing_temp_dir_is_scratch_error() {
    let dir = TempDir::new().unwrap();
    let validator = script_validator(&dir, "exit 0\n").with_temp_dir(dir.path().join("missing"));

    let err = validator.validate("pass\n").await.unwrap_err();
    assert!(matches!(err, ValidatorError::ScratchFile(_)), "got {err:?}");
  }

  #[test]
  fn test_missing_executable() {
    let err = ProcessValidator::new("/definitely/not/a/validator").unwrap_err();
    assert!(matches!(err, ValidatorError::NotFound(_)));

    let err = ProcessValidator::new("codesift-no-such-command-xyz").unwrap_err();
    assert!(matches!(err, ValidatorError::NotFound(_)));
  }

  #[test]
  fn test_bare_name_resolved_from_path() {
    let validator = ProcessValidator::new("sh").unwrap();
    assert!(validator.executable().is_absolute());
  }

  #[test]
  fn test_from_config_requires_executable() {
    let err = ProcessValidator::from_config(&ValidatorConfig::default()).unwrap_err();
    assert!(matches!(err, ValidatorError::NotConfigured));

    let config = ValidatorConfig {
      executable: Some(PathBuf::from("/bin/sh")),
      args: vec!["-c".to_string()],
      timeout_secs: 7,
      ..Default::default()
    };
    let validator = ProcessValidator::from_config(&config).unwrap();
    assert_eq!(validator.args, vec!["-c"]);
    assert_eq!(validator.timeout_secs, 7);
  }
}
