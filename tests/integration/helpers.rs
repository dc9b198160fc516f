//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Environment variables that would leak the host setup into a test run
const SCRUBBED_ENV: &[&str] = &[
  "JF_URL",
  "JF_ACCESS_TOKEN",
  "JF_USER",
  "JF_PASSWORD",
  "JFROG_CLI_BUILD_NAME",
  "JFROG_CLI_BUILD_NUMBER",
  "JFROG_CLI_BUILD_PROJECT",
  "RB_LOG",
];

/// An empty working directory for one CLI run
pub struct TestDir {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestDir {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Write a file relative to the directory
  pub fn write_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
    let path = self.path.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", rel))?;
    Ok(path)
  }
}

/// Run rb-lifecycle in `cwd` with a clean environment plus `env`
///
/// Returns the output whatever the exit status.
pub fn run_rb_lifecycle(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_rb-lifecycle");

  let mut command = Command::new(bin);
  command.current_dir(cwd).args(args);
  for var in SCRUBBED_ENV {
    command.env_remove(var);
  }
  for (key, value) in env {
    command.env(key, value);
  }

  command.output().context("Failed to run rb-lifecycle")
}

/// Assert a failed run with the given exit code and a stderr fragment
pub fn assert_failure(output: &Output, code: i32, needle: &str) {
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(
    output.status.code(),
    Some(code),
    "unexpected exit status, stderr:\n{}",
    stderr
  );
  assert!(stderr.contains(needle), "expected '{}' in stderr:\n{}", needle, stderr);
}
