//! Integration tests for `rb-lifecycle create`
//!
//! None of these reach a backend: they fail on flags, spec files or
//! server configuration first.

use crate::helpers::{TestDir, assert_failure, run_rb_lifecycle};
use anyhow::Result;

#[test]
fn test_more_than_one_creation_method() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(
    &dir.path,
    &["create", "app", "1.0", "--spec", "spec.json", "--builds", "builds.json"],
    &[],
  )?;
  assert_failure(&output, 1, "exactly one creation source must be supplied");
  Ok(())
}

#[test]
fn test_missing_build_identity() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0"], &[("JFROG_CLI_BUILD_NAME", "svc")])?;
  assert_failure(
    &output,
    1,
    "Either --build-name or JFROG_CLI_BUILD_NAME, and --build-number or JFROG_CLI_BUILD_NUMBER must be defined",
  );
  Ok(())
}

#[test]
fn test_alias() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["rbc", "app", "1.0"], &[])?;
  assert_failure(&output, 1, "JFROG_CLI_BUILD_NUMBER must be defined");
  Ok(())
}

#[test]
fn test_only_build_name_flag_is_not_a_spec() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0", "--build-name", "svc"], &[])?;
  assert_failure(&output, 1, "either the --spec flag must be provided");
  Ok(())
}

#[test]
fn test_unreadable_spec_file() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0", "--spec", "missing.json"], &[])?;
  assert_failure(&output, 1, "Failed to read spec file");
  Ok(())
}

#[test]
fn test_malformed_spec_file() -> Result<()> {
  let dir = TestDir::new()?;
  dir.write_file("spec.json", r#"{"files": [{"pattern": "#)?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0", "--spec", "spec.json"], &[])?;
  assert_failure(&output, 1, "Failed to parse spec file");
  Ok(())
}

#[test]
fn test_missing_platform_url() -> Result<()> {
  let dir = TestDir::new()?;
  dir.write_file("spec.json", r#"{"files": [{"pattern": "libs/*.jar"}]}"#)?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0", "--spec", "spec.json"], &[])?;
  assert_failure(&output, 1, "platform URL is mandatory for lifecycle commands");
  Ok(())
}

#[test]
fn test_build_identity_from_env_needs_platform() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(
    &dir.path,
    &["create", "app", "1.0"],
    &[("JFROG_CLI_BUILD_NAME", "svc"), ("JFROG_CLI_BUILD_NUMBER", "7")],
  )?;
  assert_failure(&output, 1, "platform URL is mandatory");
  Ok(())
}

#[test]
fn test_source_flags_probe_platform_first() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(
    &dir.path,
    &[
      "create",
      "app",
      "1.0",
      "--source-type-builds",
      "name=svc,id=1",
      "--spec",
      "spec.json",
    ],
    &[],
  )?;
  // The multi-source probe needs the platform before the mixed-methods check
  assert_failure(&output, 1, "platform URL is mandatory");
  Ok(())
}

#[test]
fn test_invalid_config_file() -> Result<()> {
  let dir = TestDir::new()?;
  dir.write_file("spec.json", r#"{"files": [{"pattern": "libs/*.jar"}]}"#)?;
  dir.write_file(".jfrog/lifecycle.toml", "[server\nurl = ")?;
  let output = run_rb_lifecycle(&dir.path, &["create", "app", "1.0", "--spec", "spec.json"], &[])?;
  assert_failure(&output, 1, "invalid config file");
  Ok(())
}
