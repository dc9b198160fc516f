//! Integration tests for `rb-lifecycle update`

use crate::helpers::{TestDir, assert_failure, run_rb_lifecycle};
use anyhow::Result;

#[test]
fn test_update_requires_add() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(
    &dir.path,
    &["update", "app", "1.0", "--source-type-builds", "name=b1,id=5"],
    &[],
  )?;
  assert_failure(&output, 1, "at least one operation flag must be provided: --add");
  Ok(())
}

#[test]
fn test_update_requires_sources() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["rbu", "app", "1.0", "--add"], &[])?;
  assert_failure(
    &output,
    1,
    "either --spec or source type flags (--source-type-release-bundles, --source-type-builds) must be provided",
  );
  Ok(())
}

#[test]
fn test_update_unreadable_spec() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(&dir.path, &["update", "app", "1.0", "--add", "--spec", "nope.json"], &[])?;
  assert_failure(&output, 1, "Failed to read spec file");
  Ok(())
}

#[test]
fn test_update_needs_platform() -> Result<()> {
  let dir = TestDir::new()?;
  let output = run_rb_lifecycle(
    &dir.path,
    &["update", "app", "1.0", "--add", "--sources-builds", "name=b1,id=5"],
    &[],
  )?;
  assert_failure(&output, 1, "platform URL is mandatory");
  Ok(())
}
