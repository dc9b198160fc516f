//! Artifacts creation source: pattern search converted to artifact paths

use super::ArtifactSource;
use crate::core::error::{RbError, RbResult};
use crate::services::{ArtifactoryService, ResultReader, SearchResults};
use crate::spec::FileGroup;
use tracing::debug;

/// Groups that carry a search pattern
pub fn artifact_groups(groups: &[FileGroup]) -> Vec<&FileGroup> {
  groups.iter().filter(|group| !group.pattern.is_empty()).collect()
}

/// Search the pattern groups and convert every row into an artifact source
///
/// The search cleanup callback runs on every path once the search itself
/// succeeded; its error is joined with the conversion result.
pub fn artifacts_from_spec(service: &dyn ArtifactoryService, groups: &[FileGroup]) -> RbResult<Vec<ArtifactSource>> {
  let patterns = artifact_groups(groups);
  debug!(groups = patterns.len(), "searching artifacts");

  let SearchResults { readers, cleanup } = service.search_files(&patterns)?;
  let converted = convert_results(readers);

  match cleanup {
    Some(cleanup) => RbError::join(converted, cleanup()),
    None => converted,
  }
}

fn convert_results(readers: Vec<ResultReader>) -> RbResult<Vec<ArtifactSource>> {
  let mut artifacts = Vec::new();
  for reader in readers {
    for item in reader {
      let item = item?;
      artifacts.push(ArtifactSource {
        path: join_artifact_path(&[&item.repo, &item.path, &item.name]),
        sha256: item.sha256,
      });
    }
  }
  Ok(artifacts)
}

/// Join path segments with `/`, dropping empty and `.` segments
///
/// Search rows for files at a repository root report their path as `.`.
pub fn join_artifact_path(segments: &[&str]) -> String {
  let mut parts: Vec<&str> = Vec::new();
  for segment in segments {
    for part in segment.split('/') {
      match part {
        "" | "." => {}
        ".." => {
          parts.pop();
        }
        other => parts.push(other),
      }
    }
  }
  parts.join("/")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::fake::{FakeArtifactory, row};

  fn group(pattern: &str) -> FileGroup {
    FileGroup {
      pattern: pattern.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_join_artifact_path() {
    assert_eq!(join_artifact_path(&["libs", "org/acme", "app.jar"]), "libs/org/acme/app.jar");
    assert_eq!(join_artifact_path(&["libs", ".", "app.jar"]), "libs/app.jar");
    assert_eq!(join_artifact_path(&["libs", "a/../b/", "app.jar"]), "libs/b/app.jar");
  }

  #[test]
  fn test_rows_are_converted_in_order() {
    let service = FakeArtifactory::with_version("7.114.0")
      .with_rows("a/*.jar", vec![row("a", "lib", "x.jar", "sha-x"), row("a", ".", "y.jar", "sha-y")])
      .with_rows("b/*", vec![row("b", "deep/dir", "z.tgz", "sha-z")]);

    let groups = vec![group("a/*.jar"), FileGroup::default(), group("b/*")];
    let artifacts = artifacts_from_spec(&service, &groups).unwrap();

    let paths: Vec<&str> = artifacts.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(paths, vec!["a/lib/x.jar", "a/y.jar", "b/deep/dir/z.tgz"]);
    assert_eq!(artifacts[0].sha256, "sha-x");
    assert_eq!(*service.searched_patterns.borrow(), vec!["a/*.jar".to_string(), "b/*".to_string()]);
    assert_eq!(service.cleanup_calls.get(), 1);
  }

  #[test]
  fn test_cleanup_error_is_joined_on_success() {
    let service = FakeArtifactory {
      cleanup_error: Some("failed removing temp results".to_string()),
      ..FakeArtifactory::with_version("7.114.0")
    }
    .with_rows("a/*", vec![row("a", ".", "x", "s")]);

    let err = artifacts_from_spec(&service, &[group("a/*")]).unwrap_err();
    assert_eq!(err.to_string(), "failed removing temp results");
    assert_eq!(service.cleanup_calls.get(), 1);
  }

  #[test]
  fn test_reader_and_cleanup_errors_are_both_reported() {
    let service = FakeArtifactory {
      reader_error: Some("corrupt search result".to_string()),
      cleanup_error: Some("failed removing temp results".to_string()),
      ..FakeArtifactory::with_version("7.114.0")
    };

    let err = artifacts_from_spec(&service, &[group("a/*")]).unwrap_err();
    assert!(matches!(err, RbError::Multiple(ref errors) if errors.len() == 2));
    assert_eq!(err.to_string(), "corrupt search result\nfailed removing temp results");
    assert_eq!(service.cleanup_calls.get(), 1);
  }

  #[test]
  fn test_search_error_aborts() {
    let service = FakeArtifactory {
      search_error: Some("search failed".to_string()),
      ..FakeArtifactory::with_version("7.114.0")
    };
    let err = artifacts_from_spec(&service, &[group("a/*")]).unwrap_err();
    assert_eq!(err.to_string(), "search failed");
    assert_eq!(service.cleanup_calls.get(), 0);
  }
}
