//! Release-bundles creation source and release bundle repository naming

use super::identifier::split_identifier;
use super::types::{ReleaseBundleSource, Source};
use crate::core::error::{RbResult, ResolutionError, ResultExt};
use crate::spec::FileGroup;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const RELEASE_BUNDLES_V2: &str = "release-bundles-v2";
const MANIFEST_NAME: &str = "release-bundle.json.evd";

/// Repository holding release bundles of a project
pub fn build_repo_key(project: &str) -> String {
  if project.is_empty() || project == "default" {
    RELEASE_BUNDLES_V2.to_string()
  } else {
    format!("{}-{}", project, RELEASE_BUNDLES_V2)
  }
}

/// Path of a release bundle manifest inside its repository
pub fn build_manifest_path(project: &str, name: &str, version: &str) -> String {
  format!("{}/{}/{}/{}", build_repo_key(project), name, version, MANIFEST_NAME)
}

/// Parse `<name>/<version>` into a release bundle reference
pub fn parse_bundle_identifier(identifier: &str, project: &str) -> Result<ReleaseBundleSource, ResolutionError> {
  let (name, version) = split_identifier(identifier).ok_or_else(|| ResolutionError::BundleIdentifier {
    identifier: identifier.to_string(),
  })?;
  if name.is_empty() || version.is_empty() {
    return Err(ResolutionError::InvalidBundle { name, version });
  }
  Ok(ReleaseBundleSource {
    project_key: project.to_string(),
    release_bundle_name: name,
    release_bundle_version: version,
    ..Default::default()
  })
}

/// Parse the `bundle` entries of a file spec
pub fn bundles_from_spec(groups: &[FileGroup]) -> RbResult<Vec<ReleaseBundleSource>> {
  let mut bundles = Vec::new();
  for group in groups.iter().filter(|g| !g.bundle.is_empty()) {
    bundles.push(parse_bundle_identifier(&group.bundle, &group.project)?);
  }
  Ok(bundles)
}

/// Deprecated `--release-bundles` file: `{"releaseBundles": [{"name", "version", "project"}]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlesSpec {
  #[serde(default)]
  pub release_bundles: Vec<BundleSpecEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleSpecEntry {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub project: String,
}

impl BundlesSpec {
  pub fn load(path: &Path) -> RbResult<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("Failed to read release bundles spec {}", path.display()))?;
    let spec: BundlesSpec = serde_json::from_str(&content)
      .with_context(|| format!("Failed to parse release bundles spec {}", path.display()))?;
    Ok(spec)
  }

  pub fn into_sources(self) -> Vec<ReleaseBundleSource> {
    self
      .release_bundles
      .into_iter()
      .map(|entry| ReleaseBundleSource {
        project_key: entry.project,
        release_bundle_name: entry.name,
        release_bundle_version: entry.version,
        ..Default::default()
      })
      .collect()
  }
}

fn project_repository_key(project: &str) -> String {
  format!("{}-{}", project, RELEASE_BUNDLES_V2)
}

/// Derive the repository key of every bundle that names a project
pub fn with_repository_keys(bundles: Vec<ReleaseBundleSource>) -> Vec<ReleaseBundleSource> {
  bundles
    .into_iter()
    .map(|mut bundle| {
      if !bundle.project_key.is_empty() {
        bundle.repository_key = project_repository_key(&bundle.project_key);
      }
      bundle
    })
    .collect()
}

/// Derive repository keys across a multi-source list
///
/// Only runs when the first source is a release-bundles source; a list
/// that merely contains one further down is left untouched.
pub fn update_release_bundle_repo_key_with_project(sources: &mut [Source]) {
  if !matches!(sources.first(), Some(Source::ReleaseBundles { .. })) {
    return;
  }
  for source in sources.iter_mut() {
    if let Source::ReleaseBundles { release_bundles } = source {
      for bundle in release_bundles.iter_mut() {
        if !bundle.project_key.is_empty() {
          bundle.repository_key = project_repository_key(&bundle.project_key);
        }
      }
    }
  }
}
