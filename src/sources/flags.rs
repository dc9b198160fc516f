//! Sources given on the command line
//!
//! `--source-type-builds "name=b1,id=5,include-deps=true;name=b2,id=7"` and
//! `--source-type-release-bundles "name=rb,version=1.0"`: entries are split
//! on `;`, key/value pairs on `,`.

use super::builds::build_info_repository;
use super::types::{BuildSource, ReleaseBundleSource, Source};
use crate::utils::parse_bool;
use std::collections::HashMap;
use tracing::warn;

/// Parse one `k1=v1,k2=v2` entry; malformed pairs are skipped with a warning
pub fn parse_key_value_string(input: &str) -> HashMap<String, String> {
  let mut result = HashMap::new();
  for pair in input.split(',') {
    let Some((key, value)) = pair.split_once('=') else {
      warn!(pair, "Inappropriate format, it should be k=v");
      continue;
    };
    result.insert(key.trim().to_string(), value.trim().to_string());
  }
  result
}

fn entries(value: &str) -> impl Iterator<Item = &str> {
  value.split(';').filter(|entry| !entry.trim().is_empty())
}

/// Builds from `--source-type-builds`
///
/// Keys: `name`, `id` (build number), `include-deps`.
pub fn builds_from_flag(value: &str, project: &str) -> Vec<BuildSource> {
  entries(value)
    .map(|entry| {
      let fields = parse_key_value_string(entry);
      let field = |key: &str| fields.get(key).cloned().unwrap_or_default();
      BuildSource {
        build_repository: build_info_repository(project),
        build_name: field("name"),
        build_number: field("id"),
        include_dependencies: parse_bool(&field("include-deps")).unwrap_or(false),
      }
    })
    .collect()
}

/// Release bundles from `--source-type-release-bundles`
///
/// Keys: `name`, `version`. Every bundle inherits the command's project.
pub fn bundles_from_flag(value: &str, project: &str) -> Vec<ReleaseBundleSource> {
  entries(value)
    .map(|entry| {
      let fields = parse_key_value_string(entry);
      let field = |key: &str| fields.get(key).cloned().unwrap_or_default();
      ReleaseBundleSource {
        project_key: project.to_string(),
        release_bundle_name: field("name"),
        release_bundle_version: field("version"),
        ..Default::default()
      }
    })
    .collect()
}

/// Whether either source-type flag was given
pub fn has_source_flags(builds: &str, release_bundles: &str) -> bool {
  !builds.is_empty() || !release_bundles.is_empty()
}

/// Typed sources from both flags: builds first, then release bundles
pub fn sources_from_flags(builds: &str, release_bundles: &str, project: &str) -> Vec<Source> {
  let mut sources = Vec::new();
  if !builds.is_empty() {
    let builds = builds_from_flag(builds, project);
    if !builds.is_empty() {
      sources.push(Source::Builds { builds });
    }
  }
  if !release_bundles.is_empty() {
    let release_bundles = bundles_from_flag(release_bundles, project);
    if !release_bundles.is_empty() {
      sources.push(Source::ReleaseBundles { release_bundles });
    }
  }
  sources
}
