//! Creation-source types and payloads
//!
//! `SourceType` is the closed set of kinds a file group can declare.
//! `Source` is the tagged union sent to the lifecycle service: each variant
//! carries only its own payload shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of creation source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
  Aql,
  Artifacts,
  Builds,
  ReleaseBundles,
  Packages,
}

impl SourceType {
  /// Wire name used by the lifecycle service
  pub fn as_str(&self) -> &'static str {
    match self {
      SourceType::Aql => "aql",
      SourceType::Artifacts => "artifacts",
      SourceType::Builds => "builds",
      SourceType::ReleaseBundles => "release_bundles",
      SourceType::Packages => "packages",
    }
  }
}

impl fmt::Display for SourceType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One artifact resolved from a pattern search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSource {
  pub path: String,
  #[serde(skip_serializing_if = "String::is_empty", default)]
  pub sha256: String,
}

/// One build reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSource {
  #[serde(skip_serializing_if = "String::is_empty", default)]
  pub build_repository: String,
  pub build_name: String,
  pub build_number: String,
  #[serde(default)]
  pub include_dependencies: bool,
}

/// One nested release bundle reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseBundleSource {
  #[serde(skip_serializing_if = "String::is_empty", default)]
  pub project_key: String,
  #[serde(skip_serializing_if = "String::is_empty", default)]
  pub repository_key: String,
  pub release_bundle_name: String,
  pub release_bundle_version: String,
}

/// One package reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSource {
  pub package_name: String,
  pub package_version: String,
  pub package_type: String,
  pub repository_key: String,
}

/// A typed creation source with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum Source {
  Aql { aql: String },
  Artifacts { artifacts: Vec<ArtifactSource> },
  Builds { builds: Vec<BuildSource> },
  ReleaseBundles { release_bundles: Vec<ReleaseBundleSource> },
  Packages { packages: Vec<PackageSource> },
}

impl Source {
  pub fn source_type(&self) -> SourceType {
    match self {
      Source::Aql { .. } => SourceType::Aql,
      Source::Artifacts { .. } => SourceType::Artifacts,
      Source::Builds { .. } => SourceType::Builds,
      Source::ReleaseBundles { .. } => SourceType::ReleaseBundles,
      Source::Packages { .. } => SourceType::Packages,
    }
  }

  /// Whether the payload holds nothing to add
  pub fn is_empty(&self) -> bool {
    match self {
      Source::Aql { aql } => aql.is_empty(),
      Source::Artifacts { artifacts } => artifacts.is_empty(),
      Source::Builds { builds } => builds.is_empty(),
      Source::ReleaseBundles { release_bundles } => release_bundles.is_empty(),
      Source::Packages { packages } => packages.is_empty(),
    }
  }

  /// The untagged payload object (`{"builds": [...]}` etc.)
  pub fn payload(&self) -> serde_json::Value {
    let mut value = serde_json::to_value(self).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
      map.remove("source_type");
    }
    value
  }
}

/// The final request handed to the lifecycle service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationRequest {
  /// Legacy shape: exactly one source type
  Single(Source),
  /// Unified shape: an ordered list of typed sources
  Multi(Vec<Source>),
}
