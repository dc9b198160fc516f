//! Backend collaborators
//!
//! - **ArtifactoryService**: version query, file search, latest build lookup
//! - **LifecycleService**: release bundle create and update calls
//! - **http**: `PlatformClient`, the reqwest implementation of both
//! - **version**: minimum-version gates

pub mod http;
pub mod version;

#[cfg(test)]
pub mod fake;

use crate::core::error::RbResult;
use crate::sources::{CreationRequest, Source};
use crate::spec::FileGroup;
use serde::Deserialize;

pub use http::PlatformClient;

/// One row of a file search
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
  #[serde(default)]
  pub repo: String,
  #[serde(default)]
  pub path: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub sha256: String,
}

/// Rows of one search; an `Err` item stops reading
pub type ResultReader = Box<dyn Iterator<Item = RbResult<ResultItem>>>;

/// Releases whatever backs the readers
pub type Cleanup = Box<dyn FnOnce() -> RbResult<()>>;

/// Search output: one reader per searched group plus a cleanup callback
pub struct SearchResults {
  pub readers: Vec<ResultReader>,
  pub cleanup: Option<Cleanup>,
}

impl SearchResults {
  pub fn new(readers: Vec<ResultReader>) -> Self {
    Self { readers, cleanup: None }
  }
}

/// Artifact repository queries used during source resolution
pub trait ArtifactoryService {
  /// Version string reported by the backend
  fn version(&self) -> RbResult<String>;

  /// Search artifacts matching the pattern-bearing groups
  fn search_files(&self, groups: &[&FileGroup]) -> RbResult<SearchResults>;

  /// Latest published build number for a build name, if any
  fn latest_build_number(&self, build_name: &str, project: &str) -> RbResult<Option<String>>;
}

/// Release bundle identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseBundleDetails {
  pub name: String,
  pub version: String,
}

/// Optional query parameters shared by lifecycle calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pub project_key: String,
  pub is_async: bool,
}

/// Release bundle lifecycle operations
pub trait LifecycleService {
  fn create_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    request: &CreationRequest,
    draft: bool,
  ) -> RbResult<()>;

  fn update_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    sources: &[Source],
  ) -> RbResult<()>;
}
