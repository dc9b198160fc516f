//! In-memory collaborators for orchestrator tests

use super::{
  ArtifactoryService, LifecycleService, QueryParams, ReleaseBundleDetails, ResultItem, ResultReader, SearchResults,
};
use crate::core::error::{RbError, RbResult};
use crate::sources::{CreationRequest, Source};
use crate::spec::FileGroup;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Scripted artifact repository
#[derive(Default)]
pub struct FakeArtifactory {
  pub version: String,
  /// Rows returned per searched pattern
  pub rows: HashMap<String, Vec<ResultItem>>,
  /// Latest build number per build name
  pub latest_builds: HashMap<String, String>,
  pub search_error: Option<String>,
  pub reader_error: Option<String>,
  pub cleanup_error: Option<String>,
  pub cleanup_calls: Rc<Cell<usize>>,
  pub searched_patterns: RefCell<Vec<String>>,
}

impl FakeArtifactory {
  pub fn with_version(version: &str) -> Self {
    Self {
      version: version.to_string(),
      ..Default::default()
    }
  }

  pub fn with_rows(mut self, pattern: &str, rows: Vec<ResultItem>) -> Self {
    self.rows.insert(pattern.to_string(), rows);
    self
  }

  pub fn with_latest_build(mut self, name: &str, number: &str) -> Self {
    self.latest_builds.insert(name.to_string(), number.to_string());
    self
  }
}

pub fn row(repo: &str, path: &str, name: &str, sha256: &str) -> ResultItem {
  ResultItem {
    repo: repo.to_string(),
    path: path.to_string(),
    name: name.to_string(),
    sha256: sha256.to_string(),
  }
}

impl ArtifactoryService for FakeArtifactory {
  fn version(&self) -> RbResult<String> {
    Ok(self.version.clone())
  }

  fn search_files(&self, groups: &[&FileGroup]) -> RbResult<SearchResults> {
    if let Some(message) = &self.search_error {
      return Err(RbError::message(message.clone()));
    }

    let mut readers: Vec<ResultReader> = Vec::new();
    for group in groups {
      self.searched_patterns.borrow_mut().push(group.pattern.clone());
      let mut items: Vec<RbResult<ResultItem>> = self
        .rows
        .get(&group.pattern)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(Ok)
        .collect();
      if let Some(message) = &self.reader_error {
        items.push(Err(RbError::message(message.clone())));
      }
      readers.push(Box::new(items.into_iter()));
    }

    let calls = Rc::clone(&self.cleanup_calls);
    let cleanup_error = self.cleanup_error.clone();
    Ok(SearchResults {
      readers,
      cleanup: Some(Box::new(move || {
        calls.set(calls.get() + 1);
        match cleanup_error {
          Some(message) => Err(RbError::message(message)),
          None => Ok(()),
        }
      })),
    })
  }

  fn latest_build_number(&self, build_name: &str, _project: &str) -> RbResult<Option<String>> {
    Ok(self.latest_builds.get(build_name).cloned())
  }
}

/// A call captured by `RecordingLifecycle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
  Create {
    details: ReleaseBundleDetails,
    params: QueryParams,
    signing_key: String,
    request: CreationRequest,
    draft: bool,
  },
  Update {
    details: ReleaseBundleDetails,
    params: QueryParams,
    signing_key: String,
    sources: Vec<Source>,
  },
}

/// Lifecycle service that records calls instead of sending them
#[derive(Default)]
pub struct RecordingLifecycle {
  pub calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingLifecycle {
  pub fn single_call(&self) -> RecordedCall {
    let calls = self.calls.borrow();
    assert_eq!(calls.len(), 1, "expected exactly one lifecycle call, got {:?}", calls);
    calls[0].clone()
  }

  pub fn created_request(&self) -> CreationRequest {
    match self.single_call() {
      RecordedCall::Create { request, .. } => request,
      other => panic!("expected a create call, got {:?}", other),
    }
  }
}

impl LifecycleService for RecordingLifecycle {
  fn create_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    request: &CreationRequest,
    draft: bool,
  ) -> RbResult<()> {
    self.calls.borrow_mut().push(RecordedCall::Create {
      details: details.clone(),
      params: params.clone(),
      signing_key: signing_key.to_string(),
      request: request.clone(),
      draft,
    });
    Ok(())
  }

  fn update_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    sources: &[Source],
  ) -> RbResult<()> {
    self.calls.borrow_mut().push(RecordedCall::Update {
      details: details.clone(),
      params: params.clone(),
      signing_key: signing_key.to_string(),
      sources: sources.to_vec(),
    });
    Ok(())
  }
}
