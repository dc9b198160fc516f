//! `update --add`: append sources to an existing release bundle

use crate::commands::args::{EnvLookup, UpdateArgs, load_spec, project_key, validate_update_args};
use crate::commands::sources::{AqlPolicy, sources_from_spec};
use crate::core::context::ConnectionOptions;
use crate::core::error::{RbResult, SourceError, UsageError};
use crate::services::version::validate_lifecycle_supported;
use crate::services::{ArtifactoryService, LifecycleService, QueryParams, ReleaseBundleDetails};
use crate::sources::flags::{has_source_flags, sources_from_flags};
use crate::sources::{Source, detect_source_types, validate_creation_sources};
use crate::spec::SpecFiles;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ReleaseBundleUpdateCommand {
  pub details: ReleaseBundleDetails,
  pub params: QueryParams,
  pub spec: Option<SpecFiles>,
  pub source_builds: String,
  pub source_release_bundles: String,
  pub add: bool,
}

impl ReleaseBundleUpdateCommand {
  pub fn run(&self, artifactory: &dyn ArtifactoryService, lifecycle: &dyn LifecycleService) -> RbResult<()> {
    validate_lifecycle_supported(artifactory)?;
    if !self.add {
      return Err(UsageError::MissingOperation.into());
    }

    let sources = self.add_sources(artifactory)?;
    if sources.is_empty() {
      return Err(SourceError::NoUpdateSources.into());
    }

    // Signing is fixed at creation time
    lifecycle.update_release_bundle(&self.details, &self.params, "", &sources)?;
    info!(
      name = %self.details.name,
      version = %self.details.version,
      sources = sources.len(),
      "release bundle updated"
    );
    Ok(())
  }

  fn add_sources(&self, artifactory: &dyn ArtifactoryService) -> RbResult<Vec<Source>> {
    if has_source_flags(&self.source_builds, &self.source_release_bundles) {
      return Ok(sources_from_flags(
        &self.source_builds,
        &self.source_release_bundles,
        &self.params.project_key,
      ));
    }

    let spec = self.spec.as_ref().ok_or(SourceError::NoSpecOrFlags)?;
    let detected = detect_source_types(&spec.files, true)?;
    validate_creation_sources(&detected, true)?;
    sources_from_spec(artifactory, &spec.files, &detected, AqlPolicy::Reject)
  }
}

/// Validate flags, load the spec when given, connect, then run
pub fn run_update(args: UpdateArgs, connection: &ConnectionOptions, env: EnvLookup) -> RbResult<()> {
  validate_update_args(&args)?;
  let spec = match &args.spec {
    Some(path) => Some(load_spec(path, &args.spec_vars)?),
    None => None,
  };

  let command = ReleaseBundleUpdateCommand {
    details: ReleaseBundleDetails {
      name: args.name,
      version: args.version,
    },
    params: QueryParams {
      project_key: project_key(&args.project, env),
      is_async: !args.sync,
    },
    spec,
    source_builds: args.source_type_builds.unwrap_or_default(),
    source_release_bundles: args.source_type_release_bundles.unwrap_or_default(),
    add: args.add,
  };

  let context = connection.connect()?;
  info!(platform = %context.server.url, name = %command.details.name, "resolving update sources");
  command.run(context.artifactory(), context.lifecycle())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::fake::{FakeArtifactory, RecordedCall, RecordingLifecycle, row};
  use crate::sources::{ArtifactSource, BuildSource, ReleaseBundleSource};

  fn update_command() -> ReleaseBundleUpdateCommand {
    ReleaseBundleUpdateCommand {
      details: ReleaseBundleDetails {
        name: "app-bundle".to_string(),
        version: "1.0.0".to_string(),
      },
      add: true,
      ..Default::default()
    }
  }

  fn updated_sources(lifecycle: &RecordingLifecycle) -> Vec<Source> {
    match lifecycle.single_call() {
      RecordedCall::Update {
        sources, signing_key, ..
      } => {
        assert!(signing_key.is_empty());
        sources
      }
      other => panic!("expected an update call, got {:?}", other),
    }
  }

  #[test]
  fn test_add_build_from_flag() {
    let artifactory = FakeArtifactory::with_version("7.63.2");
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.source_builds = "name=b1,id=5".to_string();

    command.run(&artifactory, &lifecycle).unwrap();

    assert_eq!(
      updated_sources(&lifecycle),
      vec![Source::Builds {
        builds: vec![BuildSource {
          build_repository: "artifactory-build-info".to_string(),
          build_name: "b1".to_string(),
          build_number: "5".to_string(),
          include_dependencies: false,
        }]
      }]
    );
  }

  #[test]
  fn test_add_from_spec() {
    let artifactory =
      FakeArtifactory::with_version("7.120.0").with_rows("docs/*", vec![row("docs", "guide", "index.html", "f00")]);
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.spec = Some(
      SpecFiles::parse(
        r#"{"files": [{"pattern": "docs/*"}, {"bundle": "base/2", "project": "acme"}]}"#,
        &[],
      )
      .unwrap(),
    );

    command.run(&artifactory, &lifecycle).unwrap();

    assert_eq!(
      updated_sources(&lifecycle),
      vec![
        Source::Artifacts {
          artifacts: vec![ArtifactSource {
            path: "docs/guide/index.html".to_string(),
            sha256: "f00".to_string(),
          }]
        },
        Source::ReleaseBundles {
          release_bundles: vec![ReleaseBundleSource {
            project_key: "acme".to_string(),
            release_bundle_name: "base".to_string(),
            release_bundle_version: "2".to_string(),
            ..Default::default()
          }]
        },
      ]
    );
  }

  #[test]
  fn test_aql_not_accepted() {
    let artifactory = FakeArtifactory::with_version("7.120.0");
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.spec = Some(SpecFiles::parse(r#"{"files": [{"aql": {"items.find": {"repo": "r"}}}]}"#, &[]).unwrap());

    let err = command.run(&artifactory, &lifecycle).unwrap_err();
    assert!(err.to_string().contains("'aql' is not supported"));
    assert!(lifecycle.calls.borrow().is_empty());
  }

  #[test]
  fn test_nothing_resolved() {
    let artifactory = FakeArtifactory::with_version("7.120.0");
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.spec = Some(SpecFiles::parse(r#"{"files": [{"pattern": "empty/*"}]}"#, &[]).unwrap());

    let err = command.run(&artifactory, &lifecycle).unwrap_err();
    assert_eq!(err.to_string(), "at least one source must be provided to update a release bundle");
  }

  #[test]
  fn test_requires_add() {
    let artifactory = FakeArtifactory::with_version("7.120.0");
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.add = false;
    command.source_builds = "name=b1,id=5".to_string();

    let err = command.run(&artifactory, &lifecycle).unwrap_err();
    assert_eq!(err.to_string(), "at least one operation flag must be provided: --add");
  }

  #[test]
  fn test_requires_spec_or_flags() {
    let artifactory = FakeArtifactory::with_version("7.120.0");
    let lifecycle = RecordingLifecycle::default();
    let err = update_command().run(&artifactory, &lifecycle).unwrap_err();
    assert_eq!(err.to_string(), "no spec file or source flags provided");
  }

  #[test]
  fn test_old_backend() {
    let artifactory = FakeArtifactory::with_version("7.60.0");
    let lifecycle = RecordingLifecycle::default();
    let mut command = update_command();
    command.source_release_bundles = "name=rb,version=1".to_string();
    assert!(command.run(&artifactory, &lifecycle).is_err());
    assert!(lifecycle.calls.borrow().is_empty());
  }
}
