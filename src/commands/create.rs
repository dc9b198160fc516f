//! `create`: resolve creation sources and submit a new release bundle
//!
//! Flow:
//! 1. Gate on the minimum lifecycle version
//! 2. Probe multi-source support (failure means "not supported")
//! 3. Identify source types from deprecated spec files or the file spec
//! 4. One type: legacy single-source request; several: unified multi-source request

use crate::commands::args::{
  CreateArgs, EnvLookup, project_key, release_bundle_creation_spec, validate_creation_methods,
};
use crate::commands::sources::{AqlPolicy, sources_from_spec};
use crate::core::context::ConnectionOptions;
use crate::core::error::{RbResult, SourceError};
use crate::services::version::{multi_source_capability, supports_multi_source, validate_lifecycle_supported};
use crate::services::{ArtifactoryService, LifecycleService, QueryParams, ReleaseBundleDetails};
use crate::sources::aql::aql_query_from_spec;
use crate::sources::artifacts::artifacts_from_spec;
use crate::sources::builds::{BuildsSpec, builds_from_legacy_spec, builds_from_spec};
use crate::sources::bundles::{
  BundlesSpec, build_manifest_path, bundles_from_spec, update_release_bundle_repo_key_with_project,
  with_repository_keys,
};
use crate::sources::flags::{has_source_flags, sources_from_flags};
use crate::sources::packages::packages_from_spec;
use crate::sources::{
  BuildSource, CreationRequest, ReleaseBundleSource, Source, SourceType, detect_source_types, is_single_source_type,
  validate_and_identify, validate_creation_sources,
};
use crate::spec::{FileGroup, SpecFiles};
use std::path::PathBuf;
use tracing::info;

/// A fully-parsed create request, ready to run against the backend
#[derive(Debug, Clone, Default)]
pub struct ReleaseBundleCreateCommand {
  pub details: ReleaseBundleDetails,
  pub params: QueryParams,
  pub signing_key: String,
  pub spec: Option<SpecFiles>,
  pub draft: bool,
  /// Deprecated builds-spec file
  pub builds_spec_path: Option<PathBuf>,
  /// Deprecated release-bundles-spec file
  pub release_bundles_spec_path: Option<PathBuf>,
  /// Raw `--source-type-builds` value, set only when multi-source is supported
  pub source_builds: String,
  /// Raw `--source-type-release-bundles` value, set only when multi-source is supported
  pub source_release_bundles: String,
}

impl ReleaseBundleCreateCommand {
  pub fn run(&self, artifactory: &dyn ArtifactoryService, lifecycle: &dyn LifecycleService) -> RbResult<()> {
    validate_lifecycle_supported(artifactory)?;
    let multi_source = multi_source_capability(artifactory);

    let source_types = self.identify_source_types(multi_source)?;
    let request = match source_types.first() {
      Some(&source_type) if is_single_source_type(&source_types) => {
        CreationRequest::Single(self.single_source(artifactory, source_type)?)
      }
      _ if multi_source => {
        let mut sources = self.multiple_sources(artifactory)?;
        update_release_bundle_repo_key_with_project(&mut sources);
        CreationRequest::Multi(sources)
      }
      _ => return Err(SourceError::Unidentified.into()),
    };

    lifecycle.create_release_bundle(&self.details, &self.params, &self.signing_key, &request, self.draft)?;

    let manifest = build_manifest_path(&self.params.project_key, &self.details.name, &self.details.version);
    if self.params.is_async {
      info!(manifest = %manifest, "release bundle creation submitted");
    } else {
      info!(manifest = %manifest, "release bundle created");
    }
    Ok(())
  }

  /// Source types named by the deprecated spec files, else by the file spec
  fn identify_source_types(&self, multi_source: bool) -> RbResult<Vec<SourceType>> {
    let mut source_types = Vec::new();
    if self.builds_spec_path.is_some() {
      source_types.push(SourceType::Builds);
    }
    if self.release_bundles_spec_path.is_some() {
      source_types.push(SourceType::ReleaseBundles);
    }
    if let Some(spec) = &self.spec {
      source_types = validate_and_identify(&spec.files, multi_source)?;
    }
    Ok(source_types)
  }

  fn spec_files(&self) -> &[FileGroup] {
    self.spec.as_ref().map(|spec| spec.files.as_slice()).unwrap_or_default()
  }

  fn single_source(&self, artifactory: &dyn ArtifactoryService, source_type: SourceType) -> RbResult<Source> {
    let source = match source_type {
      SourceType::Aql => Source::Aql {
        aql: aql_query_from_spec(self.spec_files()),
      },
      SourceType::Artifacts => Source::Artifacts {
        artifacts: artifacts_from_spec(artifactory, self.spec_files())?,
      },
      SourceType::Builds => {
        let builds = self.build_sources(artifactory)?;
        if builds.is_empty() {
          return Err(SourceError::EmptySource { source_type }.into());
        }
        Source::Builds { builds }
      }
      SourceType::ReleaseBundles => {
        let release_bundles = with_repository_keys(self.release_bundle_sources()?);
        if release_bundles.is_empty() {
          return Err(SourceError::EmptySource { source_type }.into());
        }
        Source::ReleaseBundles { release_bundles }
      }
      SourceType::Packages => {
        let packages = packages_from_spec(self.spec_files());
        if packages.is_empty() {
          return Err(SourceError::EmptySource { source_type }.into());
        }
        Source::Packages { packages }
      }
    };
    Ok(source)
  }

  fn build_sources(&self, artifactory: &dyn ArtifactoryService) -> RbResult<Vec<BuildSource>> {
    match &self.builds_spec_path {
      Some(path) => builds_from_legacy_spec(artifactory, &BuildsSpec::load(path)?),
      None => builds_from_spec(artifactory, self.spec_files()),
    }
  }

  fn release_bundle_sources(&self) -> RbResult<Vec<ReleaseBundleSource>> {
    match &self.release_bundles_spec_path {
      Some(path) => Ok(BundlesSpec::load(path)?.into_sources()),
      None => bundles_from_spec(self.spec_files()),
    }
  }

  /// Source-type flags win over the file spec
  fn multiple_sources(&self, artifactory: &dyn ArtifactoryService) -> RbResult<Vec<Source>> {
    if has_source_flags(&self.source_builds, &self.source_release_bundles) {
      return Ok(sources_from_flags(
        &self.source_builds,
        &self.source_release_bundles,
        &self.params.project_key,
      ));
    }

    let spec = self.spec.as_ref().ok_or(SourceError::NoSpecInput)?;
    let detected = detect_source_types(&spec.files, true)?;
    validate_creation_sources(&detected, true)?;
    sources_from_spec(artifactory, &spec.files, &detected, AqlPolicy::Allow)
  }
}

/// Validate flags, derive the spec, connect, then run
pub fn run_create(args: CreateArgs, connection: &ConnectionOptions, env: EnvLookup) -> RbResult<()> {
  // Connect lazily: pure flag errors must not need a reachable platform
  let mut context = None;
  validate_creation_methods(&args, env, || {
    let ctx = connection.connect()?;
    supports_multi_source(ctx.artifactory())?;
    context = Some(ctx);
    Ok(())
  })?;

  let spec = release_bundle_creation_spec(&args, env)?;
  let context = match context {
    Some(ctx) => ctx,
    None => connection.connect()?,
  };

  let mut command = ReleaseBundleCreateCommand {
    details: ReleaseBundleDetails {
      name: args.name,
      version: args.version,
    },
    params: QueryParams {
      project_key: project_key(&args.project, env),
      is_async: !args.sync,
    },
    signing_key: args.signing_key.unwrap_or_default(),
    spec,
    draft: args.draft,
    builds_spec_path: args.builds,
    release_bundles_spec_path: args.release_bundles,
    ..Default::default()
  };

  if multi_source_capability(context.artifactory()) {
    command.source_builds = args.source_type_builds.unwrap_or_default();
    command.source_release_bundles = args.source_type_release_bundles.unwrap_or_default();
  }

  info!(platform = %context.server.url, name = %command.details.name, "resolving creation sources");
  command.run(context.artifactory(), context.lifecycle())
}
