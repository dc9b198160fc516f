//! Command arguments and the checks that run before any backend call

use crate::core::error::{RbResult, UsageError};
use crate::spec::{SpecFiles, parse_spec_vars};
use crate::utils::count_true;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the build name
pub const BUILD_NAME_ENV: &str = "JFROG_CLI_BUILD_NAME";
/// Environment variable holding the build number
pub const BUILD_NUMBER_ENV: &str = "JFROG_CLI_BUILD_NUMBER";
/// Environment variable holding the project key
pub const PROJECT_ENV: &str = "JFROG_CLI_BUILD_PROJECT";

/// Environment lookup, injected so argument handling stays testable
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Arguments of `create`
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
  pub name: String,
  pub version: String,
  pub spec: Option<PathBuf>,
  pub spec_vars: Option<String>,
  /// Deprecated builds-spec file
  pub builds: Option<PathBuf>,
  /// Deprecated release-bundles-spec file
  pub release_bundles: Option<PathBuf>,
  pub source_type_builds: Option<String>,
  pub source_type_release_bundles: Option<String>,
  pub build_name: Option<String>,
  pub build_number: Option<String>,
  pub project: Option<String>,
  pub signing_key: Option<String>,
  pub sync: bool,
  pub draft: bool,
}

/// Arguments of `update`
#[derive(Debug, Clone, Default)]
pub struct UpdateArgs {
  pub name: String,
  pub version: String,
  pub add: bool,
  pub spec: Option<PathBuf>,
  pub spec_vars: Option<String>,
  pub source_type_builds: Option<String>,
  pub source_type_release_bundles: Option<String>,
  pub project: Option<String>,
  pub sync: bool,
}

impl CreateArgs {
  fn single_source_method_count(&self) -> usize {
    count_true(&[self.spec.is_some(), self.builds.is_some(), self.release_bundles.is_some()])
  }

  fn multi_source_method_count(&self) -> usize {
    count_true(&[
      self.source_type_release_bundles.is_some(),
      self.source_type_builds.is_some(),
    ])
  }

  fn build_flags_set(&self) -> bool {
    self.build_name.is_some() || self.build_number.is_some()
  }
}

/// Flag value when given, else the environment variable
pub fn flag_or_env(flag: &Option<String>, var: &str, env: EnvLookup) -> String {
  match flag {
    Some(value) => value.clone(),
    None => env(var).unwrap_or_default(),
  }
}

/// Project key from `--project` or `JFROG_CLI_BUILD_PROJECT`
pub fn project_key(project: &Option<String>, env: EnvLookup) -> String {
  flag_or_env(project, PROJECT_ENV, env)
}

/// Check the combination of creation flags
///
/// `probe_multi_source` runs only when a source-type flag is given, so that
/// those flags fail with a version error against an old backend.
pub fn validate_creation_methods<P>(args: &CreateArgs, env: EnvLookup, probe_multi_source: P) -> RbResult<()>
where
  P: FnOnce() -> RbResult<()>,
{
  let single = args.single_source_method_count();

  if args.multi_source_method_count() > 0 {
    probe_multi_source()?;
    if single > 0 {
      return Err(UsageError::MixedCreationMethods.into());
    }
    return Ok(());
  }

  if single > 1 {
    return Err(UsageError::MultipleCreationMethods.into());
  }

  if single == 0 {
    let env_set = |var: &str| env(var).is_some_and(|v| !v.is_empty());
    if !args.build_flags_set() && !(env_set(BUILD_NAME_ENV) && env_set(BUILD_NUMBER_ENV)) {
      return Err(UsageError::MissingBuildIdentity.into());
    }
  }
  Ok(())
}

/// Derive the creation spec from the flags
///
/// Deprecated spec paths and source-type flags take no spec. An explicit
/// `--spec` wins over build name/number, which are only consulted without it.
pub fn release_bundle_creation_spec(args: &CreateArgs, env: EnvLookup) -> RbResult<Option<SpecFiles>> {
  if args.builds.is_some() || args.release_bundles.is_some() {
    return Ok(None);
  }
  if args.source_type_release_bundles.is_some() || args.source_type_builds.is_some() {
    return Ok(None);
  }
  if let Some(path) = &args.spec {
    return load_spec(path, &args.spec_vars).map(Some);
  }

  let build_name = flag_or_env(&args.build_name, BUILD_NAME_ENV, env);
  let build_number = flag_or_env(&args.build_number, BUILD_NUMBER_ENV, env);
  if !build_name.is_empty() && !build_number.is_empty() {
    debug!(build_name, build_number, "creating spec from build name and number");
    let project = project_key(&args.project, env);
    return Ok(Some(SpecFiles::from_build(&build_name, &build_number, &project)));
  }

  Err(UsageError::MissingCreationSpec.into())
}

/// Check `update` flags
pub fn validate_update_args(args: &UpdateArgs) -> RbResult<()> {
  if !args.add {
    return Err(UsageError::MissingOperation.into());
  }
  let has_source_flags = args.source_type_release_bundles.is_some() || args.source_type_builds.is_some();
  if args.spec.is_none() && !has_source_flags {
    return Err(UsageError::MissingUpdateSources.into());
  }
  Ok(())
}

/// Load a spec file with optional `--spec-vars`
pub fn load_spec(path: &std::path::Path, spec_vars: &Option<String>) -> RbResult<SpecFiles> {
  let vars = spec_vars.as_deref().map(parse_spec_vars).unwrap_or_default();
  SpecFiles::load(path, &vars)
}
