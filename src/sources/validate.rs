//! File-group validation and source-type detection
//!
//! The `multi_source` flag threads through every function here as a plain
//! parameter. It is true when the backend accepts several source types (and
//! packages) in one request.

use super::types::SourceType;
use crate::core::error::{RbResult, SourceError};
use crate::spec::FileGroup;
use crate::spec::file_spec::flag_or_lenient;
use crate::utils::count_true;
use tracing::debug;

/// Field presence for one file group
struct FieldPresence {
  aql: bool,
  build: bool,
  include_deps: bool,
  bundle: bool,
  project: bool,
  package: bool,
  pattern: bool,
  exclusions: bool,
  props: bool,
  exclude_props: bool,
  recursive: bool,
}

impl FieldPresence {
  fn of(group: &FileGroup) -> Result<Self, SourceError> {
    let recursive = group
      .is_recursive()
      .map_err(|value| SourceError::InvalidRecursive { value })?;

    Ok(Self {
      aql: !group.aql.items_find.is_empty(),
      build: !group.build.is_empty(),
      include_deps: flag_or_lenient(&group.include_deps, false),
      bundle: !group.bundle.is_empty(),
      project: !group.project.is_empty(),
      package: !group.package.is_empty(),
      pattern: !group.pattern.is_empty(),
      exclusions: group.exclusions.first().is_some_and(|e| !e.is_empty()),
      props: !group.props.is_empty(),
      exclude_props: !group.exclude_props.is_empty(),
      recursive,
    })
  }
}

/// Whether any of the fields that never apply to release bundles is set
fn has_unsupported_fields(group: &FileGroup) -> bool {
  let path_mapping = !group.path_mapping.input.is_empty() || !group.path_mapping.output.is_empty();
  let flags = [
    path_mapping,
    !group.target.is_empty(),
    !group.sort_order.is_empty(),
    !group.sort_by.is_empty(),
    flag_or_lenient(&group.exclude_artifacts, false),
    !group.public_gpg_key.is_empty(),
    group.offset > 0,
    group.limit > 0,
    flag_or_lenient(&group.symlinks, false),
    !group.archive.is_empty(),
    group.ant == "true",
    group.regexp == "true",
    flag_or_lenient(&group.explode, false),
    flag_or_lenient(&group.bypass_archive_inspection, false),
    flag_or_lenient(&group.transitive, false),
  ];
  count_true(&flags) > 0
}

fn reject_if_any(forbidden: &[bool], source_type: SourceType) -> Result<SourceType, SourceError> {
  if count_true(forbidden) > 0 {
    return Err(SourceError::FieldsNotAllowed { source_type });
  }
  Ok(source_type)
}

/// Validate one file group and return the source type it declares
///
/// Kinds are matched first-wins in the order aql, build, bundle, pattern,
/// package. Only single-source mode enforces that exactly one of the first
/// four is set; in multi-source mode a group carrying two kinds resolves to
/// the earlier one.
pub fn validate_file(group: &FileGroup, multi_source: bool) -> Result<SourceType, SourceError> {
  let f = FieldPresence::of(group)?;

  if has_unsupported_fields(group) {
    return Err(SourceError::UnsupportedFields);
  }

  if !multi_source && count_true(&[f.aql, f.build, f.bundle, f.pattern]) != 1 {
    return Err(if f.package {
      SourceError::PackagesUnsupported
    } else {
      SourceError::NotExactlyOneSource
    });
  }

  if f.aql {
    reject_if_any(
      &[f.include_deps, f.project, f.exclusions, f.props, f.exclude_props, !f.recursive],
      SourceType::Aql,
    )
  } else if f.build {
    reject_if_any(
      &[f.exclusions, f.props, f.exclude_props, !f.recursive],
      SourceType::Builds,
    )
  } else if f.bundle {
    reject_if_any(
      &[f.include_deps, f.exclusions, f.props, f.exclude_props, !f.recursive],
      SourceType::ReleaseBundles,
    )
  } else if f.pattern {
    reject_if_any(&[f.include_deps, f.project], SourceType::Artifacts)
  } else if f.package {
    reject_if_any(
      &[f.include_deps, f.exclusions, f.props, f.exclude_props, !f.recursive, f.project],
      SourceType::Packages,
    )
  } else {
    Err(SourceError::NoSourceInFile)
  }
}

/// Validate every group in order, failing on the first invalid one
pub fn detect_source_types(groups: &[FileGroup], multi_source: bool) -> Result<Vec<SourceType>, SourceError> {
  groups.iter().map(|group| validate_file(group, multi_source)).collect()
}

/// Check that the detected types form an acceptable combination
pub fn validate_creation_sources(detected: &[SourceType], multi_source: bool) -> Result<(), SourceError> {
  let Some(first) = detected.first() else {
    return Err(SourceError::MissingCreationSources);
  };

  if !multi_source {
    if detected.contains(&SourceType::Packages) {
      return Err(SourceError::PackagesUnsupported);
    }
    if detected.iter().any(|t| t != first) {
      return Err(SourceError::MultipleCreationSources {
        detected: detected.to_vec(),
      });
    }
  }

  let aql_count = detected.iter().filter(|t| **t == SourceType::Aql).count();
  if aql_count > 1 {
    return Err(SourceError::SingleAql);
  }
  Ok(())
}

/// Detect and validate the source types of a whole spec
pub fn validate_and_identify(groups: &[FileGroup], multi_source: bool) -> RbResult<Vec<SourceType>> {
  if groups.is_empty() {
    return Err(SourceError::EmptySpec.into());
  }
  let detected = detect_source_types(groups, multi_source)?;
  validate_creation_sources(&detected, multi_source)?;
  debug!(?detected, multi_source, "identified creation sources");
  Ok(detected)
}

/// True when the list is non-empty and every entry has the same type
pub fn is_single_source_type(types: &[SourceType]) -> bool {
  match types.split_first() {
    Some((first, rest)) => rest.iter().all(|t| t == first),
    None => false,
  }
}

/// Distinct types in first-seen order
pub fn dedup_source_types(types: &[SourceType]) -> Vec<SourceType> {
  let mut seen = Vec::with_capacity(types.len());
  for t in types {
    if !seen.contains(t) {
      seen.push(*t);
    }
  }
  seen
}
