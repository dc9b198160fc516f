//! Builds creation source
//!
//! Builds come from the deprecated builds-spec file or from `build` entries
//! of a file spec. Either way each build ends up with a name, a number and
//! the build-info repository of its project.

use super::identifier::{LATEST, split_build_identifier};
use super::types::BuildSource;
use crate::core::error::{RbResult, ResolutionError, ResultExt};
use crate::services::ArtifactoryService;
use crate::spec::FileGroup;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Build-info repository for a project
pub fn build_info_repository(project: &str) -> String {
  if project.is_empty() {
    "artifactory-build-info".to_string()
  } else {
    format!("{}-build-info", project)
  }
}

/// Deprecated `--builds` file: `{"builds": [{"name", "number", "project", "includeDependencies"}]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildsSpec {
  #[serde(default)]
  pub builds: Vec<BuildSpecEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpecEntry {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub number: String,
  #[serde(default)]
  pub project: String,
  #[serde(default)]
  pub include_dependencies: bool,
}

impl BuildsSpec {
  pub fn load(path: &Path) -> RbResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read builds spec {}", path.display()))?;
    let spec: BuildsSpec =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse builds spec {}", path.display()))?;
    Ok(spec)
  }
}

/// Use `number` when given, otherwise look up the latest published build
pub fn latest_build_number_if_empty(
  service: &dyn ArtifactoryService,
  name: &str,
  number: &str,
  project: &str,
) -> RbResult<String> {
  if !number.is_empty() {
    return Ok(number.to_string());
  }
  match service.latest_build_number(name, project)? {
    Some(latest) if !latest.is_empty() => {
      debug!(build = name, number = %latest, "resolved latest build number");
      Ok(latest)
    }
    _ => Err(
      ResolutionError::BuildNotFound {
        name: name.to_string(),
        project: project.to_string(),
      }
      .into(),
    ),
  }
}

/// Resolve every entry of a builds-spec file
pub fn builds_from_legacy_spec(service: &dyn ArtifactoryService, spec: &BuildsSpec) -> RbResult<Vec<BuildSource>> {
  let mut builds = Vec::with_capacity(spec.builds.len());
  for entry in &spec.builds {
    let number = latest_build_number_if_empty(service, &entry.name, &entry.number, &entry.project)?;
    builds.push(checked_build(
      &entry.name,
      &number,
      &entry.project,
      entry.include_dependencies,
    )?);
  }
  Ok(builds)
}

/// Resolve a `name/number` (or bare `name`) identifier to explicit values
pub fn resolve_build_identifier(
  service: &dyn ArtifactoryService,
  identifier: &str,
  project: &str,
) -> RbResult<(String, String)> {
  let (name, number) = split_build_identifier(identifier);
  let number = if number == LATEST {
    service.latest_build_number(&name, project)?.unwrap_or_default()
  } else {
    number
  };

  if name.is_empty() || number.is_empty() {
    return Err(
      ResolutionError::BuildIdentifier {
        identifier: identifier.to_string(),
      }
      .into(),
    );
  }
  Ok((name, number))
}

/// Resolve the `build` entries of a file spec
pub fn builds_from_spec(service: &dyn ArtifactoryService, groups: &[FileGroup]) -> RbResult<Vec<BuildSource>> {
  let mut builds = Vec::new();
  for group in groups.iter().filter(|g| !g.build.is_empty()) {
    let include_dependencies = group
      .include_deps()
      .map_err(|value| ResolutionError::InvalidIncludeDeps { value })?;
    let (name, number) = resolve_build_identifier(service, &group.build, &group.project)?;
    builds.push(BuildSource {
      build_repository: build_info_repository(&group.project),
      build_name: name,
      build_number: number,
      include_dependencies,
    });
  }
  Ok(builds)
}

fn checked_build(name: &str, number: &str, project: &str, include_dependencies: bool) -> RbResult<BuildSource> {
  if name.is_empty() || number.is_empty() {
    return Err(
      ResolutionError::InvalidBuild {
        name: name.to_string(),
        number: number.to_string(),
      }
      .into(),
    );
  }
  Ok(BuildSource {
    build_repository: build_info_repository(project),
    build_name: name.to_string(),
    build_number: number.to_string(),
    include_dependencies,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::fake::FakeArtifactory;

  fn group(build: &str, project: &str) -> FileGroup {
    FileGroup {
      build: build.to_string(),
      project: project.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_build_info_repository() {
    assert_eq!(build_info_repository(""), "artifactory-build-info");
    assert_eq!(build_info_repository("proj"), "proj-build-info");
  }

  #[test]
  fn test_builds_from_spec() {
    let service = FakeArtifactory::with_version("7.114.0").with_latest_build("nightly", "77");
    let mut with_deps = group("app/12", "proj");
    with_deps.include_deps = Some(crate::spec::file_spec::FlagValue::Text("true".to_string()));
    let groups = vec![with_deps, FileGroup::default(), group("nightly", "")];

    let builds = builds_from_spec(&service, &groups).unwrap();
    assert_eq!(
      builds,
      vec![
        BuildSource {
          build_repository: "proj-build-info".to_string(),
          build_name: "app".to_string(),
          build_number: "12".to_string(),
          include_dependencies: true,
        },
        BuildSource {
          build_repository: "artifactory-build-info".to_string(),
          build_name: "nightly".to_string(),
          build_number: "77".to_string(),
          include_dependencies: false,
        },
      ]
    );
  }

  #[test]
  fn test_invalid_include_deps_fails() {
    let service = FakeArtifactory::with_version("7.114.0");
    let spec = crate::spec::SpecFiles::parse(r#"{"files":[{"build":"svc/1","includeDeps":"maybe"}]}"#, &[]).unwrap();
    let err = builds_from_spec(&service, &spec.files).unwrap_err();
    assert_eq!(
      err.to_string(),
      "invalid value provided to the 'includeDeps' field. error: 'maybe' is not a valid boolean"
    );
  }

  #[test]
  fn test_explicit_latest_keyword() {
    let service = FakeArtifactory::with_version("7.114.0").with_latest_build("app", "9");
    let resolved = resolve_build_identifier(&service, "app/LATEST", "").unwrap();
    assert_eq!(resolved, ("app".to_string(), "9".to_string()));
  }

  #[test]
  fn test_unresolvable_identifier() {
    let service = FakeArtifactory::with_version("7.114.0");
    let err = builds_from_spec(&service, &[group("ghost", "")]).unwrap_err();
    assert_eq!(
      err.to_string(),
      "could not identify a build info by the 'ghost' identifier in artifactory"
    );
  }

  #[test]
  fn test_legacy_spec_resolves_missing_numbers() {
    let service = FakeArtifactory::with_version("7.114.0").with_latest_build("b2", "31");
    let spec: BuildsSpec = serde_json::from_str(
      r#"{"builds": [
        {"name": "b1", "number": "4", "project": "proj", "includeDependencies": true},
        {"name": "b2"}
      ]}"#,
    )
    .unwrap();

    let builds = builds_from_legacy_spec(&service, &spec).unwrap();
    assert_eq!(builds.len(), 2);
    assert_eq!(builds[0].build_repository, "proj-build-info");
    assert!(builds[0].include_dependencies);
    assert_eq!(builds[1].build_number, "31");
    assert_eq!(builds[1].build_repository, "artifactory-build-info");
  }

  #[test]
  fn test_legacy_spec_missing_build() {
    let service = FakeArtifactory::with_version("7.114.0");
    let spec = BuildsSpec {
      builds: vec![BuildSpecEntry {
        name: "gone".to_string(),
        project: "proj".to_string(),
        ..Default::default()
      }],
    };
    let err = builds_from_legacy_spec(&service, &spec).unwrap_err();
    assert_eq!(
      err.to_string(),
      "could not find a build info with name 'gone' in artifactory (project 'proj')"
    );
  }

  #[test]
  fn test_legacy_spec_requires_name() {
    let service = FakeArtifactory::with_version("7.114.0");
    let spec = BuildsSpec {
      builds: vec![BuildSpecEntry {
        number: "3".to_string(),
        ..Default::default()
      }],
    };
    assert!(builds_from_legacy_spec(&service, &spec).is_err());
  }

  #[test]
  fn test_load_legacy_spec_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("builds.json");
    fs::write(&path, r#"{"builds": [{"name": "b", "number": "1"}]}"#).unwrap();
    let spec = BuildsSpec::load(&path).unwrap();
    assert_eq!(spec.builds[0].name, "b");

    fs::write(&path, "not json").unwrap();
    assert!(BuildsSpec::load(&path).is_err());
  }
}
