//! File spec parsing
//!
//! A file spec is a JSON document with a `files` array. Each entry (a
//! `FileGroup`) declares one creation source. The schema is shared with
//! other artifact commands, so several fields exist here only to be
//! rejected later by the validator.

use crate::core::error::{RbError, RbResult, ResultExt};
use crate::utils::parse_bool;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// A boolean-ish spec value: specs carry both `"true"` and `true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
  Bool(bool),
  Text(String),
}

impl FlagValue {
  /// Interpret the value, returning the raw text when it is not a boolean
  pub fn as_bool(&self) -> Result<bool, String> {
    match self {
      FlagValue::Bool(b) => Ok(*b),
      FlagValue::Text(t) if t.is_empty() => Err(String::new()),
      FlagValue::Text(t) => parse_bool(t).ok_or_else(|| t.clone()),
    }
  }
}

/// Parse an optional flag, falling back to `default` when unset
pub fn flag_or(value: &Option<FlagValue>, default: bool) -> Result<bool, String> {
  match value {
    None => Ok(default),
    Some(FlagValue::Text(t)) if t.is_empty() => Ok(default),
    Some(v) => v.as_bool(),
  }
}

/// Parse an optional flag, treating unparsable values as `default`
pub fn flag_or_lenient(value: &Option<FlagValue>, default: bool) -> bool {
  flag_or(value, default).unwrap_or(default)
}

/// The `aql` block of a file group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aql {
  /// Raw JSON text of the `items.find` body
  #[serde(rename = "items.find", alias = "itemsFind", default, deserialize_with = "raw_json_text")]
  pub items_find: String,
}

/// Keep an arbitrary JSON value as text; strings are taken verbatim
fn raw_json_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(serde_json::Value::Null) => String::new(),
    Some(serde_json::Value::String(s)) => s,
    Some(other) => other.to_string(),
  })
}

/// Path mapping block (always rejected for release bundles)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
  #[serde(default)]
  pub input: String,
  #[serde(default)]
  pub output: String,
}

/// One entry of a file spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
  // Sources
  #[serde(default)]
  pub aql: Aql,
  #[serde(default)]
  pub build: String,
  #[serde(default)]
  pub include_deps: Option<FlagValue>,
  #[serde(default)]
  pub bundle: String,
  #[serde(default)]
  pub project: String,
  #[serde(default)]
  pub pattern: String,
  #[serde(default)]
  pub exclusions: Vec<String>,
  #[serde(default)]
  pub props: String,
  #[serde(default)]
  pub exclude_props: String,
  #[serde(default)]
  pub recursive: Option<FlagValue>,
  #[serde(default)]
  pub package: String,
  #[serde(default)]
  pub version: String,
  #[serde(default, rename = "type")]
  pub package_type: String,
  #[serde(default)]
  pub repo_key: String,

  // Shared schema fields that release bundles never accept
  #[serde(default)]
  pub path_mapping: PathMapping,
  #[serde(default)]
  pub target: String,
  #[serde(default)]
  pub sort_order: String,
  #[serde(default)]
  pub sort_by: Vec<String>,
  #[serde(default)]
  pub exclude_artifacts: Option<FlagValue>,
  #[serde(default)]
  pub public_gpg_key: String,
  #[serde(default)]
  pub offset: i64,
  #[serde(default)]
  pub limit: i64,
  #[serde(default)]
  pub archive: String,
  #[serde(default)]
  pub symlinks: Option<FlagValue>,
  #[serde(default)]
  pub regexp: String,
  #[serde(default)]
  pub ant: String,
  #[serde(default)]
  pub explode: Option<FlagValue>,
  #[serde(default)]
  pub bypass_archive_inspection: Option<FlagValue>,
  #[serde(default)]
  pub transitive: Option<FlagValue>,
}

impl FileGroup {
  /// `recursive` defaults to true; an unparsable value is reported
  pub fn is_recursive(&self) -> Result<bool, String> {
    flag_or(&self.recursive, true)
  }

  /// `includeDeps` defaults to false; an unparsable value is reported
  pub fn include_deps(&self) -> Result<bool, String> {
    flag_or(&self.include_deps, false)
  }

  /// A file group referencing a single build
  pub fn from_build(build_name: &str, build_number: &str, project: &str) -> Self {
    Self {
      build: format!("{}/{}", build_name, build_number),
      project: project.to_string(),
      ..Default::default()
    }
  }
}

/// A parsed file spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFiles {
  #[serde(default)]
  pub files: Vec<FileGroup>,
}

impl SpecFiles {
  /// Parse spec JSON after substituting `${key}` spec variables
  pub fn parse(content: &str, spec_vars: &[(String, String)]) -> RbResult<Self> {
    let substituted = substitute_vars(content, spec_vars);
    let spec: SpecFiles = serde_json::from_str(&substituted)?;
    Ok(spec)
  }

  /// Load a spec file from disk
  pub fn load(path: &Path, spec_vars: &[(String, String)]) -> RbResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read spec file {}", path.display()))?;
    Self::parse(&content, spec_vars)
      .map_err(|e| RbError::message(format!("Failed to parse spec file {}: {}", path.display(), e)))
  }

  /// Spec with a single build reference, as synthesized from build name/number
  pub fn from_build(build_name: &str, build_number: &str, project: &str) -> Self {
    Self {
      files: vec![FileGroup::from_build(build_name, build_number, project)],
    }
  }
}

/// Parse `--spec-vars "k1=v1;k2=v2"`
///
/// Entries without `=` are ignored.
pub fn parse_spec_vars(raw: &str) -> Vec<(String, String)> {
  raw
    .split(';')
    .filter_map(|entry| {
      let (key, value) = entry.split_once('=')?;
      let key = key.trim();
      if key.is_empty() {
        return None;
      }
      Some((key.to_string(), value.trim().to_string()))
    })
    .collect()
}

fn substitute_vars(content: &str, spec_vars: &[(String, String)]) -> String {
  let mut result = content.to_string();
  for (key, value) in spec_vars {
    result = result.replace(&format!("${{{}}}", key), value);
  }
  result
}
