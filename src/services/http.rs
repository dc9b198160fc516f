//! HTTP client for the platform's Artifactory and lifecycle services

use super::{
  ArtifactoryService, LifecycleService, QueryParams, ReleaseBundleDetails, ResultItem, ResultReader, SearchResults,
};
use crate::core::config::ServerDetails;
use crate::core::error::{RbError, RbResult};
use crate::sources::builds::build_info_repository;
use crate::sources::{CreationRequest, Source};
use crate::spec::FileGroup;
use crate::spec::file_spec::flag_or_lenient;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

const SIGNING_KEY_HEADER: &str = "X-JFrog-Signing-Key-Name";

/// Blocking client for one platform instance
pub struct PlatformClient {
  client: Client,
  server: ServerDetails,
}

#[derive(Deserialize)]
struct VersionResponse {
  version: String,
}

#[derive(Deserialize)]
struct AqlResponse {
  #[serde(default)]
  results: Vec<ResultItem>,
}

impl PlatformClient {
  pub fn new(server: ServerDetails) -> RbResult<Self> {
    let client = Client::builder().timeout(server.timeout).build()?;
    Ok(Self { client, server })
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    if let Some(token) = &self.server.access_token {
      request.bearer_auth(token)
    } else if let Some(user) = &self.server.user {
      request.basic_auth(user, self.server.password.as_deref())
    } else {
      request
    }
  }

  fn send(&self, operation: &str, request: RequestBuilder) -> RbResult<Response> {
    let response = self.authorize(request).send()?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RbError::service(operation, Some(status.as_u16()), body))
  }

  fn artifactory_url(&self, path: &str) -> String {
    format!("{}{}", self.server.artifactory_url, path)
  }

  fn lifecycle_url(&self, path: &str) -> String {
    format!("{}{}", self.server.lifecycle_url, path)
  }

  /// Run an AQL query and return its result rows
  fn aql(&self, query: &str) -> RbResult<Vec<ResultItem>> {
    debug!(query, "running aql");
    let request = self
      .client
      .post(self.artifactory_url("api/search/aql"))
      .header(reqwest::header::CONTENT_TYPE, "text/plain")
      .body(query.to_string());
    let response: AqlResponse = self.send("aql search", request)?.json()?;
    Ok(response.results)
  }

  fn release_bundle_query(&self, params: &QueryParams) -> Vec<(&'static str, String)> {
    let mut query = vec![("async", params.is_async.to_string())];
    if !params.project_key.is_empty() {
      query.push(("project", params.project_key.clone()));
    }
    query
  }
}

impl ArtifactoryService for PlatformClient {
  fn version(&self) -> RbResult<String> {
    let request = self.client.get(self.artifactory_url("api/system/version"));
    let response: VersionResponse = self.send("version query", request)?.json()?;
    Ok(response.version)
  }

  fn search_files(&self, groups: &[&FileGroup]) -> RbResult<SearchResults> {
    let mut readers: Vec<ResultReader> = Vec::with_capacity(groups.len());
    for group in groups {
      let rows = self.aql(&pattern_to_aql(group))?;
      let exclusions = group.exclusions.clone();
      let kept: Vec<RbResult<ResultItem>> = rows
        .into_iter()
        .filter(|row| !is_excluded(row, &exclusions))
        .map(Ok)
        .collect();
      readers.push(Box::new(kept.into_iter()));
    }
    Ok(SearchResults::new(readers))
  }

  fn latest_build_number(&self, build_name: &str, project: &str) -> RbResult<Option<String>> {
    let rows = self.aql(&latest_build_aql(build_name, project))?;
    Ok(rows.first().map(|row| build_number_from_file_name(&row.name)))
  }
}

impl LifecycleService for PlatformClient {
  fn create_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    request: &CreationRequest,
    draft: bool,
  ) -> RbResult<()> {
    let body = creation_body(details, request);
    let mut query = self.release_bundle_query(params);
    if draft {
      query.push(("draft", "true".to_string()));
    }

    let mut http = self
      .client
      .post(self.lifecycle_url("api/v2/release_bundle"))
      .query(&query)
      .json(&body);
    if !signing_key.is_empty() {
      http = http.header(SIGNING_KEY_HEADER, signing_key);
    }

    info!(name = %details.name, version = %details.version, draft, "creating release bundle");
    self.send("release bundle creation", http)?;
    Ok(())
  }

  fn update_release_bundle(
    &self,
    details: &ReleaseBundleDetails,
    params: &QueryParams,
    signing_key: &str,
    sources: &[Source],
  ) -> RbResult<()> {
    let body = json!({ "add_sources": sources });
    let url = release_bundle_url(&self.lifecycle_url("api/v2/release_bundle"), &details.name, &details.version)?;

    let mut http = self
      .client
      .patch(url)
      .query(&self.release_bundle_query(params))
      .json(&body);
    if !signing_key.is_empty() {
      http = http.header(SIGNING_KEY_HEADER, signing_key);
    }

    info!(name = %details.name, version = %details.version, sources = sources.len(), "updating release bundle");
    self.send("release bundle update", http)?;
    Ok(())
  }
}

/// `<base>/<name>/<version>` with both segments percent-encoded
fn release_bundle_url(base: &str, name: &str, version: &str) -> RbResult<Url> {
  let mut url = Url::parse(base).map_err(|e| RbError::message(format!("invalid lifecycle URL '{}': {}", base, e)))?;
  url
    .path_segments_mut()
    .map_err(|_| RbError::message(format!("lifecycle URL '{}' cannot carry a path", base)))?
    .pop_if_empty()
    .push(name)
    .push(version);
  Ok(url)
}

/// JSON body of a creation request
pub fn creation_body(details: &ReleaseBundleDetails, request: &CreationRequest) -> Value {
  let mut body = Map::new();
  body.insert("release_bundle_name".to_string(), json!(details.name));
  body.insert("release_bundle_version".to_string(), json!(details.version));
  match request {
    CreationRequest::Single(source) => {
      body.insert("source_type".to_string(), json!(source.source_type().as_str()));
      body.insert("source".to_string(), source.payload());
    }
    CreationRequest::Multi(sources) => {
      body.insert("sources".to_string(), json!(sources));
    }
  }
  Value::Object(body)
}

/// Translate a pattern-bearing group into an AQL query
///
/// The first pattern segment is the repository. Without `recursive` only
/// the exact directory is searched; with it, subdirectories match too.
/// `props` must all match; `excludeProps` drops items matching all of them.
/// Exclusions are applied to the returned rows.
pub fn pattern_to_aql(group: &FileGroup) -> String {
  let (repo, rest) = group.pattern.split_once('/').unwrap_or((group.pattern.as_str(), ""));
  let (dir, name) = match rest.rsplit_once('/') {
    Some((dir, name)) => (dir, name),
    None => ("", rest),
  };
  let name = if name.is_empty() { "*" } else { name };
  let recursive = flag_or_lenient(&group.recursive, true);

  let location = if recursive {
    let deep = if dir.is_empty() {
      "*".to_string()
    } else {
      format!("{}/*", dir)
    };
    let exact = if dir.is_empty() { "." } else { dir };
    json!({"$or": [
      {"path": {"$match": exact}, "name": {"$match": name}},
      {"path": {"$match": deep}, "name": {"$match": name}}
    ]})
  } else {
    let exact = if dir.is_empty() { "." } else { dir };
    json!({"path": {"$match": exact}, "name": {"$match": name}})
  };

  let mut clauses = vec![json!({"repo": repo}), json!({"type": "file"}), location];
  for (key, value) in parse_props(&group.props) {
    clauses.push(json!({ format!("@{}", key): {"$match": value} }));
  }
  let excluded: Vec<Value> = parse_props(&group.exclude_props)
    .into_iter()
    .map(|(key, value)| json!({ format!("@{}", key): {"$nmatch": value} }))
    .collect();
  if !excluded.is_empty() {
    clauses.push(json!({"$or": excluded}));
  }

  format!(
    r#"items.find({}).include("repo","path","name","sha256")"#,
    json!({"$and": clauses})
  )
}

/// `a=1;b=2` into pairs; entries without `=` are ignored
fn parse_props(raw: &str) -> Vec<(String, String)> {
  raw
    .split(';')
    .filter_map(|entry| entry.split_once('='))
    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
    .filter(|(k, _)| !k.is_empty())
    .collect()
}

fn is_excluded(row: &ResultItem, exclusions: &[String]) -> bool {
  if exclusions.is_empty() {
    return false;
  }
  let full_path = crate::sources::artifacts::join_artifact_path(&[&row.repo, &row.path, &row.name]);
  exclusions
    .iter()
    .filter(|e| !e.is_empty())
    .any(|pattern| wildcard_match(pattern, &full_path))
}

/// Match `*` (any run) and `?` (one character) wildcards
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
  let p: Vec<char> = pattern.chars().collect();
  let t: Vec<char> = text.chars().collect();
  let (mut pi, mut ti) = (0, 0);
  let mut star: Option<(usize, usize)> = None;

  while ti < t.len() {
    if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
      pi += 1;
      ti += 1;
    } else if pi < p.len() && p[pi] == '*' {
      star = Some((pi, ti));
      pi += 1;
    } else if let Some((star_pi, star_ti)) = star {
      pi = star_pi + 1;
      ti = star_ti + 1;
      star = Some((star_pi, star_ti + 1));
    } else {
      return false;
    }
  }
  p[pi..].iter().all(|c| *c == '*')
}

/// Most recently created build-info file of a build
fn latest_build_aql(build_name: &str, project: &str) -> String {
  format!(
    r#"items.find({}).include("name","repo","path","created").sort({{"$desc":["created"]}}).limit(1)"#,
    json!({"repo": build_info_repository(project), "path": {"$match": build_name}})
  )
}

/// Build-info files are stored as `<number>-<timestamp>.json`
fn build_number_from_file_name(file_name: &str) -> String {
  let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
  match stem.rsplit_once('-') {
    Some((number, timestamp)) if !number.is_empty() && timestamp.chars().all(|c| c.is_ascii_digit()) => {
      number.to_string()
    }
    _ => stem.to_string(),
  }
}
