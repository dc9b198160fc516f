//! `<name>/<version>` identifiers for builds and release bundles

/// Build number meaning "the most recently published build"
pub const LATEST: &str = "LATEST";

/// Split an identifier on its last unescaped `/`
///
/// A `/` whose preceding segment ends with `\` belongs to the version, so
/// `a/b\/c` splits into `a` and `b/c`. Returns `None` when no usable
/// delimiter exists or the name part is empty.
pub fn split_identifier(identifier: &str) -> Option<(String, String)> {
  let parts: Vec<&str> = identifier.split('/').collect();
  for i in (1..parts.len()).rev() {
    if parts[i - 1].ends_with('\\') {
      continue;
    }
    let name = parts[..i].join("/");
    if name.is_empty() {
      return None;
    }
    let version = parts[i..].join("/");
    return Some((unescape(&name), unescape(&version)));
  }
  None
}

/// Split a build identifier; a bare name means the latest build
pub fn split_build_identifier(identifier: &str) -> (String, String) {
  split_identifier(identifier).unwrap_or_else(|| (unescape(identifier), LATEST.to_string()))
}

fn unescape(value: &str) -> String {
  value.replace("\\/", "/")
}
