//! Small string helpers shared by validation, spec parsing and the HTTP client

/// Join items into human-readable text: `a`, `a and b`, `a, b and c`
pub fn list_to_text<S: AsRef<str>>(items: &[S]) -> String {
  match items {
    [] => String::new(),
    [only] => only.as_ref().to_string(),
    [init @ .., last] => {
      let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
      format!("{} and {}", head.join(", "), last.as_ref())
    }
  }
}

/// Count how many flags are set
pub fn count_true(values: &[bool]) -> usize {
  values.iter().filter(|v| **v).count()
}

/// Parse a boolean leniently
///
/// Accepts the spellings commonly found in spec files and CI variables:
/// `1, t, T, TRUE, true, True` and `0, f, F, FALSE, false, False`.
pub fn parse_bool(value: &str) -> Option<bool> {
  match value {
    "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
    "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
    _ => None,
  }
}

/// Append a trailing slash unless one is already present
pub fn add_trailing_slash(url: &str) -> String {
  if url.ends_with('/') {
    url.to_string()
  } else {
    format!("{}/", url)
  }
}
