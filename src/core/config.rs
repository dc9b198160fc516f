use crate::core::error::{ConfigError, RbError, RbResult};
use crate::utils::add_trailing_slash;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for rb-lifecycle
/// Searched in order: lifecycle.toml, .lifecycle.toml, .jfrog/lifecycle.toml, .config/lifecycle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
  #[serde(default)]
  pub server: ServerConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
  /// Platform base URL (e.g., "https://acme.jfrog.io")
  #[serde(default)]
  pub url: Option<String>,

  #[serde(default)]
  pub access_token: Option<String>,

  #[serde(default)]
  pub user: Option<String>,

  #[serde(default)]
  pub password: Option<String>,

  /// HTTP timeout in seconds (default: 30)
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      url: None,
      access_token: None,
      user: None,
      password: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl LifecycleConfig {
  /// Find config file in search order: lifecycle.toml, .lifecycle.toml, .jfrog/lifecycle.toml, .config/lifecycle.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("lifecycle.toml"),
      path.join(".lifecycle.toml"),
      path.join(".jfrog").join("lifecycle.toml"),
      path.join(".config").join("lifecycle.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load a specific config file
  pub fn load_from(config_path: &Path) -> RbResult<Self> {
    let invalid = |reason: String| {
      RbError::Config(ConfigError::Invalid {
        path: config_path.display().to_string(),
        reason,
      })
    };
    let content = fs::read_to_string(config_path).map_err(|e| invalid(e.to_string()))?;
    let config: LifecycleConfig = toml_edit::de::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    Ok(config)
  }

  /// Load the explicit `--config` file, or the first one found under `dir`
  ///
  /// No file at all is fine: flags and environment may carry everything.
  pub fn discover(dir: &Path, explicit: Option<&Path>) -> RbResult<Self> {
    if let Some(path) = explicit {
      return Self::load_from(path);
    }
    match Self::find_config_path(dir) {
      Some(path) => Self::load_from(&path),
      None => Ok(Self::default()),
    }
  }
}

/// Server settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
  pub url: Option<String>,
  pub access_token: Option<String>,
  pub user: Option<String>,
  pub password: Option<String>,
}

/// Resolved connection details for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDetails {
  pub url: String,
  pub artifactory_url: String,
  pub lifecycle_url: String,
  pub access_token: Option<String>,
  pub user: Option<String>,
  pub password: Option<String>,
  pub timeout: Duration,
}

impl ServerDetails {
  /// Resolve each field from flag, then environment, then config file
  ///
  /// `env` looks up an environment variable; empty values count as unset.
  pub fn resolve<F>(overrides: &ServerOverrides, config: &LifecycleConfig, env: F) -> RbResult<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let pick = |flag: &Option<String>, var: &str, file: &Option<String>| -> Option<String> {
      non_empty(flag.clone())
        .or_else(|| non_empty(env(var)))
        .or_else(|| non_empty(file.clone()))
    };

    let server = &config.server;
    let url = pick(&overrides.url, "JF_URL", &server.url).ok_or(ConfigError::MissingUrl)?;
    let base = add_trailing_slash(&url);

    Ok(Self {
      artifactory_url: format!("{}artifactory/", base),
      lifecycle_url: format!("{}lifecycle/", base),
      url: base,
      access_token: pick(&overrides.access_token, "JF_ACCESS_TOKEN", &server.access_token),
      user: pick(&overrides.user, "JF_USER", &server.user),
      password: pick(&overrides.password, "JF_PASSWORD", &server.password),
      timeout: Duration::from_secs(server.timeout_secs),
    })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
