//! Command context - resolve the server once, hand services to commands
//!
//! ```text
//! main.rs:
//!   ConnectionOptions -> commands::run_create / run_update
//!   |
//!   v  (after flag validation)
//!   ConnectionOptions::connect() -> LifecycleContext
//!   |
//!   v
//! commands/create.rs, update.rs:
//!   fn run(ctx.artifactory(), ctx.lifecycle(), ...)
//! ```

use crate::core::config::{LifecycleConfig, ServerDetails, ServerOverrides};
use crate::core::error::RbResult;
use crate::services::{ArtifactoryService, LifecycleService, PlatformClient};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where to find the platform: working dir, optional `--config`, flag overrides
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
  pub working_dir: PathBuf,
  pub config_path: Option<PathBuf>,
  pub overrides: ServerOverrides,
}

impl ConnectionOptions {
  /// Build the context; deferred until a command actually needs the backend
  pub fn connect(&self) -> RbResult<LifecycleContext> {
    LifecycleContext::build(&self.working_dir, self.config_path.as_deref(), &self.overrides)
  }
}

/// Connection state shared by the lifecycle commands
pub struct LifecycleContext {
  pub server: ServerDetails,
  client: PlatformClient,
}

impl LifecycleContext {
  /// Load config, resolve server details and build the HTTP client
  pub fn build(working_dir: &Path, config_path: Option<&Path>, overrides: &ServerOverrides) -> RbResult<Self> {
    let config = LifecycleConfig::discover(working_dir, config_path)?;
    let server = ServerDetails::resolve(overrides, &config, |key| std::env::var(key).ok())?;
    debug!(url = %server.url, "resolved platform");
    let client = PlatformClient::new(server.clone())?;
    Ok(Self { server, client })
  }

  pub fn artifactory(&self) -> &dyn ArtifactoryService {
    &self.client
  }

  pub fn lifecycle(&self) -> &dyn LifecycleService {
    &self.client
  }
}
