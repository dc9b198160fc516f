//! Backend version gates
//!
//! Two gates exist: the baseline every lifecycle command needs, and the
//! version that accepts several source types (and packages) in one request.

use super::ArtifactoryService;
use crate::core::error::{RbResult, VersionError};
use semver::Version;
use tracing::debug;

/// Minimum Artifactory version for any lifecycle operation
pub const MIN_LIFECYCLE_VERSION: &str = "7.63.2";

/// Minimum Artifactory version for multi-source and package creation
pub const MIN_MULTI_SOURCE_VERSION: &str = "7.114.0";

/// Parse a backend version leniently
///
/// Missing minor/patch components are treated as zero and build suffixes
/// (`7.104.1-rc2`, `7.90.0+build`) are kept as pre-release or metadata.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
  let trimmed = raw.trim();
  if let Ok(version) = Version::parse(trimmed) {
    return Ok(version);
  }

  let unparsable = || VersionError::Unparsable {
    version: raw.to_string(),
  };

  let core = trimmed.split(['-', '+']).next().unwrap_or_default();
  let mut parts = core.split('.');
  let mut next = || -> Result<u64, VersionError> {
    match parts.next() {
      None => Ok(0),
      Some(p) => p.parse::<u64>().map_err(|_| unparsable()),
    }
  };
  let major = next()?;
  let minor = next()?;
  let patch = next()?;
  if core.is_empty() || parts.next().is_some() {
    return Err(unparsable());
  }
  Ok(Version::new(major, minor, patch))
}

/// Fail unless `current` is at least `minimum`
pub fn validate_minimum_version(current: &str, minimum: &str) -> Result<(), VersionError> {
  let current_version = parse_version(current)?;
  let minimum_version = parse_version(minimum)?;
  if current_version < minimum_version {
    return Err(VersionError::BelowMinimum {
      current: current.to_string(),
      minimum: minimum.to_string(),
    });
  }
  Ok(())
}

/// Query the backend and check it against `minimum`
pub fn validate_feature_supported(service: &dyn ArtifactoryService, minimum: &str) -> RbResult<()> {
  let current = service.version()?;
  validate_minimum_version(&current, minimum)?;
  Ok(())
}

/// Baseline check run first by every lifecycle command
pub fn validate_lifecycle_supported(service: &dyn ArtifactoryService) -> RbResult<()> {
  validate_feature_supported(service, MIN_LIFECYCLE_VERSION)
}

/// Multi-source gate; an error means the backend is too old (or unreachable)
pub fn supports_multi_source(service: &dyn ArtifactoryService) -> RbResult<()> {
  validate_feature_supported(service, MIN_MULTI_SOURCE_VERSION)
}

/// Non-fatal probe: any failure counts as "not supported"
pub fn multi_source_capability(service: &dyn ArtifactoryService) -> bool {
  match supports_multi_source(service) {
    Ok(()) => true,
    Err(e) => {
      debug!(error = %e, "multi-source creation not available");
      false
    }
  }
}
