//! Packages creation source

use super::PackageSource;
use crate::spec::FileGroup;

/// Map the `package` entries of a file spec
pub fn packages_from_spec(groups: &[FileGroup]) -> Vec<PackageSource> {
  groups
    .iter()
    .filter(|group| !group.package.is_empty())
    .map(|group| PackageSource {
      package_name: group.package.clone(),
      package_version: group.version.clone(),
      package_type: group.package_type.clone(),
      repository_key: group.repo_key.clone(),
    })
    .collect()
}
