//! Source assembly shared by create and update

use crate::core::error::{RbResult, SourceError};
use crate::services::ArtifactoryService;
use crate::sources::aql::aql_query_from_spec;
use crate::sources::artifacts::artifacts_from_spec;
use crate::sources::builds::builds_from_spec;
use crate::sources::bundles::bundles_from_spec;
use crate::sources::packages::packages_from_spec;
use crate::sources::{Source, SourceType, dedup_source_types};
use crate::spec::FileGroup;

/// Whether an AQL group may contribute a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqlPolicy {
  Allow,
  Reject,
}

/// Build one source per detected type, in first-seen order
///
/// Sources that resolve to nothing are left out. An AQL source is always kept
/// when allowed.
pub fn sources_from_spec(
  artifactory: &dyn ArtifactoryService,
  groups: &[FileGroup],
  detected: &[SourceType],
  aql: AqlPolicy,
) -> RbResult<Vec<Source>> {
  let mut sources = Vec::new();
  for source_type in dedup_source_types(detected) {
    let source = match source_type {
      SourceType::Aql => match aql {
        AqlPolicy::Allow => {
          sources.push(Source::Aql {
            aql: aql_query_from_spec(groups),
          });
          continue;
        }
        AqlPolicy::Reject => return Err(SourceError::UnsupportedForUpdate { source_type }.into()),
      },
      SourceType::Artifacts => Source::Artifacts {
        artifacts: artifacts_from_spec(artifactory, groups)?,
      },
      SourceType::Builds => Source::Builds {
        builds: builds_from_spec(artifactory, groups)?,
      },
      SourceType::ReleaseBundles => Source::ReleaseBundles {
        release_bundles: bundles_from_spec(groups)?,
      },
      SourceType::Packages => Source::Packages {
        packages: packages_from_spec(groups),
      },
    };
    if !source.is_empty() {
      sources.push(source);
    }
  }
  Ok(sources)
}
