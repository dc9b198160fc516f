//! Creation-source resolution
//!
//! - **types**: `SourceType`, the `Source` tagged union and `CreationRequest`
//! - **validate**: per-group field rules and source-type detection
//! - **aql**, **artifacts**, **builds**, **bundles**, **packages**: one builder per source type
//! - **flags**: builds and release bundles given on the command line
//! - **identifier**: `<name>/<version>` parsing shared by builds and bundles

pub mod aql;
pub mod artifacts;
pub mod builds;
pub mod bundles;
pub mod flags;
pub mod identifier;
pub mod packages;
pub mod types;
pub mod validate;

pub use types::{ArtifactSource, BuildSource, CreationRequest, PackageSource, ReleaseBundleSource, Source, SourceType};
pub use validate::{
  dedup_source_types, detect_source_types, is_single_source_type, validate_and_identify, validate_creation_sources,
};
