//! CLI commands for rb-lifecycle
//!
//! - **create**: resolve creation sources and submit a new release bundle
//! - **update**: add sources to an existing release bundle
//! - **args**: command arguments and the flag checks that run before any backend call
//! - **sources**: spec-to-source assembly shared by both commands
//!
//! Commands receive `&ConnectionOptions` and connect only once their flags are valid.

pub mod args;
pub mod create;
pub mod sources;
pub mod update;

pub use args::{CreateArgs, UpdateArgs};
pub use create::run_create;
pub use update::run_update;
