//! File specs: the user-facing description of creation sources

pub mod file_spec;

pub use file_spec::{FileGroup, SpecFiles, parse_spec_vars};
