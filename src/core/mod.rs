//! Core building blocks shared by all commands
//!
//! - **config**: lifecycle.toml parsing and server resolution
//! - **context**: resolved server plus the platform client, built once in main.rs
//! - **error**: error types with contextual help messages and exit codes

pub mod config;
pub mod context;
pub mod error;
