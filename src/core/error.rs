//! Error types for rb-lifecycle with contextual messages and exit codes
//!
//! Errors are grouped by what the user has to do about them: fix the input
//! (ambiguous, missing or unsupported sources), fix the flags, upgrade the
//! backend, or look at the backend itself. Most variants carry a help hint
//! that `print_error` shows under the message.

use crate::sources::SourceType;
use crate::utils::list_to_text;
use std::fmt;
use std::io;

/// Exit codes for rb-lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid flags, unresolvable identifiers)
  User = 1,
  /// System error (network, backend, I/O)
  System = 2,
  /// Validation failure (spec content, backend version)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for rb-lifecycle
#[derive(Debug)]
pub enum RbError {
  /// Configuration errors
  Config(ConfigError),

  /// Creation-source errors (ambiguous, missing or unsupported input)
  Source(SourceError),

  /// Invalid flag combinations
  Usage(UsageError),

  /// Backend version does not support the requested operation
  Version(VersionError),

  /// Build or bundle identifiers that cannot be resolved
  Resolution(ResolutionError),

  /// Backend call failed
  Service {
    operation: String,
    status: Option<u16>,
    message: String,
  },

  /// I/O errors
  Io(io::Error),

  /// Several errors that must all be reported
  Multiple(Vec<RbError>),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RbError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RbError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create a backend failure for the named operation
  pub fn service(operation: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
    RbError::Service {
      operation: operation.into(),
      status,
      message: message.into(),
    }
  }

  /// Add context to an existing error
  ///
  /// Only `Message` and `Io` take the context. Typed errors already carry
  /// their exact message, help text and exit code, and are returned as is.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RbError::Message { message, context, help } => RbError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RbError::Io(e) => RbError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Join a primary result with a cleanup result, keeping both errors
  pub fn join<T>(primary: RbResult<T>, cleanup: RbResult<()>) -> RbResult<T> {
    match (primary, cleanup) {
      (Ok(value), Ok(())) => Ok(value),
      (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
      (Err(first), Err(second)) => Err(RbError::Multiple(vec![first, second])),
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RbError::Config(_) => ExitCode::User,
      RbError::Source(_) => ExitCode::Validation,
      RbError::Usage(_) => ExitCode::User,
      RbError::Version(_) => ExitCode::Validation,
      RbError::Resolution(_) => ExitCode::User,
      RbError::Service { .. } => ExitCode::System,
      RbError::Io(_) => ExitCode::System,
      RbError::Multiple(errors) => errors.first().map(|e| e.exit_code()).unwrap_or(ExitCode::System),
      RbError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RbError::Config(e) => e.help_message(),
      RbError::Source(e) => e.help_message(),
      RbError::Usage(e) => e.help_message(),
      RbError::Version(e) => e.help_message(),
      RbError::Resolution(e) => e.help_message(),
      RbError::Service { status: Some(401 | 403), .. } => {
        Some("Check the access token or credentials passed with --access-token or JF_ACCESS_TOKEN.".to_string())
      }
      RbError::Multiple(errors) => errors.iter().find_map(|e| e.help_message()),
      RbError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RbError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RbError::Config(e) => write!(f, "{}", e),
      RbError::Source(e) => write!(f, "{}", e),
      RbError::Usage(e) => write!(f, "{}", e),
      RbError::Version(e) => write!(f, "{}", e),
      RbError::Resolution(e) => write!(f, "{}", e),
      RbError::Service {
        operation,
        status,
        message,
      } => match status {
        Some(code) => write!(f, "{} failed with status {}: {}", operation, code, message),
        None => write!(f, "{} failed: {}", operation, message),
      },
      RbError::Io(e) => write!(f, "I/O error: {}", e),
      RbError::Multiple(errors) => {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", joined.join("\n"))
      }
      RbError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RbError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RbError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RbError {
  fn from(err: io::Error) -> Self {
    RbError::Io(err)
  }
}

impl From<String> for RbError {
  fn from(msg: String) -> Self {
    RbError::message(msg)
  }
}

impl From<&str> for RbError {
  fn from(msg: &str) -> Self {
    RbError::message(msg)
  }
}

impl From<SourceError> for RbError {
  fn from(err: SourceError) -> Self {
    RbError::Source(err)
  }
}

impl From<UsageError> for RbError {
  fn from(err: UsageError) -> Self {
    RbError::Usage(err)
  }
}

impl From<VersionError> for RbError {
  fn from(err: VersionError) -> Self {
    RbError::Version(err)
  }
}

impl From<ResolutionError> for RbError {
  fn from(err: ResolutionError) -> Self {
    RbError::Resolution(err)
  }
}

impl From<ConfigError> for RbError {
  fn from(err: ConfigError) -> Self {
    RbError::Config(err)
  }
}

impl From<toml_edit::de::Error> for RbError {
  fn from(err: toml_edit::de::Error) -> Self {
    RbError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RbError {
  fn from(err: serde_json::Error) -> Self {
    RbError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for RbError {
  fn from(err: reqwest::Error) -> Self {
    let operation = err
      .url()
      .map(|u| format!("request to {}", u.path()))
      .unwrap_or_else(|| "request".to_string());
    RbError::service(operation, err.status().map(|s| s.as_u16()), err.to_string())
  }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
  /// No platform URL from flags, environment or config file
  MissingUrl,

  /// Config file could not be read or parsed
  Invalid { path: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingUrl => Some(
        "Pass --url, set JF_URL, or add `url` under [server] in lifecycle.toml.".to_string(),
      ),
      ConfigError::Invalid { .. } => Some("Fix the file or point --config at a valid lifecycle.toml.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingUrl => write!(f, "platform URL is mandatory for lifecycle commands"),
      ConfigError::Invalid { path, reason } => write!(f, "invalid config file {}: {}", path, reason),
    }
  }
}

/// Creation-source errors raised while validating spec content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
  /// No creation source detected anywhere
  MissingCreationSources,

  /// Spec has no file groups
  EmptySpec,

  /// Heterogeneous source types while multi-source is unsupported
  MultipleCreationSources { detected: Vec<SourceType> },

  /// More than one AQL file group
  SingleAql,

  /// Packages used while multi-source and packages are unsupported
  PackagesUnsupported,

  /// Always-rejected fields were set
  UnsupportedFields,

  /// Not exactly one discriminating field group in a file (single-source mode)
  NotExactlyOneSource,

  /// No discriminating field at all in a file (multi-source mode)
  NoSourceInFile,

  /// A field from another kind's field set was set
  FieldsNotAllowed { source_type: SourceType },

  /// The `recursive` field could not be parsed
  InvalidRecursive { value: String },

  /// Nothing could be dispatched for creation
  Unidentified,

  /// A builder produced no entries
  EmptySource { source_type: SourceType },

  /// Update resolved to no sources
  NoUpdateSources,

  /// Update has neither spec nor source flags
  NoSpecOrFlags,

  /// Multi-source creation has neither flags nor spec
  NoSpecInput,

  /// Source type not accepted by the update operation
  UnsupportedForUpdate { source_type: SourceType },
}

impl SourceError {
  fn help_message(&self) -> Option<String> {
    match self {
      SourceError::MultipleCreationSources { .. } => Some(
        "Split the spec per source type, or upgrade Artifactory to a version that supports multiple sources.".to_string(),
      ),
      SourceError::UnsupportedFields | SourceError::FieldsNotAllowed { .. } => {
        Some("Remove the listed fields from the file spec entry.".to_string())
      }
      SourceError::PackagesUnsupported => {
        Some("Creating release bundles from packages requires a newer Artifactory version.".to_string())
      }
      SourceError::NoUpdateSources | SourceError::NoSpecOrFlags => Some(
        "Pass --spec, --source-type-builds or --source-type-release-bundles together with --add.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for SourceError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceError::MissingCreationSources => {
        write!(f, "unexpected err while validating spec - could not detect any creation sources")
      }
      SourceError::EmptySpec => write!(f, "spec must include at least one file group"),
      SourceError::MultipleCreationSources { detected } => {
        let mut names: Vec<String> = Vec::new();
        for source_type in detected {
          let name = source_type.as_str().to_string();
          if !names.contains(&name) {
            names.push(name);
          }
        }
        write!(
          f,
          "multiple creation sources were detected in separate spec files. Only a single creation source should be provided. Detected: '{}'",
          list_to_text(&names)
        )
      }
      SourceError::SingleAql => write!(f, "only a single aql query can be provided"),
      SourceError::PackagesUnsupported => {
        write!(f, "creation source 'package' is not supported in current version")
      }
      SourceError::UnsupportedFields => write!(
        f,
        "unsupported fields were provided in file spec. release bundle creation file spec only supports the following fields: 'aql', 'build', 'includeDeps', 'bundle', 'project', 'pattern', 'exclusions', 'props', 'excludeProps' and 'recursive'"
      ),
      SourceError::NotExactlyOneSource => write!(
        f,
        "exactly one creation source should be defined per file (aql, builds, release bundles or pattern (artifacts))"
      ),
      SourceError::NoSourceInFile => write!(
        f,
        "no creation source was detected in a file spec entry. Expected one of: 'aql', 'build', 'bundle', 'pattern' or 'package'"
      ),
      SourceError::FieldsNotAllowed { source_type } => match source_type {
        SourceType::Aql => write!(f, "aql creation source supports no other fields"),
        SourceType::Builds => write!(f, "builds creation source only supports the 'includeDeps' and 'project' fields"),
        SourceType::ReleaseBundles => write!(f, "release bundles creation source only supports the 'project' field"),
        SourceType::Artifacts => write!(
          f,
          "artifacts creation source only supports the 'exclusions', 'props', 'excludeProps' and 'recursive' fields"
        ),
        SourceType::Packages => write!(
          f,
          "packages creation source only supports the 'version', 'type' and 'repoKey' fields"
        ),
      },
      SourceError::InvalidRecursive { value } => write!(
        f,
        "invalid value provided to the 'recursive' field. error: '{}' is not a valid boolean",
        value
      ),
      SourceError::Unidentified => write!(f, "release bundle creation failed, unable to identify source for creation"),
      SourceError::EmptySource { source_type } => match source_type {
        SourceType::Builds => write!(f, "at least one build is expected in order to create a release bundle from builds"),
        SourceType::ReleaseBundles => write!(
          f,
          "at least one release bundle is expected in order to create a release bundle from release bundles"
        ),
        SourceType::Packages => write!(f, "at least one package is expected in order to create a release bundle from packages"),
        SourceType::Artifacts => write!(f, "no artifacts matched the provided patterns"),
        SourceType::Aql => write!(f, "an aql query is expected in order to create a release bundle from aql"),
      },
      SourceError::NoUpdateSources => write!(f, "at least one source must be provided to update a release bundle"),
      SourceError::NoSpecOrFlags => write!(f, "no spec file or source flags provided"),
      SourceError::NoSpecInput => write!(f, "no spec file input"),
      SourceError::UnsupportedForUpdate { source_type } => write!(
        f,
        "source type '{}' is not supported when updating a release bundle",
        source_type
      ),
    }
  }
}

/// Invalid flag combinations, detected before any backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
  /// Multi-source flags mixed with single-source methods
  MixedCreationMethods,

  /// More than one single-source method
  MultipleCreationMethods,

  /// No method and no build name/number from flags or environment
  MissingBuildIdentity,

  /// Creation spec could not be derived
  MissingCreationSpec,

  /// Update without `--add`
  MissingOperation,

  /// Update without spec or source flags
  MissingUpdateSources,
}

impl UsageError {
  fn help_message(&self) -> Option<String> {
    match self {
      UsageError::MultipleCreationMethods => Some("Prefer --spec; --builds and --release-bundles are deprecated.".to_string()),
      UsageError::MissingBuildIdentity | UsageError::MissingCreationSpec => Some(
        "Pass --spec <file>, or --build-name and --build-number (JFROG_CLI_BUILD_NAME / JFROG_CLI_BUILD_NUMBER).".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for UsageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UsageError::MixedCreationMethods => write!(
        f,
        "only multiple sources must be supplied: --source-type-release-bundles, --source-type-builds,\nor one of: --spec, --builds or --release-bundles"
      ),
      UsageError::MultipleCreationMethods => write!(
        f,
        "exactly one creation source must be supplied: --spec, --builds, or --release-bundles.\nOpt to use the --spec option as the --builds and --release-bundles are deprecated"
      ),
      UsageError::MissingBuildIdentity => write!(
        f,
        "Either --build-name or JFROG_CLI_BUILD_NAME, and --build-number or JFROG_CLI_BUILD_NUMBER must be defined"
      ),
      UsageError::MissingCreationSpec => write!(
        f,
        "either the --spec flag must be provided, or both --build-name and --build-number flags (or their corresponding environment variables JFROG_CLI_BUILD_NAME and JFROG_CLI_BUILD_NUMBER) must be set"
      ),
      UsageError::MissingOperation => write!(f, "at least one operation flag must be provided: --add"),
      UsageError::MissingUpdateSources => write!(
        f,
        "either --spec or source type flags (--source-type-release-bundles, --source-type-builds) must be provided"
      ),
    }
  }
}

/// Backend version errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
  /// Backend older than required
  BelowMinimum { current: String, minimum: String },

  /// Backend reported something that is not a version
  Unparsable { version: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::BelowMinimum { minimum, .. } => Some(format!("Upgrade Artifactory to {} or later.", minimum)),
      VersionError::Unparsable { .. } => None,
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::BelowMinimum { current, minimum } => write!(
        f,
        "You are using Artifactory version {}, while this operation requires version {} or higher.",
        current, minimum
      ),
      VersionError::Unparsable { version } => write!(f, "could not parse Artifactory version '{}'", version),
    }
  }
}

/// Build and bundle identifier resolution errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
  /// No published build with this name
  BuildNotFound { name: String, project: String },

  /// Identifier did not resolve to a name and number
  BuildIdentifier { identifier: String },

  /// Build name or number empty after resolution
  InvalidBuild { name: String, number: String },

  /// Bundle name or version empty
  InvalidBundle { name: String, version: String },

  /// Bundle identifier has no `/`
  BundleIdentifier { identifier: String },

  /// The `includeDeps` field of a build entry could not be parsed
  InvalidIncludeDeps { value: String },
}

impl ResolutionError {
  fn help_message(&self) -> Option<String> {
    match self {
      ResolutionError::BuildNotFound { .. } => {
        Some("Publish the build info first, or pass an explicit build number.".to_string())
      }
      ResolutionError::BundleIdentifier { .. } | ResolutionError::InvalidBundle { .. } => {
        Some("Release bundles are referenced as '<name>/<version>'.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ResolutionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResolutionError::BuildNotFound { name, project } => {
        write!(f, "could not find a build info with name '{}' in artifactory", name)?;
        if !project.is_empty() {
          write!(f, " (project '{}')", project)?;
        }
        Ok(())
      }
      ResolutionError::BuildIdentifier { identifier } => write!(
        f,
        "could not identify a build info by the '{}' identifier in artifactory",
        identifier
      ),
      ResolutionError::InvalidBuild { name, number } => write!(
        f,
        "invalid build source was provided. Both name and number are mandatory. Provided name: '{}', number: '{}'",
        name, number
      ),
      ResolutionError::InvalidBundle { name, version } => write!(
        f,
        "invalid release bundle source was provided. Both name and version are mandatory. Provided name: '{}', version: '{}'",
        name, version
      ),
      ResolutionError::BundleIdentifier { identifier } => write!(
        f,
        "invalid release bundle identifier '{}'. Expected the '<name>/<version>' format",
        identifier
      ),
      ResolutionError::InvalidIncludeDeps { value } => write!(
        f,
        "invalid value provided to the 'includeDeps' field. error: '{}' is not a valid boolean",
        value
      ),
    }
  }
}

/// Result type alias for rb-lifecycle
pub type RbResult<T> = Result<T, RbError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RbResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RbResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RbError>,
{
  fn context(self, ctx: impl Into<String>) -> RbResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RbResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RbError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to RbError
impl From<anyhow::Error> for RbError {
  fn from(err: anyhow::Error) -> Self {
    RbError::message(err.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_multiple_sources_message_dedupes_and_joins() {
    let err = SourceError::MultipleCreationSources {
      detected: vec![SourceType::Aql, SourceType::Builds, SourceType::Builds],
    };
    assert_eq!(
      err.to_string(),
      "multiple creation sources were detected in separate spec files. Only a single creation source should be provided. Detected: 'aql and builds'"
    );
  }

  #[test]
  fn test_join_keeps_both_errors() {
    let joined: RbResult<()> = RbError::join(Err(RbError::message("search failed")), Err(RbError::message("cleanup failed")));
    let err = joined.unwrap_err();
    assert!(matches!(err, RbError::Multiple(ref errors) if errors.len() == 2));
    assert_eq!(err.to_string(), "search failed\ncleanup failed");
  }

  #[test]
  fn test_join_surfaces_cleanup_error_on_success() {
    let joined = RbError::join(Ok(5), Err(RbError::message("cleanup failed")));
    assert_eq!(joined.unwrap_err().to_string(), "cleanup failed");
  }

  #[test]
  fn test_exit_codes() {
    assert_eq!(RbError::Source(SourceError::SingleAql).exit_code(), ExitCode::Validation);
    assert_eq!(RbError::Usage(UsageError::MissingOperation).exit_code(), ExitCode::User);
    assert_eq!(RbError::service("create", Some(500), "boom").exit_code(), ExitCode::System);
  }

  #[test]
  fn test_context_keeps_typed_errors_intact() {
    let err = RbError::from(UsageError::MissingOperation).context("while parsing update flags");
    assert!(matches!(err, RbError::Usage(UsageError::MissingOperation)));
    assert_eq!(err.to_string(), "at least one operation flag must be provided: --add");

    let err = RbError::service("aql search", Some(403), "forbidden").context("while searching artifacts");
    assert_eq!(err.exit_code(), ExitCode::System);
    assert!(err.help_message().is_some());
  }

  #[test]
  fn test_context_on_io() {
    let io = io::Error::new(io::ErrorKind::NotFound, "missing");
    let err = RbError::from(io).context("Failed to read spec file a.json");
    assert_eq!(err.to_string(), "Failed to read spec file a.json: missing");
  }

  #[test]
  fn test_context_on_message() {
    let err = RbError::message("base").context("while loading spec");
    assert_eq!(err.to_string(), "base\nwhile loading spec");
  }
}
