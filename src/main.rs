mod commands;
mod core;
mod services;
mod sources;
mod spec;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use crate::commands::{CreateArgs, UpdateArgs};
use crate::core::config::ServerOverrides;
use crate::core::context::ConnectionOptions;
use crate::core::error::{RbError, RbResult, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Create and update release bundles from specs, builds, bundles and packages
#[derive(Parser)]
#[command(name = "rb-lifecycle")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Log filter (overridden by RB_LOG)
  #[arg(long, global = true, default_value = "info")]
  log: String,

  /// Path to lifecycle.toml (default: searched from the current directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Platform URL (env: JF_URL)
  #[arg(long, global = true)]
  url: Option<String>,

  /// Access token (env: JF_ACCESS_TOKEN)
  #[arg(long, global = true)]
  access_token: Option<String>,

  /// User for basic auth (env: JF_USER)
  #[arg(long, global = true)]
  user: Option<String>,

  /// Password for basic auth (env: JF_PASSWORD)
  #[arg(long, global = true)]
  password: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a release bundle
  #[command(visible_alias = "rbc")]
  Create {
    /// Release bundle name
    name: String,
    /// Release bundle version
    #[arg(id = "bundle_version", value_name = "VERSION")]
    version: String,
    /// Path to a file spec describing the creation sources
    #[arg(long)]
    spec: Option<PathBuf>,
    /// Spec variables, "key1=value1;key2=value2"
    #[arg(long)]
    spec_vars: Option<String>,
    /// [Deprecated] Path to a builds spec file
    #[arg(long)]
    builds: Option<PathBuf>,
    /// [Deprecated] Path to a release bundles spec file
    #[arg(long)]
    release_bundles: Option<PathBuf>,
    /// Builds to include, "name=b1,id=1,include-deps=true;name=b2,id=2"
    #[arg(long, visible_alias = "sources-builds")]
    source_type_builds: Option<String>,
    /// Release bundles to include, "name=rb1,version=1.0;name=rb2,version=2.0"
    #[arg(long, visible_alias = "sources-release-bundles")]
    source_type_release_bundles: Option<String>,
    /// Build name (env: JFROG_CLI_BUILD_NAME)
    #[arg(long)]
    build_name: Option<String>,
    /// Build number (env: JFROG_CLI_BUILD_NUMBER)
    #[arg(long)]
    build_number: Option<String>,
    /// Project key (env: JFROG_CLI_BUILD_PROJECT)
    #[arg(long)]
    project: Option<String>,
    /// Signing key name
    #[arg(long)]
    signing_key: Option<String>,
    /// Wait for the operation to complete
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    sync: bool,
    /// Create the release bundle as a draft
    #[arg(long)]
    draft: bool,
  },

  /// Update an existing release bundle
  #[command(visible_alias = "rbu")]
  Update {
    /// Release bundle name
    name: String,
    /// Release bundle version
    #[arg(id = "bundle_version", value_name = "VERSION")]
    version: String,
    /// Add sources to the release bundle
    #[arg(long)]
    add: bool,
    /// Path to a file spec describing the sources to add
    #[arg(long)]
    spec: Option<PathBuf>,
    /// Spec variables, "key1=value1;key2=value2"
    #[arg(long)]
    spec_vars: Option<String>,
    /// Builds to add, "name=b1,id=1,include-deps=true"
    #[arg(long, visible_alias = "sources-builds")]
    source_type_builds: Option<String>,
    /// Release bundles to add, "name=rb1,version=1.0"
    #[arg(long, visible_alias = "sources-release-bundles")]
    source_type_release_bundles: Option<String>,
    /// Project key (env: JFROG_CLI_BUILD_PROJECT)
    #[arg(long)]
    project: Option<String>,
    /// Wait for the operation to complete
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    sync: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(level: &str) -> anyhow::Result<()> {
  let filter = match EnvFilter::try_from_env("RB_LOG") {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(level)?,
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init()
    .map_err(|e| anyhow::anyhow!(e))
}

fn main() {
  let cli = Cli::parse();

  if let Err(err) = init_logging(&cli.log) {
    handle_error(RbError::from(err).context("Failed to initialize logging"));
  }

  let working_dir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(RbError::from(e).context("Failed to get current directory")),
  };

  let connection = ConnectionOptions {
    working_dir,
    config_path: cli.config,
    overrides: ServerOverrides {
      url: cli.url,
      access_token: cli.access_token,
      user: cli.user,
      password: cli.password,
    },
  };
  let env = |key: &str| std::env::var(key).ok();

  let result: RbResult<()> = match cli.command {
    Commands::Create {
      name,
      version,
      spec,
      spec_vars,
      builds,
      release_bundles,
      source_type_builds,
      source_type_release_bundles,
      build_name,
      build_number,
      project,
      signing_key,
      sync,
      draft,
    } => commands::run_create(
      CreateArgs {
        name,
        version,
        spec,
        spec_vars,
        builds,
        release_bundles,
        source_type_builds,
        source_type_release_bundles,
        build_name,
        build_number,
        project,
        signing_key,
        sync,
        draft,
      },
      &connection,
      &env,
    ),
    Commands::Update {
      name,
      version,
      add,
      spec,
      spec_vars,
      source_type_builds,
      source_type_release_bundles,
      project,
      sync,
    } => commands::run_update(
      UpdateArgs {
        name,
        version,
        add,
        spec,
        spec_vars,
        source_type_builds,
        source_type_release_bundles,
        project,
        sync,
      },
      &connection,
      &env,
    ),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RbError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
